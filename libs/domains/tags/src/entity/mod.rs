//! Sea-ORM entities for the `tags` and `entity_tags` tables.

pub mod entity_tag;
pub mod tag;
