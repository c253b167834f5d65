use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, QueryFilter,
    QueryOrder, Statement,
};

use crate::entity::{entity_tag, tag};
use crate::error::{TagError, TagResult};
use crate::models::{EntityTagLink, Tag, Upserted};
use crate::repository::TagStore;

// `xmax = 0` holds only for a row inserted by this statement; the conflict
// branch touches `updated_at` so RETURNING still yields the existing row.
const UPSERT_TAG_SQL: &str = "INSERT INTO tags (name) VALUES ($1) \
     ON CONFLICT (name) DO UPDATE SET updated_at = now() \
     RETURNING id, (xmax = 0) AS created";

const UPSERT_LINK_SQL: &str = "INSERT INTO entity_tags (entity_id, tag_id) VALUES ($1, $2) \
     ON CONFLICT (entity_id, tag_id) DO UPDATE SET updated_at = now() \
     RETURNING id, (xmax = 0) AS created";

/// Postgres-backed [`TagStore`].
#[derive(Clone)]
pub struct PgTagStore {
    db: DatabaseConnection,
}

impl PgTagStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    async fn upsert(&self, stmt: Statement) -> TagResult<Upserted> {
        let row = self
            .db
            .query_one_raw(stmt)
            .await?
            .ok_or_else(|| TagError::StoreUnavailable("upsert returned no row".to_string()))?;

        Ok(Upserted {
            id: row.try_get("", "id")?,
            created: row.try_get("", "created")?,
        })
    }
}

#[async_trait]
impl TagStore for PgTagStore {
    async fn find_tag_by_name(&self, name: &str) -> TagResult<Option<Tag>> {
        let model = tag::Entity::find()
            .filter(tag::Column::Name.eq(name))
            .one(&self.db)
            .await?;

        Ok(model.map(Into::into))
    }

    async fn insert_tag_if_absent(&self, name: &str) -> TagResult<Upserted> {
        let upserted = self
            .upsert(Statement::from_sql_and_values(
                DbBackend::Postgres,
                UPSERT_TAG_SQL,
                [name.into()],
            ))
            .await?;

        if upserted.created {
            tracing::info!(tag_id = upserted.id, "Created tag");
        }
        Ok(upserted)
    }

    async fn find_tag_by_id(&self, tag_id: i64) -> TagResult<Option<Tag>> {
        let model = tag::Entity::find_by_id(tag_id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn find_link(&self, entity_id: i64, tag_id: i64) -> TagResult<Option<EntityTagLink>> {
        let model = entity_tag::Entity::find()
            .filter(entity_tag::Column::EntityId.eq(entity_id))
            .filter(entity_tag::Column::TagId.eq(tag_id))
            .one(&self.db)
            .await?;

        Ok(model.map(Into::into))
    }

    async fn insert_link_if_absent(&self, entity_id: i64, tag_id: i64) -> TagResult<Upserted> {
        let upserted = self
            .upsert(Statement::from_sql_and_values(
                DbBackend::Postgres,
                UPSERT_LINK_SQL,
                [entity_id.into(), tag_id.into()],
            ))
            .await?;

        if upserted.created {
            tracing::info!(link_id = upserted.id, entity_id, tag_id, "Linked entity to tag");
        }
        Ok(upserted)
    }

    async fn list_links_by_entity(&self, entity_id: i64) -> TagResult<Vec<EntityTagLink>> {
        let models = entity_tag::Entity::find()
            .filter(entity_tag::Column::EntityId.eq(entity_id))
            .order_by_asc(entity_tag::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_tags_by_ids(&self, tag_ids: &[i64]) -> TagResult<Vec<Tag>> {
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = tag::Entity::find()
            .filter(tag::Column::Id.is_in(tag_ids.iter().copied()))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}
