//! Shared test utilities for the tag service crates
//!
//! - `TestDatabase`: PostgreSQL container with the workspace migrations applied (feature: "postgres")
//! - `TestDataBuilder`: deterministic test data derived from the test name
//! - `assertions`: small assertion helpers
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_postgres_test() {
//!     let db = TestDatabase::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_test");
//!
//!     let entity_id = builder.entity_id(0);
//!     let tag_name = builder.tag_name("food");
//! }
//! ```

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

/// Seeded generator for test data.
///
/// Every container starts from an empty schema, but the seed keeps names and
/// entity IDs distinct between tests that share fixtures.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from a hash of the test name.
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// A positive entity ID; `index` distinguishes entities within one test.
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("my_test");
    /// assert!(builder.entity_id(0) > 0);
    /// assert_ne!(builder.entity_id(0), builder.entity_id(1));
    /// ```
    pub fn entity_id(&self, index: u32) -> i64 {
        // 31 bits of seed leave room for the index without overflowing i64
        let base = (self.seed >> 33) as i64;
        (base << 16) + i64::from(index) + 1
    }

    /// A tag name such as `"food-12345"`.
    pub fn tag_name(&self, stem: &str) -> String {
        format!("{}-{}", stem, self.seed % 1_000_000)
    }
}

/// Test assertion helpers
pub mod assertions {
    /// Assert that `actual` lists the same IDs as `expected`, in the same order
    pub fn assert_ids_in_order(actual: &[i64], expected: &[i64], context: &str) {
        assert_eq!(
            actual, expected,
            "{}: expected IDs {:?} in order, got {:?}",
            context, expected, actual
        );
    }
}
