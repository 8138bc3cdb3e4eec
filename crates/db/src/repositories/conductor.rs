//! Conductor repository.

use std::sync::Arc;

use super::map_unique_violation;
use crate::entities::{Conductor, conductor};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use survey_common::{AppError, AppResult};

/// Conductor repository.
#[derive(Clone)]
pub struct ConductorRepository {
    db: Arc<DatabaseConnection>,
}

impl ConductorRepository {
    /// Create a new conductor repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a conductor by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<conductor::Model>> {
        Conductor::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a conductor by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<conductor::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Conductor not found: {id}")))
    }

    /// Find the conductor registered by a user.
    pub async fn find_by_user_id(&self, user_id: i32) -> AppResult<Option<conductor::Model>> {
        Conductor::find()
            .filter(conductor::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a conductor by official e-mail address.
    pub async fn find_by_official_email(
        &self,
        email: &str,
    ) -> AppResult<Option<conductor::Model>> {
        Conductor::find()
            .filter(conductor::Column::OfficialEmail.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new conductor.
    pub async fn create(&self, model: conductor::ActiveModel) -> AppResult<conductor::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_unique_violation(e, "conductor is already registered"))
    }

    /// Update a conductor.
    pub async fn update(&self, model: conductor::ActiveModel) -> AppResult<conductor::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| map_unique_violation(e, "official email is already registered"))
    }

    /// Delete a conductor.
    pub async fn delete(&self, id: i32) -> AppResult<u64> {
        let result = Conductor::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// List conductors page by page, oldest first. Returns the page and the total.
    pub async fn find_page(
        &self,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<conductor::Model>, u64)> {
        let paginator = Conductor::find()
            .order_by_asc(conductor::Column::Id)
            .paginate(self.db.as_ref(), per_page);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let items = paginator
            .fetch_page(page)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((items, total))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_conductor(id: i32, user_id: i32) -> conductor::Model {
        conductor::Model {
            id,
            user_id,
            name: "Acme Research".to_string(),
            conductor_type: conductor::ConductorType::Company,
            description: None,
            contact_email: "contact@acme.test".to_string(),
            contact_phone: "+1 555 0100".to_string(),
            address: "1 Main St".to_string(),
            official_email: format!("official{id}@acme.test"),
            is_verified: false,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_user_id() {
        let conductor = create_test_conductor(1, 77);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[conductor.clone()]])
                .into_connection(),
        );

        let repo = ConductorRepository::new(db);
        assert_eq!(repo.find_by_user_id(77).await.unwrap(), Some(conductor));
    }

    #[tokio::test]
    async fn test_find_page_returns_total() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(3)),
                }]])
                .append_query_results([[create_test_conductor(1, 10), create_test_conductor(2, 11)]])
                .into_connection(),
        );

        let repo = ConductorRepository::new(db);
        let (items, total) = repo.find_page(0, 2).await.unwrap();

        assert_eq!(total, 3);
        assert_eq!(items.len(), 2);
    }
}
