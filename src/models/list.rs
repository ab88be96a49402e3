use serde::Serialize;
use sqlx::{AnyPool, FromRow};

/// A named collection of tasks owned by one user.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct List {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
}

impl List {
    /// All lists owned by `user_id`, oldest first.
    pub async fn for_owner(pool: &AnyPool, user_id: i64) -> Result<Vec<List>, sqlx::Error> {
        sqlx::query_as::<_, List>("SELECT id, user_id, name FROM lists WHERE user_id = $1 ORDER BY id")
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find(pool: &AnyPool, id: i64) -> Result<Option<List>, sqlx::Error> {
        sqlx::query_as::<_, List>("SELECT id, user_id, name FROM lists WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &AnyPool, user_id: i64, name: &str) -> Result<List, sqlx::Error> {
        sqlx::query_as::<_, List>(
            "INSERT INTO lists (user_id, name) VALUES ($1, $2) RETURNING id, user_id, name",
        )
        .bind(user_id)
        .bind(name)
        .fetch_one(pool)
        .await
    }

    /// Deletes the list and every task in it in a single transaction.
    ///
    /// Returns `false` when no list with `id` exists.
    pub async fn delete(pool: &AnyPool, id: i64) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM tasks WHERE list_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM lists WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }
}
