//! SQLite-backed user repository.

use async_trait::async_trait;
use sqlx::sqlite::SqliteArguments;
use sqlx::query::QueryAs;
use sqlx::{Sqlite, SqlitePool};
use tracing::debug;

use super::UserStore;
use crate::entities::{NewUser, User, UserPatch};
use crate::types::{StoreError, StoreResult};

const USER_COLUMNS: &str = "id, username, email, fullname";

/// Row selector shared by the by-id and by-username operations
#[derive(Debug, Clone, Copy)]
enum UserKey<'a> {
    Id(i64),
    Username(&'a str),
}

impl<'a> UserKey<'a> {
    fn predicate(&self) -> &'static str {
        match self {
            UserKey::Id(_) => "id = ?",
            UserKey::Username(_) => "username = ?",
        }
    }

    fn bind<'q>(
        &self,
        query: QueryAs<'q, Sqlite, User, SqliteArguments<'q>>,
    ) -> QueryAs<'q, Sqlite, User, SqliteArguments<'q>>
    where
        'a: 'q,
    {
        match *self {
            UserKey::Id(id) => query.bind(id),
            UserKey::Username(username) => query.bind(username),
        }
    }
}

/// Repository for user database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find(&self, key: UserKey<'_>) -> StoreResult<User> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {}", key.predicate());

        key.bind(sqlx::query_as::<_, User>(&sql))
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, key: UserKey<'_>, patch: &UserPatch) -> StoreResult<User> {
        if patch.is_empty() {
            return self.find(key).await;
        }

        let assignments = patch.assignments();
        let set_clause = assignments
            .iter()
            .map(|(column, _)| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE users SET {set_clause} WHERE {} RETURNING {USER_COLUMNS}",
            key.predicate()
        );

        let mut query = sqlx::query_as::<_, User>(&sql);
        for (_, value) in &assignments {
            query = query.bind(*value);
        }

        let user = key
            .bind(query)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;

        debug!(user_id = user.id, "user updated");
        Ok(user)
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, user: &NewUser) -> StoreResult<User> {
        let created = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, fullname) VALUES (?, ?, ?) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.stored_fullname())
        .fetch_one(&self.pool)
        .await?;

        debug!(user_id = created.id, "user created");
        Ok(created)
    }

    async fn find_all(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<User> {
        self.find(UserKey::Id(id)).await
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<User> {
        self.find(UserKey::Username(username)).await
    }

    async fn update_by_id(&self, id: i64, patch: &UserPatch) -> StoreResult<User> {
        self.update(UserKey::Id(id), patch).await
    }

    async fn update_by_username(&self, username: &str, patch: &UserPatch) -> StoreResult<User> {
        self.update(UserKey::Username(username), patch).await
    }

    async fn delete_by_id(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        debug!(user_id = id, "user deleted");
        Ok(())
    }

    async fn delete_by_username(&self, username: &str) -> StoreResult<()> {
        let user = self.find_by_username(username).await?;
        self.delete_by_id(user.id).await
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
