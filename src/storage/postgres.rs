//! Postgres storage
//!
//! Backed by a connection pool, with migrations run on startup

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::aliases::Alias;
use crate::users::User;

use super::CreateAliasValues;
use super::CreateUserValues;
use super::Error;
use super::Result;
use super::Storage;
use super::UpdateAliasValues;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Postgres storage
#[derive(Clone)]
pub struct Postgres {
    /// Pool of connections
    connection_pool: PgPool,
}

impl Postgres {
    /// Create Postgres storage
    ///
    /// Uses the `DATABASE_URL` environment variable; migrations will be run
    pub async fn new() -> Self {
        let database_connection_string = std::env::var("DATABASE_URL").expect("Valid DATABASE_URL");

        let connection_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_connection_string)
            .await
            .expect("Valid connection");

        Self::new_with_pool(connection_pool).await
    }

    /// Create Postgres storage with an existing pool
    ///
    /// Migrations will be run
    pub async fn new_with_pool(connection_pool: PgPool) -> Self {
        let migration_result = MIGRATOR.run(&connection_pool).await;

        if let Err(err) = migration_result {
            panic!("Migrations could not run: {err}");
        }

        Self { connection_pool }
    }
}

#[async_trait]
impl Storage for Postgres {
    async fn find_single_user_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r"
            SELECT id, email, hashed_password, created_at, updated_at, deleted_at
            FROM users
            WHERE deleted_at IS NULL
                AND email = $1
            LIMIT 1
            ",
        )
        .bind(email)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn create_user(&self, values: &CreateUserValues<'_>) -> Result<User> {
        sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (id, email, hashed_password)
            VALUES ($1, $2, $3)
            RETURNING id, email, hashed_password, created_at, updated_at, deleted_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(values.email)
        .bind(values.hashed_password)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(|err| conflict_or_connection_error(err, "Email already exists"))
    }

    async fn find_all_aliases(&self, owner: Option<&str>) -> Result<Vec<Alias>> {
        sqlx::query_as::<_, Alias>(
            r"
            SELECT id, code, target, owner, access_count, created_at, updated_at, deleted_at
            FROM aliases
            WHERE deleted_at IS NULL
                AND ($1::text IS NULL OR owner = $1)
            ",
        )
        .bind(owner)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn find_single_alias_by_code(&self, code: &str) -> Result<Option<Alias>> {
        sqlx::query_as::<_, Alias>(
            r"
            SELECT id, code, target, owner, access_count, created_at, updated_at, deleted_at
            FROM aliases
            WHERE deleted_at IS NULL
                AND code = $1
            LIMIT 1
            ",
        )
        .bind(code)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn create_alias(&self, values: &CreateAliasValues<'_>) -> Result<Alias> {
        // the UNIQUE index on `code` spans soft-deleted rows, a burned code
        // surfaces here as a conflict
        sqlx::query_as::<_, Alias>(
            r"
            INSERT INTO aliases (id, code, target, owner)
            VALUES ($1, $2, $3, $4)
            RETURNING id, code, target, owner, access_count, created_at, updated_at, deleted_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(values.code)
        .bind(values.target)
        .bind(values.owner)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(|err| conflict_or_connection_error(err, "Code already exists"))
    }

    async fn update_alias(
        &self,
        code: &str,
        values: &UpdateAliasValues<'_>,
    ) -> Result<Option<Alias>> {
        sqlx::query_as::<_, Alias>(
            r"
            UPDATE aliases
            SET target = $2, updated_at = now()
            WHERE deleted_at IS NULL
                AND code = $1
            RETURNING id, code, target, owner, access_count, created_at, updated_at, deleted_at
            ",
        )
        .bind(code)
        .bind(values.target)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn delete_alias(&self, code: &str) -> Result<Option<Alias>> {
        // `updated_at` is left alone, `deleted_at` records the moment
        sqlx::query_as::<_, Alias>(
            r"
            UPDATE aliases
            SET deleted_at = now()
            WHERE deleted_at IS NULL
                AND code = $1
            RETURNING id, code, target, owner, access_count, created_at, updated_at, deleted_at
            ",
        )
        .bind(code)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    async fn record_access(&self, code: &str) -> Result<Option<Alias>> {
        // the adjustment is relative to the stored value, concurrent
        // accesses serialize on the row lock and are all counted
        sqlx::query_as::<_, Alias>(
            r"
            UPDATE aliases
            SET access_count = access_count + 1, updated_at = now()
            WHERE deleted_at IS NULL
                AND code = $1
            RETURNING id, code, target, owner, access_count, created_at, updated_at, deleted_at
            ",
        )
        .bind(code)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }
}

fn connection_error(err: sqlx::Error) -> Error {
    Error::Connection(err.to_string())
}

fn conflict_or_connection_error(err: sqlx::Error, message: &str) -> Error {
    if err
        .as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
    {
        Error::Conflict(message.to_string())
    } else {
        connection_error(err)
    }
}
