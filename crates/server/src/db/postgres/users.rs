use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use pvz_core::{Email, Role, UserId};

use super::PgTransaction;
use crate::db::{RepositoryError, UserStore};
use crate::models::{NewUser, User};

/// Raw `users` row; the email is re-validated on the way out.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    role: Role,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            password_hash: row.password_hash,
            role: row.role,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl UserStore for PgTransaction {
    async fn create_user(&mut self, user: &NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (id, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, role, created_at
            ",
        )
        .bind(user.id)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.role)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "email already exists"))?;

        row.try_into()
    }

    async fn get_user_by_id(&mut self, id: UserId) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, email, password_hash, role, created_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(RepositoryError::NotFound)?
        .try_into()
    }

    async fn get_user_by_email(&mut self, email: &Email) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, email, password_hash, role, created_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(RepositoryError::NotFound)?
        .try_into()
    }
}
