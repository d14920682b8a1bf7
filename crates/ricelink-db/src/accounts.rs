//! Database operations for the `accounts` table.
//!
//! Passwords are stored as salted SHA-256 digests and verified with a
//! constant-time comparison. This is demo-grade credential storage for the
//! marketplace accounts, not an SSO layer; sessions live outside the
//! repository.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use ricelink_core::{Account, Role};

use crate::DbError;

/// A row from the `accounts` table, including the stored credential digest.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl AccountRow {
    /// Converts the row into the domain type, dropping the credential digest.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Invalid`] if the stored role fails to parse.
    pub fn into_account(self) -> Result<Account, DbError> {
        Ok(Account {
            id: self.id,
            name: self.name,
            email: self.email,
            role: self.role.parse::<Role>()?,
            created_at: self.created_at,
        })
    }
}

/// Computes the salted digest stored for a password.
#[must_use]
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Inserts an account with the given salted password digest.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails — including the unique
/// violation for an already-registered email, which callers map to a
/// conflict.
pub async fn create_account(
    pool: &PgPool,
    name: &str,
    email: &str,
    role: Role,
    password_hash: &str,
) -> Result<AccountRow, DbError> {
    let row = sqlx::query_as::<_, AccountRow>(
        "INSERT INTO accounts (name, email, role, password_hash) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, name, email, role, password_hash, created_at",
    )
    .bind(name)
    .bind(email)
    .bind(role.as_str())
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns an account by id, or `None`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_account(pool: &PgPool, id: Uuid) -> Result<Option<AccountRow>, DbError> {
    let row = sqlx::query_as::<_, AccountRow>(
        "SELECT id, name, email, role, password_hash, created_at \
         FROM accounts \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns the account registered under `email`, or `None`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_account_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<AccountRow>, DbError> {
    let row = sqlx::query_as::<_, AccountRow>(
        "SELECT id, name, email, role, password_hash, created_at \
         FROM accounts \
         WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Checks a login attempt. Returns the account on success; `None` for an
/// unknown email or a wrong password (indistinguishable to the caller).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the lookup fails.
pub async fn verify_credentials(
    pool: &PgPool,
    salt: &str,
    email: &str,
    password: &str,
) -> Result<Option<AccountRow>, DbError> {
    let Some(row) = find_account_by_email(pool, email).await? else {
        return Ok(None);
    };

    let attempt = hash_password(salt, password);
    if attempt.as_bytes().ct_eq(row.password_hash.as_bytes()).into() {
        Ok(Some(row))
    } else {
        Ok(None)
    }
}
