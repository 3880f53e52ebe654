// ABOUTME: Storage operations for login sessions
// ABOUTME: Token generation, hashing, verification, and expiry housekeeping

use base64::Engine;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use okrdesk_storage::{StorageError, StorageResult};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::types::{IssuedSession, Session};

pub struct SessionStorage {
    pool: SqlitePool,
}

/// Timestamps written by this module use the same text form as the schema defaults
fn to_db_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl SessionStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fresh bearer token: 32 random bytes, URL-safe base64
    pub fn generate_token() -> String {
        let bytes: [u8; 32] = rand::thread_rng().gen();
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }

    /// SHA-256 hex digest of a token; this is what gets stored
    pub fn hash_token(token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }

    pub fn token_matches(token: &str, token_hash: &str) -> bool {
        use subtle::ConstantTimeEq;

        Self::hash_token(token)
            .as_bytes()
            .ct_eq(token_hash.as_bytes())
            .into()
    }

    /// Open a session for `user_id` lasting `ttl`
    pub async fn create_session(&self, user_id: &str, ttl: Duration) -> StorageResult<IssuedSession> {
        let id = Uuid::new_v4().to_string();
        let token = Self::generate_token();
        let token_hash = Self::hash_token(&token);
        let expires_at = Utc::now() + ttl;

        debug!("Creating session {} for user {}", id, user_id);

        sqlx::query("INSERT INTO sessions (id, user_id, token_hash, expires_at) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(user_id)
            .bind(&token_hash)
            .bind(to_db_timestamp(expires_at))
            .execute(&self.pool)
            .await
            .map_err(|e| {
                StorageError::from_write(e, || {
                    StorageError::Database("session token collision".to_string())
                })
            })?;

        let session = self.get_session(&id).await?;
        Ok(IssuedSession { token, session })
    }

    async fn get_session(&self, id: &str) -> StorageResult<Session> {
        let row = sqlx::query("SELECT * FROM sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| StorageError::NotFound(format!("Session {}", id)))?;

        row_to_session(&row)
    }

    /// Resolve a bearer token to its live session. Unknown and expired tokens
    /// both yield `None`; an expired session is deleted on the way.
    pub async fn verify_token(&self, token: &str) -> StorageResult<Option<Session>> {
        let token_hash = Self::hash_token(token);

        let row = sqlx::query("SELECT * FROM sessions WHERE token_hash = ?")
            .bind(&token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let session = row_to_session(&row)?;

        if !Self::token_matches(token, &session.token_hash) {
            return Ok(None);
        }

        let now = Utc::now();
        if session.is_expired_at(now) {
            debug!("Session {} expired at {}", session.id, session.expires_at);
            self.delete_by_id(&session.id).await?;
            return Ok(None);
        }

        sqlx::query("UPDATE sessions SET last_used_at = ? WHERE id = ?")
            .bind(to_db_timestamp(now))
            .bind(&session.id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(Some(Session {
            last_used_at: Some(now),
            ..session
        }))
    }

    /// End the session holding `token`. Returns whether one existed.
    pub async fn delete_session(&self, token: &str) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(Self::hash_token(token))
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_id(&self, id: &str) -> StorageResult<()> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;
        Ok(())
    }

    pub async fn delete_sessions_for_user(&self, user_id: &str) -> StorageResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(result.rows_affected())
    }

    /// Remove every session that expired before now
    pub async fn purge_expired(&self) -> StorageResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(to_db_timestamp(Utc::now()))
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() > 0 {
            debug!("Purged {} expired sessions", result.rows_affected());
        }
        Ok(result.rows_affected())
    }
}

fn row_to_session(row: &SqliteRow) -> StorageResult<Session> {
    Ok(Session {
        id: row.try_get("id").map_err(StorageError::Sqlx)?,
        user_id: row.try_get("user_id").map_err(StorageError::Sqlx)?,
        token_hash: row.try_get("token_hash").map_err(StorageError::Sqlx)?,
        created_at: row.try_get("created_at").map_err(StorageError::Sqlx)?,
        expires_at: row.try_get("expires_at").map_err(StorageError::Sqlx)?,
        last_used_at: row.try_get("last_used_at").map_err(StorageError::Sqlx)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_random_and_unpadded() {
        let first = SessionStorage::generate_token();
        let second = SessionStorage::generate_token();

        assert_ne!(first, second);
        assert_eq!(first.len(), 43);
    }

    #[test]
    fn test_hash_token_is_deterministic() {
        let hash1 = SessionStorage::hash_token("tok");
        let hash2 = SessionStorage::hash_token("tok");

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
        assert_ne!(hash1, SessionStorage::hash_token("tok2"));
    }

    #[test]
    fn test_token_matches_its_digest() {
        let hash = SessionStorage::hash_token("tok");

        assert!(SessionStorage::token_matches("tok", &hash));
        assert!(!SessionStorage::token_matches("other", &hash));
        assert!(!SessionStorage::token_matches("tok", "short"));
    }

    #[test]
    fn test_db_timestamp_format_matches_schema_default() {
        let ts = DateTime::parse_from_rfc3339("2024-05-01T08:30:00.250Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(to_db_timestamp(ts), "2024-05-01T08:30:00.250Z");
    }
}
