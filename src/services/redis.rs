//! Redis-backed session storage

use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use time::OffsetDateTime;
use tower_sessions::{
    session::{Id, Record},
    session_store, SessionStore,
};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct RedisService {
    client: Client,
}

impl RedisService {
    /// Create a new Redis service
    pub async fn new(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        // Test connection
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { client })
    }

    /// Get a Redis connection
    async fn connection(&self) -> session_store::Result<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(backend_error)
    }

    fn key(session_id: &Id) -> String {
        format!("session:{}", session_id)
    }
}

fn backend_error(e: redis::RedisError) -> session_store::Error {
    session_store::Error::Backend(e.to_string())
}

/// Seconds until the record expires; Redis refuses a zero TTL
fn ttl_seconds(record: &Record) -> u64 {
    let remaining = (record.expiry_date - OffsetDateTime::now_utc()).whole_seconds();
    u64::try_from(remaining).unwrap_or(0).max(1)
}

fn encode(record: &Record) -> session_store::Result<String> {
    serde_json::to_string(record).map_err(|e| session_store::Error::Encode(e.to_string()))
}

#[async_trait]
impl SessionStore for RedisService {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let mut conn = self.connection().await?;

        // SET NX so a colliding id is never overwritten
        loop {
            let stored: Option<String> = redis::cmd("SET")
                .arg(Self::key(&record.id))
                .arg(encode(record)?)
                .arg("NX")
                .arg("EX")
                .arg(ttl_seconds(record))
                .query_async(&mut conn)
                .await
                .map_err(backend_error)?;

            if stored.is_some() {
                return Ok(());
            }
            record.id = Id::default();
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(Self::key(&record.id), encode(record)?, ttl_seconds(record))
            .await
            .map_err(backend_error)
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let mut conn = self.connection().await?;

        let stored: Option<String> = conn.get(Self::key(session_id)).await.map_err(backend_error)?;

        match stored {
            Some(json) => match serde_json::from_str(&json) {
                Ok(record) => Ok(Some(record)),
                Err(e) => {
                    // Unreadable records are treated as expired
                    tracing::warn!("Discarding undecodable session record: {}", e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(Self::key(session_id))
            .await
            .map_err(backend_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_expiring_in(seconds: i64) -> Record {
        Record {
            id: Id::default(),
            data: Default::default(),
            expiry_date: OffsetDateTime::now_utc() + time::Duration::seconds(seconds),
        }
    }

    #[test]
    fn ttl_follows_the_record_expiry() {
        let ttl = ttl_seconds(&record_expiring_in(600));
        assert!((598..=600).contains(&ttl));
    }

    #[test]
    fn expired_records_get_the_minimum_ttl() {
        assert_eq!(ttl_seconds(&record_expiring_in(-30)), 1);
    }

    #[test]
    fn records_encode_as_json() {
        let record = record_expiring_in(60);
        let json = encode(&record).unwrap();
        let decoded: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.id, record.id);
    }
}
