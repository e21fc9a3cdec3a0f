//! Cookie sessions.
//!
//! Sessions are managed by `tower-sessions`: [`session_layer`] builds the
//! manager layer over the configured [`SessionBackendStore`], and handlers
//! take a [`Session`] extractor. The helpers here own the keys this crate
//! stores: the visit counter and the id of the logged-in user.
//!
//! Writes are last-writer-wins: two concurrent requests from one session may
//! each read the same visit count and one increment is lost.

use async_trait::async_trait;
use time::Duration;
use tower_sessions::{
    session::{Id, Record},
    session_store, Expiry, SessionManagerLayer, SessionStore,
};
use tower_sessions_moka_store::MokaStore;

pub use tower_sessions::Session;

use crate::{config::SessionConfig, error::AppResult, services::redis::RedisService};

/// Earlier visits counted in this session
pub const NUM_VISITS_KEY: &str = "num_visits";
/// Primary key of the logged-in user
pub const USER_ID_KEY: &str = "_auth_user_id";

/// Upper bound on sessions held by the in-process store
const MEMORY_STORE_CAPACITY: u64 = 10_000;

/// Session records, kept in Redis or in process
#[derive(Debug, Clone)]
pub enum SessionBackendStore {
    Redis(RedisService),
    Memory(MokaStore),
}

impl SessionBackendStore {
    /// In-process store; expired records are evicted by the cache
    pub fn memory() -> Self {
        SessionBackendStore::Memory(MokaStore::new(Some(MEMORY_STORE_CAPACITY)))
    }
}

#[async_trait]
impl SessionStore for SessionBackendStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        match self {
            SessionBackendStore::Redis(store) => store.create(record).await,
            SessionBackendStore::Memory(store) => store.create(record).await,
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        match self {
            SessionBackendStore::Redis(store) => store.save(record).await,
            SessionBackendStore::Memory(store) => store.save(record).await,
        }
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        match self {
            SessionBackendStore::Redis(store) => store.load(session_id).await,
            SessionBackendStore::Memory(store) => store.load(session_id).await,
        }
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        match self {
            SessionBackendStore::Redis(store) => store.delete(session_id).await,
            SessionBackendStore::Memory(store) => store.delete(session_id).await,
        }
    }
}

/// Session manager for the router: cookie `sessionid`, expiry on inactivity
pub fn session_layer(
    store: SessionBackendStore,
    config: &SessionConfig,
) -> SessionManagerLayer<SessionBackendStore> {
    let ttl = i64::try_from(config.ttl_seconds).unwrap_or(i64::MAX);
    SessionManagerLayer::new(store)
        .with_name(config.cookie_name.clone())
        .with_http_only(true)
        .with_secure(config.secure_cookie)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(ttl)))
}

/// Count this visit; returns the number of earlier visits
pub async fn record_visit(session: &Session) -> AppResult<i64> {
    let previous: i64 = session.get(NUM_VISITS_KEY).await?.unwrap_or(0);
    session.insert(NUM_VISITS_KEY, previous + 1).await?;
    Ok(previous)
}

/// Id of the logged-in user, if any
pub async fn user_id(session: &Session) -> AppResult<Option<i32>> {
    Ok(session.get(USER_ID_KEY).await?)
}

/// Attach a user to the session under a new session id
pub async fn persist_user(session: &Session, user_id: i32) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(USER_ID_KEY, user_id).await?;
    Ok(())
}

/// Drop everything, including the visit counter, and delete the record
pub async fn flush(session: &Session) -> AppResult<()> {
    session.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn fresh_session() -> Session {
        let store = Arc::new(SessionBackendStore::memory());
        Session::new(None, store, None)
    }

    #[tokio::test]
    async fn visit_counter_displays_previous_value() {
        let session = fresh_session();
        assert_eq!(record_visit(&session).await.unwrap(), 0);
        assert_eq!(record_visit(&session).await.unwrap(), 1);
        assert_eq!(session.get::<i64>(NUM_VISITS_KEY).await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn persisting_a_user_stores_its_id() {
        let session = fresh_session();
        assert_eq!(user_id(&session).await.unwrap(), None);
        persist_user(&session, 12).await.unwrap();
        assert_eq!(user_id(&session).await.unwrap(), Some(12));
    }

    #[tokio::test]
    async fn flush_clears_user_and_counter() {
        let session = fresh_session();
        record_visit(&session).await.unwrap();
        persist_user(&session, 3).await.unwrap();
        flush(&session).await.unwrap();
        assert_eq!(user_id(&session).await.unwrap(), None);
        assert_eq!(record_visit(&session).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn memory_store_round_trips_and_deletes() {
        let store = SessionBackendStore::memory();
        let mut record = Record {
            id: Id::default(),
            data: [(NUM_VISITS_KEY.to_string(), serde_json::json!(3))].into(),
            expiry_date: time::OffsetDateTime::now_utc() + Duration::minutes(5),
        };
        store.create(&mut record).await.unwrap();

        let loaded = store.load(&record.id).await.unwrap().unwrap();
        assert_eq!(loaded.data[NUM_VISITS_KEY], 3);

        store.delete(&record.id).await.unwrap();
        assert!(store.load(&record.id).await.unwrap().is_none());
    }
}
