//! Session management and visit accounting
//!
//! This module provides in-memory session storage. A session is created
//! on a browser's first request and identified by an opaque id carried
//! in a cookie; it tracks the visit counter and, after login, the bound
//! user. State expires with the process (sessions are not persisted).

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Per-browser session state.
#[derive(Debug, Clone)]
pub struct Session {
    /// Unique session identifier (the cookie value)
    pub id: String,
    /// Bound user after login, None for anonymous visitors
    pub user_id: Option<String>,
    /// Visit counter, starts at 1
    pub visits: u32,
    /// When the last counted visit happened
    pub last_visit: DateTime<Utc>,
}

/// In-memory session store.
///
/// Requests for the same session are not served concurrently in the
/// assumed deployment model, so last-writer-wins on a single entry is
/// acceptable.
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a fresh anonymous session. The first request counts as a
    /// visit.
    pub fn create_session(&self, now: DateTime<Utc>) -> Result<Session> {
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id: None,
            visits: 1,
            last_visit: now,
        };

        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| anyhow::anyhow!("Failed to acquire session lock: {}", e))?;
        sessions.insert(session.id.clone(), session.clone());

        metrics::counter!("linkdex_sessions_created_total").increment(1);

        Ok(session)
    }

    pub fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| anyhow::anyhow!("Failed to acquire session lock: {}", e))?;

        Ok(sessions.get(session_id).cloned())
    }

    /// Record a visit: when more than zero whole days have passed since
    /// the last counted visit, the counter goes up and the timestamp
    /// resets; otherwise both stay put. Returns the resulting count, or
    /// None for an unknown session.
    pub fn record_visit(&self, session_id: &str, now: DateTime<Utc>) -> Result<Option<u32>> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| anyhow::anyhow!("Failed to acquire session lock: {}", e))?;

        let Some(session) = sessions.get_mut(session_id) else {
            return Ok(None);
        };

        if (now - session.last_visit).num_days() > 0 {
            session.visits += 1;
            session.last_visit = now;
        }

        metrics::counter!("linkdex_visits_recorded_total").increment(1);

        Ok(Some(session.visits))
    }

    /// Bind a logged-in user to the session. Returns false for an
    /// unknown session.
    pub fn bind_user(&self, session_id: &str, user_id: &str) -> Result<bool> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| anyhow::anyhow!("Failed to acquire session lock: {}", e))?;

        match sessions.get_mut(session_id) {
            Some(session) => {
                session.user_id = Some(user_id.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Get the bound user of a session, if any.
    pub fn user_id(&self, session_id: &str) -> Result<Option<String>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| anyhow::anyhow!("Failed to acquire session lock: {}", e))?;

        Ok(sessions.get(session_id).and_then(|s| s.user_id.clone()))
    }

    /// Delete a session (logout). The visit counter dies with it; the
    /// next request starts over at 1.
    pub fn delete_session(&self, session_id: &str) -> Result<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| anyhow::anyhow!("Failed to acquire session lock: {}", e))?;
        sessions.remove(session_id);
        Ok(())
    }

    pub fn session_count(&self) -> Result<usize> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| anyhow::anyhow!("Failed to acquire session lock: {}", e))?;

        Ok(sessions.len())
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_create_and_get_session() {
        let manager = SessionManager::new();
        let now = Utc::now();

        let session = manager.create_session(now).unwrap();
        assert_eq!(session.visits, 1);
        assert!(session.user_id.is_none());

        let fetched = manager.get_session(&session.id).unwrap().unwrap();
        assert_eq!(fetched.visits, 1);
        assert_eq!(fetched.last_visit, now);
    }

    #[test]
    fn test_same_day_visits_do_not_increment() {
        let manager = SessionManager::new();
        let now = Utc::now();
        let session = manager.create_session(now).unwrap();

        let visits = manager
            .record_visit(&session.id, now + Duration::hours(5))
            .unwrap();
        assert_eq!(visits, Some(1));

        let visits = manager
            .record_visit(&session.id, now + Duration::hours(23))
            .unwrap();
        assert_eq!(visits, Some(1));
    }

    #[test]
    fn test_later_day_visit_increments_once() {
        let manager = SessionManager::new();
        let now = Utc::now();
        let session = manager.create_session(now).unwrap();

        let visits = manager
            .record_visit(&session.id, now + Duration::days(1))
            .unwrap();
        assert_eq!(visits, Some(2));

        // The timestamp reset, so a follow-up request the same day stays put
        let visits = manager
            .record_visit(&session.id, now + Duration::days(1) + Duration::hours(1))
            .unwrap();
        assert_eq!(visits, Some(2));

        let visits = manager
            .record_visit(&session.id, now + Duration::days(3))
            .unwrap();
        assert_eq!(visits, Some(3));
    }

    #[test]
    fn test_record_visit_unknown_session() {
        let manager = SessionManager::new();
        let visits = manager.record_visit("invalid-id", Utc::now()).unwrap();
        assert_eq!(visits, None);
    }

    #[test]
    fn test_bind_and_unbind_user() {
        let manager = SessionManager::new();
        let session = manager.create_session(Utc::now()).unwrap();

        assert!(manager.bind_user(&session.id, "user123").unwrap());
        assert_eq!(
            manager.user_id(&session.id).unwrap(),
            Some("user123".to_string())
        );

        assert!(!manager.bind_user("invalid-id", "user123").unwrap());
    }

    #[test]
    fn test_delete_session() {
        let manager = SessionManager::new();
        let now = Utc::now();
        let s1 = manager.create_session(now).unwrap();
        let s2 = manager.create_session(now).unwrap();

        manager.delete_session(&s1.id).unwrap();

        assert!(manager.get_session(&s1.id).unwrap().is_none());
        assert!(manager.get_session(&s2.id).unwrap().is_some());
        assert_eq!(manager.session_count().unwrap(), 1);
    }
}
