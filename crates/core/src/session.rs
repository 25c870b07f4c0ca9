//! Process-wide session state with an explicit sign-in / sign-out lifecycle.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Identity attached to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub username: String,
    pub full_name: String,
}

/// A live session created on sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found")]
    NotFound,
    #[error("session store lock poisoned")]
    Poisoned,
}

impl<T> From<PoisonError<T>> for SessionError {
    fn from(_: PoisonError<T>) -> Self {
        Self::Poisoned
    }
}

/// Storage for signed-in sessions.
pub trait SessionStore: Send + Sync {
    /// Starts a session for `user`, issuing a fresh token.
    fn sign_in(&self, user: SessionUser, now: DateTime<Utc>) -> Result<Session, SessionError>;
    /// Returns the session bound to `token`, if any.
    fn current(&self, token: &str) -> Result<Option<Session>, SessionError>;
    /// Ends the session bound to `token`, returning it.
    fn sign_out(&self, token: &str) -> Result<Session, SessionError>;
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|map| map.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for InMemorySessionStore {
    fn sign_in(&self, user: SessionUser, now: DateTime<Utc>) -> Result<Session, SessionError> {
        let session = Session {
            token: Uuid::new_v4().to_string(),
            user,
            started_at: now,
        };
        self.sessions
            .write()?
            .insert(session.token.clone(), session.clone());
        Ok(session)
    }

    fn current(&self, token: &str) -> Result<Option<Session>, SessionError> {
        Ok(self.sessions.read()?.get(token).cloned())
    }

    fn sign_out(&self, token: &str) -> Result<Session, SessionError> {
        self.sessions
            .write()?
            .remove(token)
            .ok_or(SessionError::NotFound)
    }
}
