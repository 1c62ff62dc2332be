use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::presets::{find_preset, TemplatePreset};
use crate::models::Document;

/// One user's editing session. Owns its Document outright.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub template: Option<String>,
    pub document: Document,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl Session {
    fn new(preset: Option<&TemplatePreset>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            template: preset.map(|p| p.id.to_string()),
            document: preset.map(Document::from_preset).unwrap_or_default(),
            created_at: now,
            last_active: now,
        }
    }

    /// Fresh document from the session's template, or a blank one.
    fn reset(&mut self) {
        self.document = self
            .template
            .as_deref()
            .and_then(find_preset)
            .map(Document::from_preset)
            .unwrap_or_default();
    }
}

/// In-memory session map. Cloning shares the same map.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, preset: Option<&TemplatePreset>) -> Session {
        let session = Session::new(preset, Utc::now());
        self.inner
            .write()
            .await
            .insert(session.id, session.clone());
        session
    }

    /// Returns a snapshot and marks the session active.
    pub async fn get(&self, id: Uuid) -> Option<Session> {
        let mut sessions = self.inner.write().await;
        let session = sessions.get_mut(&id)?;
        session.last_active = Utc::now();
        Some(session.clone())
    }

    /// Runs `edit` against the session's document under the write lock.
    /// `None` when the session does not exist.
    pub async fn update<T>(&self, id: Uuid, edit: impl FnOnce(&mut Document) -> T) -> Option<T> {
        let mut sessions = self.inner.write().await;
        let session = sessions.get_mut(&id)?;
        session.last_active = Utc::now();
        Some(edit(&mut session.document))
    }

    pub async fn reset(&self, id: Uuid) -> Option<Session> {
        let mut sessions = self.inner.write().await;
        let session = sessions.get_mut(&id)?;
        session.reset();
        session.last_active = Utc::now();
        Some(session.clone())
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.inner.write().await.remove(&id).is_some()
    }

    /// Drops sessions idle for longer than `ttl` as of `now`. Returns how many.
    pub async fn purge_expired(&self, ttl: Duration, now: DateTime<Utc>) -> usize {
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| now - s.last_active <= ttl);
        before - sessions.len()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}
