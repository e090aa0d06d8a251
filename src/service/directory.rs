//! Collaborator interfaces
//!
//! Camera metadata, playback address decryption and access control live
//! outside this crate. These traits describe what the stream service needs
//! from them; the in-memory implementations back tests and the demo.

use std::collections::{HashMap, HashSet};

use crate::session::{SourceId, ViewerId};

/// Boxed error returned by collaborators
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Camera metadata as stored by the metadata service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    pub id: SourceId,
    /// Display name
    pub name: String,
    /// Human-readable location, used in user-facing messages
    pub location: String,
    /// Encrypted upstream playback address
    pub encrypted_url: String,
}

impl SourceRecord {
    pub fn new(
        id: impl Into<SourceId>,
        name: impl Into<String>,
        location: impl Into<String>,
        encrypted_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location: location.into(),
            encrypted_url: encrypted_url.into(),
        }
    }
}

/// Looks up camera metadata
pub trait SourceDirectory: Send + Sync {
    /// Fetch the record for `id`, or `None` if no such camera exists
    async fn lookup(&self, id: SourceId) -> Result<Option<SourceRecord>, BoxError>;
}

/// Decides whether a viewer may watch a camera
pub trait AccessPolicy: Send + Sync {
    async fn can_view(&self, source: SourceId, viewer: &ViewerId) -> Result<bool, BoxError>;
}

/// Turns a stored playback address into one the transcoder can open
pub trait PlaybackDecryptor: Send + Sync {
    fn decrypt(&self, encrypted: &str) -> Result<String, BoxError>;
}

/// In-memory camera directory
#[derive(Debug, Clone, Default)]
pub struct StaticSources {
    records: HashMap<SourceId, SourceRecord>,
}

impl StaticSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a camera
    pub fn insert(&mut self, record: SourceRecord) {
        self.records.insert(record.id, record);
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, record: SourceRecord) -> Self {
        self.insert(record);
        self
    }
}

impl SourceDirectory for StaticSources {
    async fn lookup(&self, id: SourceId) -> Result<Option<SourceRecord>, BoxError> {
        Ok(self.records.get(&id).cloned())
    }
}

/// In-memory access list
#[derive(Debug, Clone, Default)]
pub struct StaticAccess {
    grants: HashSet<(SourceId, ViewerId)>,
    allow_all: bool,
}

impl StaticAccess {
    pub fn new() -> Self {
        Self::default()
    }

    /// Policy that lets every viewer watch every camera
    pub fn allow_all() -> Self {
        Self {
            grants: HashSet::new(),
            allow_all: true,
        }
    }

    /// Allow `viewer` to watch `source`
    pub fn grant(mut self, source: impl Into<SourceId>, viewer: impl Into<ViewerId>) -> Self {
        self.grants.insert((source.into(), viewer.into()));
        self
    }
}

impl AccessPolicy for StaticAccess {
    async fn can_view(&self, source: SourceId, viewer: &ViewerId) -> Result<bool, BoxError> {
        Ok(self.allow_all || self.grants.contains(&(source, viewer.clone())))
    }
}

/// Decryptor for addresses stored in the clear
#[derive(Debug, Clone, Copy, Default)]
pub struct Plaintext;

impl PlaybackDecryptor for Plaintext {
    fn decrypt(&self, encrypted: &str) -> Result<String, BoxError> {
        Ok(encrypted.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_sources() {
        let sources = StaticSources::new().with(SourceRecord::new(
            SourceId(7),
            "Gate",
            "North entrance",
            "rtsp://10.0.0.7/stream",
        ));

        let record = sources.lookup(SourceId(7)).await.unwrap().unwrap();
        assert_eq!(record.name, "Gate");
        assert_eq!(record.location, "North entrance");
        assert!(sources.lookup(SourceId(8)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_static_access() {
        let access = StaticAccess::new().grant(SourceId(7), "alice");

        assert!(access.can_view(SourceId(7), &ViewerId::from("alice")).await.unwrap());
        assert!(!access.can_view(SourceId(7), &ViewerId::from("bob")).await.unwrap());
        assert!(!access.can_view(SourceId(8), &ViewerId::from("alice")).await.unwrap());

        let open = StaticAccess::allow_all();
        assert!(open.can_view(SourceId(8), &ViewerId::from("bob")).await.unwrap());
    }
}
