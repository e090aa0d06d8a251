//! Viewer index
//!
//! Maps each viewer to the one source it is currently watching.

use std::collections::HashMap;

use super::key::{SourceId, ViewerId};

/// Viewer -> source attachment map
#[derive(Debug, Default)]
pub struct ViewerIndex {
    attachments: HashMap<ViewerId, SourceId>,
}

impl ViewerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source the viewer is attached to, if any
    pub fn source_of(&self, viewer: &ViewerId) -> Option<SourceId> {
        self.attachments.get(viewer).copied()
    }

    /// Source the viewer is attached to, if it differs from `source`
    pub fn other_source(&self, viewer: &ViewerId, source: SourceId) -> Option<SourceId> {
        self.source_of(viewer).filter(|&current| current != source)
    }

    /// Record that `viewer` watches `source`, replacing any previous attachment
    pub fn attach(&mut self, viewer: ViewerId, source: SourceId) -> Option<SourceId> {
        self.attachments.insert(viewer, source)
    }

    /// Remove the viewer's attachment only if it points at `source`
    pub fn detach(&mut self, viewer: &ViewerId, source: SourceId) -> bool {
        if self.source_of(viewer) == Some(source) {
            self.attachments.remove(viewer);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }

    pub fn clear(&mut self) {
        self.attachments.clear();
    }
}
