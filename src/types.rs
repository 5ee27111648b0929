//! Data structures shared across the updater.
//!
//! These are the boundary types between the orchestrator core and whatever
//! trigger layer sits in front of it (CLI, webhook receiver). The request
//! and report are serialised using [`serde`](https://serde.rs/) so callers
//! can move them over a wire; the intermediate selection type is
//! runtime-derived state and only lives for a single invocation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// An "image updated" notification: the repository that changed and the tag
/// that was pushed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub repository: String,
    pub tag: String,
}

impl UpdateRequest {
    pub fn new(repository: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            tag: tag.into(),
        }
    }
}

/// A running container picked for recreation, as seen in the runtime's
/// container listing.
#[derive(Debug, Clone)]
pub struct SelectedContainer {
    pub id: String,
    pub image: String,
}

/// A container that was successfully moved to the new image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecreatedContainer {
    /// Id of the replacement container.
    pub id: String,
    /// Name carried over from the replaced container.
    pub name: String,
    /// Image id the replaced container was running.
    pub previous_image_id: String,
    /// Whether the superseded image was removed afterwards.
    pub image_reclaimed: bool,
}

/// Outcome of a fully successful update run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateReport {
    pub repository: String,
    pub tag: String,
    pub recreated: Vec<RecreatedContainer>,
    /// Wall time spent pulling the image; absent when nothing was selected
    /// and the pull was skipped.
    pub pull_elapsed: Option<Duration>,
}

impl UpdateReport {
    /// True when no running container matched the request and nothing was
    /// touched.
    pub fn nothing_to_do(&self) -> bool {
        self.recreated.is_empty()
    }
}
