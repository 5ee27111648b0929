//! Error taxonomy for the update orchestrator.
//!
//! Fatal failures surface to the caller as one of these variants; the
//! per-candidate tag parse failures of the selection stage never do, they
//! only shrink the selection set.

use std::fmt;

use thiserror::Error;

use crate::types::RecreatedContainer;

/// The step of the per-container recreation sequence that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecreateStage {
    Inspect,
    Remove,
    Create,
    Start,
}

impl fmt::Display for RecreateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecreateStage::Inspect => "inspect",
            RecreateStage::Remove => "remove",
            RecreateStage::Create => "create",
            RecreateStage::Start => "start",
        };
        f.write_str(s)
    }
}

/// A fatal update failure.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// The request was rejected before any runtime interaction.
    #[error("repository and tag must both be provided")]
    MissingField,

    /// The running-container listing could not be obtained; nothing was
    /// touched.
    #[error("listing containers failed: {err}")]
    ListContainers { err: anyhow::Error },

    /// `repository:tag` does not form a valid image reference; nothing was
    /// touched.
    #[error("invalid image reference: {reason}")]
    BadReference { reason: String },

    /// The image pull failed; no container had been removed or created yet,
    /// so the whole request is safe to retry.
    #[error("pulling image {reference} failed: {err}")]
    Pull {
        reference: String,
        err: anyhow::Error,
    },

    /// A container recreation step failed and the run was aborted. This is
    /// a partial-failure state: `recreated` lists the containers already
    /// moved to the new image, containers after the failing one were never
    /// reached, and `original_present` says whether the failing container
    /// itself is still around (never removed, or restored after a failed
    /// create/start). A retried request re-selects from live state and
    /// picks up whatever is still outdated.
    #[error("{stage} failed for container {name}: {err}")]
    Recreate {
        name: String,
        stage: RecreateStage,
        err: anyhow::Error,
        recreated: Vec<RecreatedContainer>,
        original_present: bool,
    },
}
