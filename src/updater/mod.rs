//! The update orchestrator.
//!
//! One invocation handles one "image updated" notification: select the
//! running containers that use the repository and are outdated relative to
//! the pushed tag, pull the new image, then recreate each selected
//! container in place. Invocations for the same repository are serialized
//! so overlapping triggers cannot race each other's remove/create sequence;
//! distinct repositories proceed independently.

mod fetcher;
mod recreator;
mod selector;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::info;

use crate::config::Config;
use crate::error::UpdateError;
use crate::runtime::ContainerRuntime;
use crate::types::{UpdateReport, UpdateRequest};

/// Orchestrates container updates against an injected runtime.
///
/// Holds no state between invocations beyond the runtime handle and the
/// per-repository locks; every run re-reads live container state.
pub struct Updater<R> {
    runtime: R,
    reclaim_images: bool,
    repo_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl<R: ContainerRuntime> Updater<R> {
    pub fn new(runtime: R, config: &Config) -> Self {
        Self {
            runtime,
            reclaim_images: config.reclaim_images,
            repo_locks: Mutex::new(HashMap::new()),
        }
    }

    fn repo_lock(&self, repository: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.repo_locks.lock().expect("repository lock map poisoned");
        locks.entry(repository.to_string()).or_default().clone()
    }

    /// Applies one update notification. See the crate docs for the exact
    /// failure semantics; in short, everything up to and including the pull
    /// leaves the system untouched, while a recreation failure aborts the
    /// run mid-way and relies on a retry to pick up the rest.
    pub async fn apply_update(&self, request: &UpdateRequest) -> Result<UpdateReport, UpdateError> {
        if request.repository.is_empty() || request.tag.is_empty() {
            return Err(UpdateError::MissingField);
        }

        let lock = self.repo_lock(&request.repository);
        let _serialized = lock.lock().await;

        info!("updating {}:{}...", request.repository, request.tag);

        let selected = selector::select(&self.runtime, &request.repository, &request.tag).await?;
        if selected.is_empty() {
            info!(
                "no containers to update with image {}:{}, skipping",
                request.repository, request.tag
            );
            return Ok(UpdateReport {
                repository: request.repository.clone(),
                tag: request.tag.clone(),
                recreated: Vec::new(),
                pull_elapsed: None,
            });
        }

        let (reference, pull_elapsed) =
            fetcher::pull(&self.runtime, &request.repository, &request.tag).await?;

        let recreated =
            recreator::recreate_all(&self.runtime, &reference, selected, self.reclaim_images)
                .await?;

        info!(
            "update of {} done, {} containers recreated",
            reference,
            recreated.len()
        );
        Ok(UpdateReport {
            repository: request.repository.clone(),
            tag: request.tag.clone(),
            recreated,
            pull_elapsed: Some(pull_elapsed),
        })
    }
}
