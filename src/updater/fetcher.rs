//! Pull stage: fetch the new image before any container is touched.

use std::time::{Duration, Instant};

use log::info;

use crate::error::UpdateError;
use crate::reference::ImageReference;
use crate::runtime::ContainerRuntime;

/// Normalizes `repository:tag` and pulls it to completion, returning the
/// canonical reference and the pull wall time. Nothing has been removed or
/// created when this fails, so the whole request stays retryable.
pub(crate) async fn pull<R: ContainerRuntime + ?Sized>(
    runtime: &R,
    repository: &str,
    tag: &str,
) -> Result<(ImageReference, Duration), UpdateError> {
    let reference = ImageReference::new(repository, tag)
        .map_err(|reason| UpdateError::BadReference { reason })?;

    info!("pulling {}...", reference);
    let started = Instant::now();
    runtime
        .pull_image(&reference.to_string())
        .await
        .map_err(|err| UpdateError::Pull {
            reference: reference.to_string(),
            err,
        })?;
    let elapsed = started.elapsed();
    info!("{} pulled in {:?}", reference, elapsed);
    Ok((reference, elapsed))
}
