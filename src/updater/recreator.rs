//! Recreation stage: replace each selected container in place.
//!
//! Per container the sequence is inspect, force-remove, create with the
//! same config/host config/network endpoints under the original name but
//! with the image rewritten, start, then reclaim the superseded image.
//! Containers are processed strictly one at a time and the first failed
//! step aborts the run; containers recreated earlier stay on the new image.

use bollard::container::{Config as CreateConfig, NetworkingConfig};
use log::{error, info, warn};

use crate::error::{RecreateStage, UpdateError};
use crate::reference::ImageReference;
use crate::runtime::ContainerRuntime;
use crate::types::{RecreatedContainer, SelectedContainer};

struct RecreateFailure {
    name: String,
    stage: RecreateStage,
    err: anyhow::Error,
    original_present: bool,
}

pub(crate) async fn recreate_all<R: ContainerRuntime + ?Sized>(
    runtime: &R,
    reference: &ImageReference,
    selected: Vec<SelectedContainer>,
    reclaim_images: bool,
) -> Result<Vec<RecreatedContainer>, UpdateError> {
    info!("recreating {} containers...", selected.len());
    let mut recreated = Vec::new();
    for container in selected {
        match recreate_one(runtime, reference, &container, reclaim_images).await {
            Ok(done) => recreated.push(done),
            Err(failure) => {
                return Err(UpdateError::Recreate {
                    name: failure.name,
                    stage: failure.stage,
                    err: failure.err,
                    original_present: failure.original_present,
                    recreated,
                })
            }
        }
    }
    Ok(recreated)
}

async fn recreate_one<R: ContainerRuntime + ?Sized>(
    runtime: &R,
    reference: &ImageReference,
    container: &SelectedContainer,
    reclaim_images: bool,
) -> Result<RecreatedContainer, RecreateFailure> {
    let inspect = runtime
        .inspect_container(&container.id)
        .await
        .map_err(|err| RecreateFailure {
            name: container.id.clone(),
            stage: RecreateStage::Inspect,
            err,
            original_present: true,
        })?;

    let name = inspect
        .name
        .as_deref()
        .map(|n| n.trim_start_matches('/').to_string())
        .unwrap_or_else(|| container.id.clone());
    let previous_image_id = inspect.image.clone().unwrap_or_default();

    // The full snapshot is carried until the replacement has started so the
    // original can be put back if creation goes wrong.
    let base: CreateConfig<String> = inspect.config.clone().map(Into::into).unwrap_or_default();
    // No explicit network config unless the original actually had
    // attachments.
    let networking = inspect
        .network_settings
        .as_ref()
        .and_then(|settings| settings.networks.clone())
        .filter(|endpoints| !endpoints.is_empty())
        .map(|endpoints| NetworkingConfig {
            endpoints_config: endpoints,
        });

    let mut replacement = base.clone();
    replacement.image = Some(reference.image_field());
    replacement.host_config = inspect.host_config.clone();
    replacement.networking_config = networking.clone();

    let mut original = base;
    original.host_config = inspect.host_config.clone();
    original.networking_config = networking;

    // Destructive and not reversible: the name slot stays empty until a
    // create succeeds.
    runtime
        .remove_container(&container.id, true)
        .await
        .map_err(|err| RecreateFailure {
            name: name.clone(),
            stage: RecreateStage::Remove,
            err,
            original_present: true,
        })?;

    let new_id = match runtime.create_container(&name, replacement).await {
        Ok(id) => id,
        Err(err) => {
            let original_present = restore_original(runtime, &name, original).await;
            return Err(RecreateFailure {
                name,
                stage: RecreateStage::Create,
                err,
                original_present,
            });
        }
    };

    if let Err(err) = runtime.start_container(&new_id).await {
        // Clear the name slot again before putting the original back.
        if let Err(remove_err) = runtime.remove_container(&new_id, true).await {
            warn!(
                "removing unstartable replacement for {} failed: {}",
                name, remove_err
            );
        }
        let original_present = restore_original(runtime, &name, original).await;
        return Err(RecreateFailure {
            name,
            stage: RecreateStage::Start,
            err,
            original_present,
        });
    }
    info!("container {} recreated as {} on {}", name, new_id, reference);

    let image_reclaimed = if reclaim_images {
        reclaim_previous(runtime, &name, &new_id, &previous_image_id).await
    } else {
        false
    };

    Ok(RecreatedContainer {
        id: new_id,
        name,
        previous_image_id,
        image_reclaimed,
    })
}

/// Removes the image the replaced container was running, if the replacement
/// is backed by a different one. Failures only cost us the cleanup; the
/// update itself has already succeeded.
async fn reclaim_previous<R: ContainerRuntime + ?Sized>(
    runtime: &R,
    name: &str,
    new_id: &str,
    previous_image_id: &str,
) -> bool {
    if previous_image_id.is_empty() {
        return false;
    }
    let new_image_id = match runtime.inspect_container(new_id).await {
        Ok(inspect) => inspect.image.unwrap_or_default(),
        Err(err) => {
            warn!(
                "inspect of replacement {} failed, leaving previous image in place: {}",
                name, err
            );
            return false;
        }
    };
    if new_image_id == previous_image_id {
        return false;
    }

    info!("removing superseded image {}...", previous_image_id);
    match runtime.remove_image(previous_image_id).await {
        Ok(items) => {
            for item in items {
                if let Some(untagged) = item.untagged {
                    info!(" - untagged: {}", untagged);
                }
                if let Some(deleted) = item.deleted {
                    info!(" - deleted: {}", deleted);
                }
            }
            true
        }
        Err(err) => {
            error!("removing previous image {} failed: {}", previous_image_id, err);
            false
        }
    }
}

/// Best-effort fallback once the original container is gone and its
/// replacement could not be brought up: recreate the original from the
/// retained snapshot. Returns whether it is running again.
async fn restore_original<R: ContainerRuntime + ?Sized>(
    runtime: &R,
    name: &str,
    original: CreateConfig<String>,
) -> bool {
    warn!("recreation of {} failed, restoring the original container", name);
    let id = match runtime.create_container(name, original).await {
        Ok(id) => id,
        Err(err) => {
            error!("restore of {} failed at create: {}", name, err);
            return false;
        }
    };
    match runtime.start_container(&id).await {
        Ok(()) => {
            info!("original container {} restored as {}", name, id);
            true
        }
        Err(err) => {
            error!("restore of {} failed at start: {}", name, err);
            false
        }
    }
}
