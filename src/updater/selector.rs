//! Selection stage: which running containers need the update.

use log::{info, warn};

use crate::error::UpdateError;
use crate::reference;
use crate::runtime::ContainerRuntime;
use crate::types::SelectedContainer;
use crate::version;

/// Outcome for a single observed container image.
pub(crate) enum Decision {
    Update,
    Skip,
    /// One of the two tags is not a semantic version; the candidate is
    /// excluded without failing the run.
    Unparseable(semver::Error),
}

pub(crate) fn decide(image: &str, repository: &str, target_tag: &str) -> Decision {
    let (repo, tag) = reference::split_image(image);
    if repo != repository {
        return Decision::Skip;
    }
    match version::should_update(tag, target_tag) {
        Ok(true) => Decision::Update,
        Ok(false) => Decision::Skip,
        Err(err) => Decision::Unparseable(err),
    }
}

/// Lists running containers and returns the ones that should move to
/// `repository:target_tag`, in listing order.
pub(crate) async fn select<R: ContainerRuntime + ?Sized>(
    runtime: &R,
    repository: &str,
    target_tag: &str,
) -> Result<Vec<SelectedContainer>, UpdateError> {
    let containers = runtime
        .list_containers()
        .await
        .map_err(|err| UpdateError::ListContainers { err })?;

    let mut selected = Vec::new();
    let mut observed = Vec::new();
    for container in containers {
        let (id, image) = match (container.id, container.image) {
            (Some(id), Some(image)) => (id, image),
            _ => continue,
        };
        observed.push(image.clone());

        match decide(&image, repository, target_tag) {
            Decision::Update => {
                info!("will update {} ({} -> {})", id, image, target_tag);
                selected.push(SelectedContainer { id, image });
            }
            Decision::Skip => {}
            Decision::Unparseable(err) => {
                warn!(
                    "skipping container {} ({}): tag not comparable with {:?}: {}",
                    id, image, target_tag, err
                );
            }
        }
    }

    if !observed.is_empty() {
        info!("running container images: {}", observed.join(", "));
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wants(image: &str, repository: &str, target: &str) -> bool {
        matches!(decide(image, repository, target), Decision::Update)
    }

    #[test]
    fn other_repositories_are_ignored() {
        assert!(!wants("db:1.0.0", "app", "2.0.0"));
        assert!(!wants("app-sidecar:1.0.0", "app", "2.0.0"));
    }

    #[test]
    fn untagged_image_counts_as_latest() {
        assert!(wants("app", "app", "latest"));
        assert!(!wants("app", "app", "1.3.0"));
    }

    #[test]
    fn newer_concrete_tag_is_picked_up() {
        assert!(wants("app:1.2.0", "app", "1.3.0"));
        assert!(!wants("app:1.3.0", "app", "1.3.0"));
    }

    #[test]
    fn registry_port_is_part_of_the_repository() {
        assert!(wants("registry:5000/app:1.2.0", "registry:5000/app", "1.3.0"));
        assert!(!wants("registry:5000/app:1.2.0", "app", "1.3.0"));
    }

    #[test]
    fn unparseable_tag_is_reported_as_such() {
        assert!(matches!(
            decide("app:weird", "app", "1.3.0"),
            Decision::Unparseable(_)
        ));
        assert!(matches!(
            decide("app:1.2.0", "app", "weird"),
            Decision::Unparseable(_)
        ));
    }
}
