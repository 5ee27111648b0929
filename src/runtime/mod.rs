use anyhow::Result;
use async_trait::async_trait;
use bollard::container::Config;
use bollard::models::{ContainerInspectResponse, ContainerSummary, ImageDeleteResponseItem};

pub mod docker;
pub use docker::DockerRuntime;

/// The container-runtime collaborator the orchestrator drives.
///
/// The process holds one implementation for its whole lifetime and injects
/// it into the updater; tests substitute an in-memory fake.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// List currently running containers.
    async fn list_containers(&self) -> Result<Vec<ContainerSummary>>;

    /// Full inspect of a container by id.
    async fn inspect_container(&self, id: &str) -> Result<ContainerInspectResponse>;

    /// Remove a container by id, even while it is running when `force` is
    /// set.
    async fn remove_container(&self, id: &str, force: bool) -> Result<()>;

    /// Create a container under `name` and return its id.
    async fn create_container(&self, name: &str, config: Config<String>) -> Result<String>;

    /// Start a created container.
    async fn start_container(&self, id: &str) -> Result<()>;

    /// Pull an image reference, waiting for the pull to finish.
    async fn pull_image(&self, reference: &str) -> Result<()>;

    /// Remove an image by id or reference.
    async fn remove_image(&self, image: &str) -> Result<Vec<ImageDeleteResponseItem>>;
}
