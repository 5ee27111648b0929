use std::future::Future;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bollard::container::{
    Config as CreateConfig, CreateContainerOptions, ListContainersOptions, RemoveContainerOptions,
    StartContainerOptions,
};
use bollard::image::{CreateImageOptions, RemoveImageOptions};
use bollard::models::{ContainerInspectResponse, ContainerSummary, ImageDeleteResponseItem};
use bollard::Docker;
use futures_util::stream::StreamExt;
use log::{debug, warn};
use tokio::time::timeout;

use super::ContainerRuntime;
use crate::config::Config;

/// [`ContainerRuntime`] backed by the local Docker daemon.
pub struct DockerRuntime {
    docker: Docker,
    op_timeout: Duration,
    pull_timeout: Duration,
}

impl DockerRuntime {
    /// Connect to the local Docker daemon using default settings.
    /// This honours `DOCKER_HOST` and handles the unix socket on Linux.
    /// Failure here is a startup condition, not a per-request error.
    pub fn connect(config: &Config) -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self {
            docker,
            op_timeout: config.op_timeout(),
            pull_timeout: config.pull_timeout(),
        })
    }

    /// Runs one daemon call under the per-operation deadline.
    async fn deadline<T>(
        &self,
        what: &str,
        fut: impl Future<Output = std::result::Result<T, bollard::errors::Error>>,
    ) -> Result<T> {
        match timeout(self.op_timeout, fut).await {
            Ok(res) => res.map_err(Into::into),
            Err(_) => Err(anyhow!("{} timed out after {:?}", what, self.op_timeout)),
        }
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn list_containers(&self) -> Result<Vec<ContainerSummary>> {
        let opts = ListContainersOptions::<String> {
            all: false,
            ..Default::default()
        };
        self.deadline("container list", self.docker.list_containers(Some(opts)))
            .await
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerInspectResponse> {
        self.deadline("container inspect", self.docker.inspect_container(id, None))
            .await
    }

    async fn remove_container(&self, id: &str, force: bool) -> Result<()> {
        let opts = RemoveContainerOptions {
            force,
            ..Default::default()
        };
        self.deadline(
            "container remove",
            self.docker.remove_container(id, Some(opts)),
        )
        .await
    }

    async fn create_container(&self, name: &str, config: CreateConfig<String>) -> Result<String> {
        let opts = CreateContainerOptions {
            name: name.to_string(),
            ..Default::default()
        };
        let created = self
            .deadline(
                "container create",
                self.docker.create_container(Some(opts), config),
            )
            .await?;
        for warning in &created.warnings {
            warn!("create warning for {}: {}", name, warning);
        }
        Ok(created.id)
    }

    async fn start_container(&self, id: &str) -> Result<()> {
        self.deadline(
            "container start",
            self.docker
                .start_container(id, None::<StartContainerOptions<String>>),
        )
        .await
    }

    async fn pull_image(&self, reference: &str) -> Result<()> {
        let opts = CreateImageOptions {
            from_image: reference.to_string(),
            ..Default::default()
        };
        let mut stream = self.docker.create_image(Some(opts), None, None);
        // Progress output is discarded; only completion or error matters.
        let drain = async {
            while let Some(progress) = stream.next().await {
                let info = progress?;
                debug!("pull {}: {:?} {:?}", reference, info.status, info.progress);
            }
            Ok::<_, bollard::errors::Error>(())
        };
        match timeout(self.pull_timeout, drain).await {
            Ok(res) => res.map_err(Into::into),
            Err(_) => Err(anyhow!(
                "pull of {} timed out after {:?}",
                reference,
                self.pull_timeout
            )),
        }
    }

    async fn remove_image(&self, image: &str) -> Result<Vec<ImageDeleteResponseItem>> {
        self.deadline(
            "image remove",
            self.docker.remove_image(image, None::<RemoveImageOptions>, None),
        )
        .await
    }
}
