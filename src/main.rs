//! Manual update trigger.

use clap::Parser;
use env_logger::Env;
use log::info;

use updock::{Config, DockerRuntime, UpdateRequest, Updater};

/// Pull a new image tag and recreate the running containers that use it.
#[derive(Parser)]
#[command(name = "updock", version)]
struct Cli {
    /// Image repository that received a push.
    repository: String,
    /// Tag that was pushed: `latest` or a semantic version.
    tag: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::load()?;

    // One runtime connection for the whole process; not being able to
    // reach the daemon is a startup failure, not a request failure.
    let runtime = DockerRuntime::connect(&config)?;
    let updater = Updater::new(runtime, &config);

    let request = UpdateRequest::new(cli.repository, cli.tag);
    let report = updater.apply_update(&request).await?;
    if report.nothing_to_do() {
        info!("no matching containers, nothing to do");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
