use std::path::Path;

use anyhow::Context;
use chrono::Local;
use env_logger::Env;
use pricewatch::{
    configuration::get_configuration,
    domain::listing::RunMetadata,
    services::{geo, orchestrator::run_targets, sink::CsvSink, WebSession},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().expect("Failed to read configuration.");
    let started_at = Local::now();

    let location = match configuration.run.location.clone() {
        Some(tag) => tag,
        None => geo::resolve_location()
            .await
            .unwrap_or_else(|| "Unknown".to_string()),
    };
    let meta = RunMetadata::new(&started_at, location);

    std::fs::create_dir_all(&configuration.run.output_dir)
        .context("Failed to create the output directory")?;
    let sink = CsvSink::new(Path::new(&configuration.run.output_dir), &started_at);

    let session = WebSession::connect(&configuration.webdriver.server_url)
        .await
        .context("Failed to connect to the webdriver server")?;

    log::info!(
        "Run started: {} targets, writing to {}",
        configuration.run.targets.len(),
        sink.path().display()
    );

    run_targets(
        &session,
        &sink,
        &configuration.run.targets,
        &meta,
        &configuration.run.retry_policy(),
        &configuration.run.scrape_limits(),
    )
    .await;

    session.quit().await.context("Failed to close the session")?;
    Ok(())
}
