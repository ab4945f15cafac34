mod cli;
mod config;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use harvest_core::{normalize_username, RunFailure, RunSummary};
use harvest_engine::{
    payload_channel, Coordinator, HarvestError, HttpPager, ReqwestTransport, RequestKind,
    RunRequest, SessionProvider, StaticSession,
};
use harvest_logging::{harvest_error, harvest_info, LogDestination};
use log::LevelFilter;

use cli::Cli;
use config::{Overrides, RunConfig};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let destination = match &cli.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    harvest_logging::initialize(destination, level);

    match run(&cli) {
        Ok(summary) => {
            print_json(&summary);
            ExitCode::SUCCESS
        }
        Err(err) => {
            harvest_error!("{:#}", err);
            print_json(&RunFailure::new(format!("{err:#}")));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<RunSummary> {
    let mut config = RunConfig::load(&cli.config)?;
    config.apply(&Overrides {
        storage_root: cli.storage_root.clone(),
        concurrency: cli.concurrency,
        limit: cli.limit,
        collections: cli.collections.clone(),
    });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting the async runtime")?;
    runtime.block_on(harvest(config, &cli.username))
}

async fn harvest(config: RunConfig, username: &str) -> anyhow::Result<RunSummary> {
    let username = normalize_username(username);
    let transport =
        Arc::new(ReqwestTransport::new(config.transport.clone()).map_err(HarvestError::Transport)?);
    let session = Arc::new(StaticSession::new(&config.session)?);

    let (sender, responses) = payload_channel();
    let mut pager = HttpPager::new(
        transport.clone(),
        &config.source,
        &username,
        session.headers(RequestKind::Discovery),
        sender,
        config.transport.max_payload_bytes,
    );

    harvest_info!(
        "Storing into {:?} with {} parallel downloads",
        config.harvest.storage_root,
        config.harvest.concurrency
    );
    let request = RunRequest {
        platform: config.source.platform,
        username,
        max_items: config.harvest.max_items,
    };
    let coordinator = Coordinator::new(config.harvest, transport, session);
    let summary = coordinator.run(&request, &mut pager, responses).await?;
    Ok(summary)
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(err) => harvest_error!("Failed to serialize output: {}", err),
    }
}
