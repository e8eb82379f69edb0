// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

mod config;
mod source;
mod statsd;

use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use config::Config;
use dogstatsd_client::StatsdClient;
use garbagedog_core::GcLogPipeline;
use statsd::DogStatsdSink;

#[tokio::main]
pub async fn main() {
    let config = Config::parse();

    let log_level = if config.verbose { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::new(log_level))
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    if let Err(e) = config.validate() {
        error!("{e}");
        std::process::exit(1);
    }

    let client = match StatsdClient::new(
        &config.statsd_host,
        config.statsd_port,
        config.tags.clone(),
    ) {
        Ok(client) => client,
        Err(e) => {
            error!("Error creating statsd client on startup: {e}");
            std::process::exit(1);
        }
    };

    // One pipeline per log stream; this process watches exactly one.
    let mut pipeline = GcLogPipeline::new(DogStatsdSink::new(client));

    let result = if config.stdin {
        debug!("reading GC log lines from stdin");
        source::run_from_stdin(&mut pipeline).await
    } else if let Some(log_dir) = config.log_dir.as_deref() {
        info!("watching {} for gc logs", log_dir.display());
        let cancel = CancellationToken::new();
        let canceller = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutting down");
                canceller.cancel();
            }
        });
        source::run_from_log_dir(
            log_dir,
            Duration::from_secs(config.refresh_logfiles_seconds),
            Duration::from_secs(config.sleep_seconds),
            cancel,
            &mut pipeline,
        )
        .await
    } else {
        // clap enforces the source selection; this arm is unreachable.
        error!("either --log-dir or --stdin is required");
        std::process::exit(1);
    };

    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}
