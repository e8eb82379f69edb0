// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Raw-line sources feeding a GC log pipeline: standard input, or a
//! directory of rotating log files.
//!
//! All suspension points live here. The pipeline itself is a synchronous
//! transform; these drivers block on input (stdin reads, poll sleeps) and
//! hand each line over as it becomes available.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use tokio::io::AsyncBufReadExt;
use tokio_util::sync::CancellationToken;
use tracing::info;

use garbagedog_core::{GcLogPipeline, MetricSink, ParseError};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("no gc logs found in {}", .0.display())]
    NoLogsFound(PathBuf),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Feeds the pipeline from standard input until EOF, then flushes the
/// trailing record.
pub async fn run_from_stdin<S: MetricSink>(
    pipeline: &mut GcLogPipeline<S>,
) -> Result<(), SourceError> {
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        pipeline.handle_line(&line)?;
    }
    pipeline.finish()?;
    Ok(())
}

/// Tails the newest `gc*` file in a directory.
///
/// GC logs rotate, so whenever no output has been seen for the refresh
/// window the newest log file is reselected and tailing resumes from its
/// end. Stops on cancellation and flushes the in-flight record.
pub async fn run_from_log_dir<S: MetricSink>(
    log_dir: &Path,
    refresh_logfiles: Duration,
    poll_interval: Duration,
    cancel: CancellationToken,
    pipeline: &mut GcLogPipeline<S>,
) -> Result<(), SourceError> {
    let mut reader: Option<BufReader<File>> = None;
    let mut last_new_line: Option<Instant> = None;

    while !cancel.is_cancelled() {
        let stale = last_new_line.map_or(true, |seen| seen.elapsed() >= refresh_logfiles);
        if stale {
            let newest = newest_log_file(log_dir)?;
            info!("now reading from {}", newest.display());
            let mut file = File::open(&newest)?;
            file.seek(SeekFrom::End(0))?;
            reader = Some(BufReader::new(file));
            last_new_line = Some(Instant::now());
        }
        let Some(file_reader) = reader.as_mut() else {
            continue;
        };

        let mut line = String::new();
        if file_reader.read_line(&mut line)? == 0 {
            tokio::select! {
                _ = tokio::time::sleep(poll_interval) => {}
                _ = cancel.cancelled() => break,
            }
        } else {
            last_new_line = Some(Instant::now());
            pipeline.handle_line(&line)?;
        }
    }

    pipeline.finish()?;
    Ok(())
}

/// Picks the most recently created `gc*` file in the directory, falling
/// back to modification time where the filesystem has no creation stamp.
fn newest_log_file(log_dir: &Path) -> Result<PathBuf, SourceError> {
    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in fs::read_dir(log_dir)? {
        let entry = entry?;
        if !entry.file_name().to_string_lossy().starts_with("gc") {
            continue;
        }
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let stamp = match metadata.created() {
            Ok(created) => created,
            Err(_) => metadata.modified()?,
        };
        if newest.as_ref().map_or(true, |(best, _)| stamp > *best) {
            newest = Some((stamp, entry.path()));
        }
    }
    newest
        .map(|(_, path)| path)
        .ok_or_else(|| SourceError::NoLogsFound(log_dir.to_path_buf()))
}
