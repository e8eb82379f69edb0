// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Metric derivation from completed GC records.
//!
//! [`EventProcessor`] owns the rolling state (previous major/minor pause
//! timestamps, previous heap-size observation) that turns a stream of
//! independent records into inter-event gaps and an allocation rate. It
//! must see records exactly once, in framing order, and must not be shared
//! between unrelated log streams.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use tracing::warn;

use crate::errors::ParseError;
use crate::event::{GcEventType, GcSizeInfo};
use crate::patterns;

/// Histogram of wall-clock seconds between consecutive major collections.
pub const TIME_BETWEEN_OLD_GC: &str = "garbagedog_time_between_old_gc";
/// Histogram of wall-clock seconds between consecutive minor collections.
pub const TIME_BETWEEN_YOUNG_GC: &str = "garbagedog_time_between_young_gc";
/// Timing of one GC event, tagged with `stw:` and `event_type:`.
pub const GC_EVENT_DURATION: &str = "garbagedog_gc_event_duration";
/// Histogram of kilobytes allocated per second between size observations.
pub const ALLOCATION_RATE_HISTOGRAM: &str = "garbagedog_allocation_rate_histogram";

/// Destination for derived observations.
///
/// Implementations are fire-and-forget; the processor never inspects
/// delivery outcomes. Tags are `key:value` strings.
pub trait MetricSink {
    fn timing(&self, metric: &str, seconds: f64, tags: &[String]);
    fn histogram(&self, metric: &str, value: f64, tags: &[String]);
}

impl<S: MetricSink + ?Sized> MetricSink for &S {
    fn timing(&self, metric: &str, seconds: f64, tags: &[String]) {
        (**self).timing(metric, seconds, tags);
    }

    fn histogram(&self, metric: &str, value: f64, tags: &[String]) {
        (**self).histogram(metric, value, tags);
    }
}

impl<S: MetricSink + ?Sized> MetricSink for Arc<S> {
    fn timing(&self, metric: &str, seconds: f64, tags: &[String]) {
        (**self).timing(metric, seconds, tags);
    }

    fn histogram(&self, metric: &str, value: f64, tags: &[String]) {
        (**self).histogram(metric, value, tags);
    }
}

/// Derives metrics from completed GC records and forwards them to a sink.
pub struct EventProcessor<S> {
    sink: S,
    last_major_time: Option<DateTime<FixedOffset>>,
    last_minor_time: Option<DateTime<FixedOffset>>,
    last_size_observation: Option<(DateTime<FixedOffset>, GcSizeInfo)>,
}

impl<S: MetricSink> EventProcessor<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            last_major_time: None,
            last_minor_time: None,
            last_size_observation: None,
        }
    }

    /// Processes one completed record, in arrival order.
    ///
    /// The three derivations (pause frequency, event duration, allocation
    /// rate) each run against the full record text independently; a single
    /// record can emit anywhere from zero to three metrics. An empty record
    /// carries no event and is a no-op.
    pub fn process(&mut self, record: &str) -> Result<(), ParseError> {
        if record.is_empty() {
            return Ok(());
        }
        self.track_pause_frequency(record)?;
        self.emit_event_duration(record)?;
        self.emit_allocation_rate(record)?;
        Ok(())
    }

    /// Tracks the gap between consecutive stop-the-world collections of the
    /// same generation. Only records opening with an absolute timestamp
    /// participate. The major check runs first; the two branches are
    /// mutually exclusive.
    fn track_pause_frequency(&mut self, record: &str) -> Result<(), ParseError> {
        let Some(event_time) = patterns::leading_absolute_timestamp(record)? else {
            return Ok(());
        };
        if contains_any(record, &[GcEventType::CmsInitialMark, GcEventType::FullGc]) {
            if let Some(previous) = self.last_major_time {
                self.emit_gap(TIME_BETWEEN_OLD_GC, previous, event_time);
            }
            self.last_major_time = Some(event_time);
        } else if contains_any(record, &[GcEventType::ParNew, GcEventType::PsYoungGen]) {
            if let Some(previous) = self.last_minor_time {
                self.emit_gap(TIME_BETWEEN_YOUNG_GC, previous, event_time);
            }
            self.last_minor_time = Some(event_time);
        }
        Ok(())
    }

    fn emit_gap(
        &self,
        metric: &str,
        previous: DateTime<FixedOffset>,
        current: DateTime<FixedOffset>,
    ) {
        let elapsed = seconds_between(previous, current);
        if elapsed <= 0.0 {
            warn!(
                metric,
                %previous,
                %current,
                "non-positive gap between collections, skipping emission"
            );
            return;
        }
        self.sink.histogram(metric, elapsed, &[]);
    }

    fn emit_event_duration(&self, record: &str) -> Result<(), ParseError> {
        let Some(duration) = patterns::parse_record_duration(record)? else {
            return Ok(());
        };
        let event_type = GcEventType::from_record(record);
        let stw = if event_type.is_stop_the_world() {
            "True"
        } else {
            "False"
        };
        let tags = vec![
            format!("stw:{stw}"),
            format!("event_type:{}", event_type.stats_name()),
        ];
        self.sink.timing(GC_EVENT_DURATION, duration, &tags);
        Ok(())
    }

    fn emit_allocation_rate(&mut self, record: &str) -> Result<(), ParseError> {
        let Some((timestamp, size_info)) = patterns::parse_record_sizes(record)? else {
            return Ok(());
        };
        if let Some((last_time, last_size_info)) = &self.last_size_observation {
            let elapsed = seconds_between(*last_time, timestamp);
            if elapsed > 0.0 {
                // Negative when the heap shrank between collections;
                // reported as-is, not clamped.
                let kb_added =
                    size_info.whole_heap_begin_k as f64 - last_size_info.whole_heap_end_k as f64;
                self.sink
                    .histogram(ALLOCATION_RATE_HISTOGRAM, kb_added / elapsed, &[]);
            } else {
                warn!(
                    metric = ALLOCATION_RATE_HISTOGRAM,
                    %timestamp,
                    "non-positive elapsed time between size observations, skipping emission"
                );
            }
        }
        // The first observation is the baseline; every observation replaces
        // the stored one unconditionally.
        self.last_size_observation = Some((timestamp, size_info));
        Ok(())
    }
}

fn contains_any(record: &str, event_types: &[GcEventType]) -> bool {
    event_types
        .iter()
        .any(|event_type| event_type.marker().is_some_and(|m| record.contains(m)))
}

fn seconds_between(earlier: DateTime<FixedOffset>, later: DateTime<FixedOffset>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 1000.0
}
