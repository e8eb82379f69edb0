// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Per-stream composition of record framing and metric derivation.

use crate::accumulator::RecordAccumulator;
use crate::errors::ParseError;
use crate::processor::{EventProcessor, MetricSink};

/// One log stream's accumulator/processor pair.
///
/// Every record completed by the accumulator is processed before the next
/// line is scanned, so the processor's rolling state observes records in
/// framing order, exactly once. Drivers watching several log sources build
/// one pipeline per source; sharing one would interleave unrelated rolling
/// state and corrupt the gap and allocation-rate metrics.
pub struct GcLogPipeline<S> {
    accumulator: RecordAccumulator,
    processor: EventProcessor<S>,
}

impl<S: MetricSink> GcLogPipeline<S> {
    pub fn new(sink: S) -> Self {
        Self {
            accumulator: RecordAccumulator::new(),
            processor: EventProcessor::new(sink),
        }
    }

    /// Feeds one raw line, processing any record the line completes.
    pub fn handle_line(&mut self, raw_line: &str) -> Result<(), ParseError> {
        if let Some(record) = self.accumulator.feed(raw_line) {
            self.processor.process(&record)?;
        }
        Ok(())
    }

    /// Flushes the in-flight record. For drivers that observe end-of-stream
    /// or are shutting down; records lost here would otherwise never emit.
    pub fn finish(&mut self) -> Result<(), ParseError> {
        if let Some(record) = self.accumulator.finish() {
            self.processor.process(&record)?;
        }
        Ok(())
    }
}
