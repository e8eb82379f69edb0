// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Reassembly of logical GC records from a stream of raw log lines.

use crate::patterns;

/// Buffers raw lines until a record boundary proves the in-flight record is
/// complete.
///
/// A record ends only when the *next* one begins: either a fresh line opens
/// with a timestamp, or a single physical line carries the pause-duration
/// tail of one record glued to the head of the next (a conflated line).
/// Anything else is a continuation fragment and is appended.
#[derive(Debug, Default)]
pub struct RecordAccumulator {
    pending: String,
}

impl RecordAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one raw line, returning the completed record when the line
    /// closes one. The caller must process a returned record before feeding
    /// the next line; downstream rolling state relies on seeing records in
    /// framing order, exactly once.
    pub fn feed(&mut self, raw_line: &str) -> Option<String> {
        let line = raw_line.trim_end();

        if patterns::is_record_start(line) {
            let completed = self.take_pending();
            self.pending.push_str(line);
            return completed;
        }

        // Relative conflation is the more specific split and must win when a
        // line could satisfy both patterns.
        if let Some((tail, head)) = patterns::split_conflated_relative(line)
            .or_else(|| patterns::split_conflated_absolute(line))
        {
            self.pending.push_str(tail);
            let completed = self.take_pending();
            self.pending.push_str(head);
            return completed;
        }

        // Continuation fragment. A fragment arriving before any record has
        // opened is kept too; the stream may begin mid-record.
        self.pending.push(' ');
        self.pending.push_str(line);
        None
    }

    /// Completes the in-flight record, if any. Only drivers that can
    /// observe end-of-stream call this; a live GC log never ends on its own.
    pub fn finish(&mut self) -> Option<String> {
        self.take_pending()
    }

    fn take_pending(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}
