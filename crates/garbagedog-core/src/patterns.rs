// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The pattern vocabulary over GC log text: line-boundary predicates used
//! for record framing, and anchored extractors for the numeric fields a
//! record can carry.
//!
//! All predicates are pure functions over a single line or record; the
//! regexes are compiled once.

use chrono::{DateTime, FixedOffset};
use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::ParseError;
use crate::event::GcSizeInfo;

/// Wall-clock format of absolute GC timestamps, e.g.
/// `2012-04-04T19:08:23.054+0000`.
const ABSOLUTE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

// These patterns are adapted from https://github.com/Netflix-Skunkworks/gcviz,
// Copyright 2013 Netflix, under APACHE 2.0
lazy_static! {
    static ref ABSOLUTE_TIME_REGEX: Regex =
        Regex::new(r"^([0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}\.[0-9]{3}\+0000):")
            .expect("failed creating regex");
    static ref RELATIVE_TIME_REGEX: Regex =
        Regex::new(r"^[0-9]+\.[0-9]+: ").expect("failed creating regex");
    static ref CONFLATED_RELATIVE_REGEX: Regex =
        Regex::new(r"^(.*[0-9]+\.[0-9]+ secs\])([0-9]+\.[0-9]+: .*)$")
            .expect("failed creating regex");
    static ref CONFLATED_ABSOLUTE_REGEX: Regex =
        Regex::new(r"^(.*)([0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}.*)$")
            .expect("failed creating regex");
    static ref PAUSE_DURATION_REGEX: Regex =
        Regex::new(r"^.*real=([0-9]+\.[0-9]+) secs\]").expect("failed creating regex");
    static ref SIZE_TRANSITION_REGEX: Regex = Regex::new(
        r"^([0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}\.[0-9]{3}\+0000): ([0-9]+\.[0-9]{3}): .* ([0-9]+)K->([0-9]+)K\(([0-9]+)K\).* ([0-9]+)K->([0-9]+)K\(([0-9]+)K\)"
    )
    .expect("failed creating regex");
    static ref THREE_ARROWS_REGEX: Regex =
        Regex::new(r"->.*->.*->").expect("failed creating regex");
}

/// Whether this line opens a new record (absolute or relative timestamp at
/// the start of the line).
pub fn is_record_start(line: &str) -> bool {
    ABSOLUTE_TIME_REGEX.is_match(line) || RELATIVE_TIME_REGEX.is_match(line)
}

/// Splits a line carrying the pause-duration tail of one record glued to a
/// relative-timestamped head of the next. Returns `(tail, head)`;
/// concatenating the two halves reproduces the line exactly.
pub fn split_conflated_relative(line: &str) -> Option<(&str, &str)> {
    CONFLATED_RELATIVE_REGEX.captures(line).map(|caps| {
        let (_, [tail, head]) = caps.extract();
        (tail, head)
    })
}

/// Same conflation split, but the following record starts with an absolute
/// timestamp. Less specific than [`split_conflated_relative`] and must be
/// tried after it.
pub fn split_conflated_absolute(line: &str) -> Option<(&str, &str)> {
    CONFLATED_ABSOLUTE_REGEX.captures(line).map(|caps| {
        let (_, [tail, head]) = caps.extract();
        (tail, head)
    })
}

/// Parses the absolute timestamp opening a record, if present.
pub fn leading_absolute_timestamp(
    record: &str,
) -> Result<Option<DateTime<FixedOffset>>, ParseError> {
    let Some(caps) = ABSOLUTE_TIME_REGEX.captures(record) else {
        return Ok(None);
    };
    let (_, [raw]) = caps.extract();
    parse_absolute_timestamp(raw).map(Some)
}

/// Extracts the stop-the-world pause duration (`real=N.NNN secs]`) in
/// seconds, regardless of which event type framed it. Nested records can
/// carry an inner `[Times: ...]` clause as well; the greedy prefix selects
/// the outermost (last) one, which times the whole record.
pub fn parse_record_duration(record: &str) -> Result<Option<f64>, ParseError> {
    let Some(caps) = PAUSE_DURATION_REGEX.captures(record) else {
        return Ok(None);
    };
    let (_, [raw]) = caps.extract();
    let seconds = raw
        .parse::<f64>()
        .map_err(|source| ParseError::InvalidDuration {
            value: raw.to_string(),
            source,
        })?;
    Ok(Some(seconds))
}

/// Extracts the two-level heap-size transition from a record, with its
/// absolute timestamp.
///
/// Records containing a three-arrow chain (`->...->...->`) carry three or
/// more transitions folded into one record; this format cannot be reliably
/// decomposed, so such records yield no size data rather than a guess.
pub fn parse_record_sizes(
    record: &str,
) -> Result<Option<(DateTime<FixedOffset>, GcSizeInfo)>, ParseError> {
    if THREE_ARROWS_REGEX.is_match(record) {
        return Ok(None);
    }
    let Some(caps) = SIZE_TRANSITION_REGEX.captures(record) else {
        return Ok(None);
    };
    let (_, [raw_timestamp, _relative, young_begin, young_end, young_total, heap_begin, heap_end, heap_total]) =
        caps.extract();
    let timestamp = parse_absolute_timestamp(raw_timestamp)?;
    let size_info = GcSizeInfo {
        young_begin_k: parse_kilobytes(young_begin)?,
        young_end_k: parse_kilobytes(young_end)?,
        young_total_k: parse_kilobytes(young_total)?,
        whole_heap_begin_k: parse_kilobytes(heap_begin)?,
        whole_heap_end_k: parse_kilobytes(heap_end)?,
        whole_heap_total_k: parse_kilobytes(heap_total)?,
    };
    Ok(Some((timestamp, size_info)))
}

fn parse_absolute_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, ParseError> {
    DateTime::parse_from_str(raw, ABSOLUTE_TIME_FORMAT).map_err(|source| {
        ParseError::InvalidTimestamp {
            value: raw.to_string(),
            source,
        }
    })
}

fn parse_kilobytes(raw: &str) -> Result<u64, ParseError> {
    raw.parse::<u64>()
        .map_err(|source| ParseError::InvalidHeapSize {
            value: raw.to_string(),
            source,
        })
}
