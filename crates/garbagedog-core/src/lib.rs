// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! JVM garbage-collector log parsing and metric derivation.
//!
//! The HotSpot GC log format freely interleaves concurrent and
//! stop-the-world sub-events: one logical record can span several physical
//! lines, and one physical line can carry the tail of one record glued to
//! the head of the next. This crate reconstructs logical records from that
//! stream, classifies each record into a GC event type, and derives numeric
//! observations (pause duration, inter-pause gaps, allocation rate) for a
//! metrics sink.
//!
//! Processing is strictly sequential per log stream:
//!
//! ```text
//! raw lines -> RecordAccumulator -> EventProcessor -> MetricSink
//! ```
//!
//! [`GcLogPipeline`] bundles one accumulator with one processor. Drivers
//! watching several log sources must build one pipeline per source; the
//! rolling state inside [`EventProcessor`] is meaningless across unrelated
//! streams.

pub mod accumulator;
pub mod errors;
pub mod event;
pub mod patterns;
pub mod pipeline;
pub mod processor;

pub use accumulator::RecordAccumulator;
pub use errors::ParseError;
pub use event::{GcEventType, GcSizeInfo};
pub use pipeline::GcLogPipeline;
pub use processor::{EventProcessor, MetricSink};
