// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::num::{ParseFloatError, ParseIntError};

/// Failures converting text captured by an anchored pattern.
///
/// A pattern that simply does not match is normal and silent — the line
/// carries no derivable metric. These errors fire only when a pattern *did*
/// match and the captured text still failed numeric or timestamp
/// conversion. Swallowing them would hide a classifier bug behind missing
/// metrics, so they propagate to the driving loop instead.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid heap size '{value}' in size transition: {source}")]
    InvalidHeapSize {
        value: String,
        source: ParseIntError,
    },

    #[error("invalid pause duration '{value}': {source}")]
    InvalidDuration {
        value: String,
        source: ParseFloatError,
    },

    #[error("invalid event timestamp '{value}': {source}")]
    InvalidTimestamp {
        value: String,
        source: chrono::ParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let source = "99999999999999999999999".parse::<u64>().unwrap_err();
        let error = ParseError::InvalidHeapSize {
            value: "99999999999999999999999".to_string(),
            source,
        };
        assert!(error
            .to_string()
            .starts_with("invalid heap size '99999999999999999999999'"));
    }

    #[test]
    fn test_error_debug() {
        let source = "abc".parse::<f64>().unwrap_err();
        let error = ParseError::InvalidDuration {
            value: "abc".to_string(),
            source,
        };
        let debug_str = format!("{:?}", error);
        assert!(debug_str.contains("InvalidDuration"));
    }
}
