// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! GC event vocabulary: the closed set of event types this tool
//! distinguishes, and the heap-size snapshot carried by size-transition
//! records.

/// Classification of a GC log record.
///
/// Each variant carries a stable metric-tag name, an optional literal
/// marker substring, and a stop-the-world flag. Classification scans
/// [`GcEventType::CLASSIFICATION_ORDER`] and returns the first variant
/// whose marker appears in the record. Some records carry several markers —
/// a `CMS-initial-mark` record can contain a `Full GC` sub-clause — so the
/// fixed scan order is what makes classification deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GcEventType {
    Unknown,
    FullGc,
    ConcurrentModeFailure,
    PromotionFailed,
    ParNew,
    CmsInitialMark,
    CmsConcurrentMark,
    CmsConcurrentAbortablePreclean,
    CmsConcurrentPreclean,
    CmsRemark,
    CmsConcurrentSweep,
    CmsConcurrentReset,
    PsYoungGen,
    DefNew,
}

impl GcEventType {
    /// Marker scan order; first match wins. `Unknown` has no marker and is
    /// the fallback, so it does not appear here.
    ///
    /// Ordering constraints worth keeping in mind when editing:
    /// `FullGc` must precede `CmsInitialMark`, and
    /// `CmsConcurrentAbortablePreclean` must precede `CmsConcurrentPreclean`
    /// (its marker is a substring of the abortable one).
    pub const CLASSIFICATION_ORDER: [GcEventType; 13] = [
        GcEventType::FullGc,
        GcEventType::ConcurrentModeFailure,
        GcEventType::PromotionFailed,
        GcEventType::ParNew,
        GcEventType::CmsInitialMark,
        GcEventType::CmsConcurrentMark,
        GcEventType::CmsConcurrentAbortablePreclean,
        GcEventType::CmsConcurrentPreclean,
        GcEventType::CmsRemark,
        GcEventType::CmsConcurrentSweep,
        GcEventType::CmsConcurrentReset,
        GcEventType::PsYoungGen,
        GcEventType::DefNew,
    ];

    /// Stable name used as the `event_type` tag value.
    pub fn stats_name(self) -> &'static str {
        match self {
            GcEventType::Unknown => "Unknown",
            GcEventType::FullGc => "FullGC",
            GcEventType::ConcurrentModeFailure => "concurrent_mode_failure",
            GcEventType::PromotionFailed => "promotion_failed",
            GcEventType::ParNew => "ParNew",
            GcEventType::CmsInitialMark => "CMS_initial_mark",
            GcEventType::CmsConcurrentMark => "CMS_concurrent_mark",
            GcEventType::CmsConcurrentAbortablePreclean => "CMS_concurrent_abortable_preclean",
            GcEventType::CmsConcurrentPreclean => "CMS_concurrent_preclean",
            GcEventType::CmsRemark => "CMS_remark",
            GcEventType::CmsConcurrentSweep => "CMS_concurrent_sweep",
            GcEventType::CmsConcurrentReset => "CMS_concurrent_reset",
            GcEventType::PsYoungGen => "PSYoungGen",
            GcEventType::DefNew => "DefNew",
        }
    }

    /// Literal substring identifying this event type in a record, if any.
    pub fn marker(self) -> Option<&'static str> {
        match self {
            GcEventType::Unknown => None,
            GcEventType::FullGc => Some("Full GC"),
            // The concurrent-mode-failure clause is not always closed on the
            // same line, so the closing parenthesis is not part of the marker.
            GcEventType::ConcurrentModeFailure => Some("(concurrent mode failure"),
            GcEventType::PromotionFailed => Some("(promotion failed)"),
            GcEventType::ParNew => Some("ParNew"),
            GcEventType::CmsInitialMark => Some("CMS-initial-mark"),
            GcEventType::CmsConcurrentMark => Some("CMS-concurrent-mark"),
            GcEventType::CmsConcurrentAbortablePreclean => {
                Some("CMS-concurrent-abortable-preclean")
            }
            GcEventType::CmsConcurrentPreclean => Some("CMS-concurrent-preclean"),
            GcEventType::CmsRemark => Some("CMS-remark"),
            GcEventType::CmsConcurrentSweep => Some("CMS-concurrent-sweep"),
            GcEventType::CmsConcurrentReset => Some("CMS-concurrent-reset"),
            GcEventType::PsYoungGen => Some("PSYoungGen"),
            GcEventType::DefNew => Some("DefNew"),
        }
    }

    /// Whether this phase fully suspends application threads.
    pub fn is_stop_the_world(self) -> bool {
        matches!(
            self,
            GcEventType::FullGc
                | GcEventType::ConcurrentModeFailure
                | GcEventType::PromotionFailed
                | GcEventType::ParNew
                | GcEventType::CmsInitialMark
                | GcEventType::CmsRemark
                | GcEventType::PsYoungGen
                | GcEventType::DefNew
        )
    }

    /// Classifies a complete record by first marker match, falling back to
    /// [`GcEventType::Unknown`]. Pure function of the record text.
    pub fn from_record(record: &str) -> GcEventType {
        for event_type in GcEventType::CLASSIFICATION_ORDER {
            if let Some(marker) = event_type.marker() {
                if record.contains(marker) {
                    return event_type;
                }
            }
        }
        GcEventType::Unknown
    }
}

/// Heap occupancy snapshot parsed from a size-transition record, in
/// kilobytes. Young generation and whole heap, each as
/// before/after/capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcSizeInfo {
    pub young_begin_k: u64,
    pub young_end_k: u64,
    pub young_total_k: u64,
    pub whole_heap_begin_k: u64,
    pub whole_heap_end_k: u64,
    pub whole_heap_total_k: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_record_def_new() {
        let record = "2015-05-26T14:45:37.987-0200: 151.126: [GC (Allocation Failure) 151.126: \
                      [DefNew: 629119K->69888K(629120K), 0.0584157 secs] \
                      1619346K->1273247K(2027264K), 0.0585007 secs] \
                      [Times: user=0.06 sys=0.00, real=0.06 secs]";
        assert_eq!(GcEventType::from_record(record), GcEventType::DefNew);
    }

    #[test]
    fn test_from_record_unknown() {
        let record = "2015-05-26T14:45:37.987-0200 Nothing Here";
        assert_eq!(GcEventType::from_record(record), GcEventType::Unknown);
    }

    #[test]
    fn test_every_marker_classifies_to_its_own_variant() {
        for event_type in GcEventType::CLASSIFICATION_ORDER {
            let marker = event_type.marker().unwrap();
            let earlier = &GcEventType::CLASSIFICATION_ORDER
                [..GcEventType::CLASSIFICATION_ORDER
                    .iter()
                    .position(|t| *t == event_type)
                    .unwrap()];
            // A marker that embeds an earlier marker as a substring cannot be
            // classified on its own; the table currently has no such entry.
            assert!(
                !earlier
                    .iter()
                    .any(|t| t.marker().is_some_and(|m| marker.contains(m))),
                "marker for {:?} is shadowed by an earlier entry",
                event_type
            );
            assert_eq!(GcEventType::from_record(marker), event_type);
        }
    }

    #[test]
    fn test_full_gc_wins_over_initial_mark() {
        // Nested records can carry both markers; scan order decides.
        let record = "2012-04-04T19:08:23.054+0000: 511001.548: \
                      [Full GC 511001.549: [CMS-initial-mark: 16174249K(18432000K)]]";
        assert_eq!(GcEventType::from_record(record), GcEventType::FullGc);
    }

    #[test]
    fn test_abortable_preclean_not_shadowed() {
        let record = "511025.649: [CMS-concurrent-abortable-preclean: 0.022/1.751 secs]";
        assert_eq!(
            GcEventType::from_record(record),
            GcEventType::CmsConcurrentAbortablePreclean
        );
    }

    #[test]
    fn test_stop_the_world_flags() {
        assert!(GcEventType::FullGc.is_stop_the_world());
        assert!(GcEventType::DefNew.is_stop_the_world());
        assert!(GcEventType::CmsRemark.is_stop_the_world());
        assert!(!GcEventType::CmsConcurrentSweep.is_stop_the_world());
        assert!(!GcEventType::Unknown.is_stop_the_world());
    }

    #[test]
    fn test_classification_is_pure() {
        let record = "511030.287: [CMS-concurrent-sweep: 2.338/2.358 secs]";
        assert_eq!(
            GcEventType::from_record(record),
            GcEventType::from_record(record)
        );
    }
}
