//! Manifest data structures for timeline-addressed representations.
//! These represent already-parsed segment timing metadata: run-length-encoded
//! timelines, explicit URL lists and the per-representation fields the
//! resolver reads and memoizes into.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

/// Presentation-time window currently considered fetchable, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityRange {
    pub start: f64,
    pub end: f64,
}

/// One run-length-encoded entry ("S" element) of a segment timeline.
#[derive(Debug, Clone, Default)]
pub struct TimelineRun {
    /// Media time the run starts at, in timescale units. Present only on
    /// runs that reset the running clock; all other runs continue from the
    /// previous run's end.
    pub start_time: Option<u64>,
    /// Duration of every segment this run produces, in timescale units.
    pub duration: u64,
    /// Repeat count: `None` and `Some(0)` mean one segment, `Some(n)` with
    /// n > 0 means n + 1 segments, a negative value means the duration
    /// repeats until the next run's start or the end of the availability
    /// window.
    pub repeat: Option<i64>,
    /// Byte range for segments of this run when the media reference is a
    /// shared template.
    pub media_range: Option<String>,
    /// Raw start-time annotation exactly as the manifest carried it. Used
    /// for segment identity, never for time math.
    pub raw_start: Option<String>,
}

/// Ordered list of runs describing the full segment layout compactly.
#[derive(Debug, Clone, Default)]
pub struct SegmentTimeline {
    pub runs: Vec<TimelineRun>,
}

/// Explicit URL entry, parallel to the expanded timeline and indexed by
/// sequence number.
#[derive(Debug, Clone, Default)]
pub struct SegmentListEntry {
    pub media: Option<String>,
    pub media_range: Option<String>,
}

/// Segment addressing metadata attached to a representation. Resolved once
/// per pass, so the template-vs-list decision is never re-checked per
/// segment.
#[derive(Debug, Clone)]
pub enum SegmentInfo {
    /// A shared URL template addressed through `$Number$` / `$Time$`.
    Template {
        media: Option<String>,
        timeline: SegmentTimeline,
    },
    /// Explicit per-segment URLs.
    List {
        entries: Vec<SegmentListEntry>,
        timeline: SegmentTimeline,
    },
}

impl SegmentInfo {
    pub fn timeline(&self) -> &SegmentTimeline {
        match self {
            SegmentInfo::Template { timeline, .. } => timeline,
            SegmentInfo::List { timeline, .. } => timeline,
        }
    }
}

/// A single media representation (one quality level).
#[derive(Debug, Clone)]
pub struct Representation {
    /// Unique identifier for the representation.
    pub id: String,
    /// Timescale used to convert segment timing to seconds. E.g.,
    /// `timescale=90000` means 1 unit = 1/90000 s.
    pub timescale: u64,
    /// Offset subtracted from presentation time when mapping onto this
    /// representation's media timeline, in timescale units.
    pub presentation_time_offset: Option<u64>,
    /// Precomputed availability window, if the surrounding player already
    /// derived one for this representation.
    pub segment_availability_range: Option<AvailabilityRange>,
    /// Attached addressing metadata. The resolver reads this, it never
    /// rebuilds it.
    pub segment_info: Option<SegmentInfo>,
    /// Total number of segments the representation has ever had. Written
    /// once by the first full resolver pass and stable afterwards.
    pub available_segments_number: OnceCell<u64>,
    /// Fixed segment duration in seconds, learned when an open-ended run is
    /// resolved against the availability window. Written once.
    pub segment_duration: OnceCell<f64>,
}

impl Representation {
    pub fn new(id: &str, timescale: u64) -> Self {
        Self {
            id: id.to_string(),
            timescale,
            presentation_time_offset: None,
            segment_availability_range: None,
            segment_info: None,
            available_segments_number: OnceCell::new(),
            segment_duration: OnceCell::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memo_cells_keep_the_first_write() {
        let rep = Representation::new("video-1", 90000);
        assert!(rep.available_segments_number.get().is_none());

        rep.available_segments_number.set(42).unwrap();
        assert!(rep.available_segments_number.set(7).is_err());
        assert_eq!(rep.available_segments_number.get(), Some(&42));
    }

    #[test]
    fn segment_info_exposes_its_timeline() {
        let timeline = SegmentTimeline {
            runs: vec![TimelineRun {
                duration: 4,
                ..Default::default()
            }],
        };
        let info = SegmentInfo::List {
            entries: vec![],
            timeline,
        };
        assert_eq!(info.timeline().runs.len(), 1);
    }
}
