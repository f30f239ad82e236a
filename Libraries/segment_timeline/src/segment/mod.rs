pub mod builder;

use serde::Serialize;

use crate::mpd::AvailabilityRange;

/// A concrete, addressable media segment produced by the resolver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    /// Identifier of the representation the segment belongs to.
    pub representation_id: String,
    /// Start time on the media timeline, in seconds.
    pub start_time: f64,
    /// Declared duration, in seconds.
    pub duration: f64,
    /// Zero-based position in the fully expanded timeline.
    pub sequence_number: u64,
    /// Resolved media URL, if the manifest supplied one.
    pub media: Option<String>,
    /// Byte range within the media resource.
    pub media_range: Option<String>,
    /// Identity used for `$Time$` addressing: the raw manifest annotation
    /// when present, otherwise the unscaled start time.
    pub replacement_time: String,
    /// Availability window the segment was resolved against, when known.
    pub availability_range: Option<AvailabilityRange>,
}

pub use builder::{SegmentBuilder, TemplateSegmentBuilder};
