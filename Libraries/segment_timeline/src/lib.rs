pub mod converter;
pub mod mpd;
pub mod resolver;
pub mod segment;

use thiserror::Error;

/// Errors the resolver can surface. Anything else (empty timelines, a
/// requested time before the first segment, an open-ended run landing
/// exactly on a boundary) degrades to an empty or partial result instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// The timeline converter collaborator was not supplied.
    #[error("timeline converter missing from resolver config")]
    MissingConverter,
    /// The caller has no representation attached yet.
    #[error("no representation")]
    MissingRepresentation,
}

pub use resolver::{ResolverConfig, SegmentQuery, TimelineResolver};
pub use segment::Segment;
