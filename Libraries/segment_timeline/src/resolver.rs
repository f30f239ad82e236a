//! Resolves which concrete segments a run-length-encoded timeline makes
//! addressable, for one representation and one query, in a single forward
//! pass over the runs.

use std::sync::Arc;

use tracing::debug;

use crate::converter::TimelineConverter;
use crate::mpd::{Representation, SegmentInfo, SegmentListEntry, TimelineRun};
use crate::segment::{Segment, SegmentBuilder, TemplateSegmentBuilder};
use crate::ResolveError;

/// How many segments past the match point a bounded query may materialize.
/// A live-edge probe only ever needs a handful of segments ahead of the
/// playhead; unbounded enumeration stays reserved for static timelines.
pub const DEFAULT_MAX_SEGMENTS_AHEAD: usize = 10;

/// A segment's actual duration may overrun its declared duration by up to
/// 50%, so a requested time landing exactly on a declared boundary must
/// still select the segment that covers it. Empirical; overridable through
/// [`ResolverConfig`].
pub const DEFAULT_DURATION_TOLERANCE: f64 = 1.5;

/// What the caller is asking the timeline for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentQuery {
    /// Segments covering or following the given presentation time, in
    /// seconds.
    AtTime(f64),
    /// Segments with a sequence number at or past the given index.
    FromIndex(u64),
    /// Every segment the timeline currently describes.
    All,
}

/// Collaborators and tuning knobs for [`TimelineResolver`].
#[derive(Clone)]
pub struct ResolverConfig {
    pub timeline_converter: Option<Arc<dyn TimelineConverter>>,
    /// Builder for the final segment values. `None` selects the built-in
    /// [`TemplateSegmentBuilder`].
    pub segment_builder: Option<Arc<dyn SegmentBuilder>>,
    pub max_segments_ahead: usize,
    pub duration_tolerance: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timeline_converter: None,
            segment_builder: None,
            max_segments_ahead: DEFAULT_MAX_SEGMENTS_AHEAD,
            duration_tolerance: DEFAULT_DURATION_TOLERANCE,
        }
    }
}

pub struct TimelineResolver {
    converter: Option<Arc<dyn TimelineConverter>>,
    builder: Arc<dyn SegmentBuilder>,
    is_dynamic: bool,
    max_segments_ahead: usize,
    duration_tolerance: f64,
}

impl TimelineResolver {
    pub fn new(config: ResolverConfig, is_dynamic: bool) -> Self {
        Self {
            converter: config.timeline_converter,
            builder: config
                .segment_builder
                .unwrap_or_else(|| Arc::new(TemplateSegmentBuilder)),
            is_dynamic,
            max_segments_ahead: config.max_segments_ahead,
            duration_tolerance: config.duration_tolerance,
        }
    }

    fn check_config(&self) -> Result<&dyn TimelineConverter, ResolveError> {
        self.converter
            .as_deref()
            .ok_or(ResolveError::MissingConverter)
    }

    /// Decode the representation's timeline and return the segments the
    /// query selects, in timeline order.
    ///
    /// The first pass that walks the whole timeline memoizes the total
    /// segment count onto the representation; later passes stop as soon as
    /// they have collected enough.
    pub fn resolve(
        &self,
        representation: Option<&Representation>,
        query: &SegmentQuery,
        availability_cap: Option<usize>,
    ) -> Result<Vec<Segment>, ResolveError> {
        let converter = self.check_config()?;
        let representation = representation.ok_or(ResolveError::MissingRepresentation)?;

        let Some(info) = representation.segment_info.as_ref() else {
            return Ok(Vec::new());
        };
        let (runs, list): (&[TimelineRun], Option<&[SegmentListEntry]>) = match info {
            SegmentInfo::Template { timeline, .. } => (&timeline.runs, None),
            SegmentInfo::List { entries, timeline } => (&timeline.runs, Some(entries)),
        };
        let shared_media = match info {
            SegmentInfo::Template { media, .. } => media.as_deref(),
            SegmentInfo::List { .. } => None,
        };

        let count_known = representation.available_segments_number.get().is_some();
        let cap = availability_cap.or(match query {
            SegmentQuery::All => None,
            _ => Some(self.max_segments_ahead),
        });

        let timescale = representation.timescale.max(1);
        let scale = timescale as f64;

        // Translate the requested time once, before the loop.
        let required_media_time = match *query {
            SegmentQuery::AtTime(t) => {
                Some(converter.media_time_from_presentation_time(t, representation))
            }
            _ => None,
        };
        let start_index = match *query {
            SegmentQuery::FromIndex(i) => i,
            _ => 0,
        };

        let mut time: u64 = 0;
        let mut scaled_time: f64 = 0.0;
        let mut next_sequence: u64 = 0;
        let mut has_enough = false;
        let mut segments: Vec<Segment> = Vec::new();

        for (i, run) in runs.iter().enumerate() {
            let mut repeat = run.repeat.unwrap_or(0);

            // An explicit start time belongs to the first segment of the
            // run only; it resets the running clock.
            if let Some(t) = run.start_time {
                time = t;
                scaled_time = time as f64 / scale;
            }

            let run_duration = run.duration as f64 / scale;

            // A negative repeat means the duration repeats until the start
            // of the next run, or until the end of the availability window
            // when no next run declares one.
            if repeat < 0 {
                let repeat_end = match runs.get(i + 1).and_then(|next| next.start_time) {
                    Some(next_start) => next_start as f64 / scale,
                    None => {
                        let availability_end = match representation.segment_availability_range {
                            Some(range) => range.end,
                            None => {
                                converter
                                    .segment_availability_range(representation, self.is_dynamic)
                                    .end
                            }
                        };
                        // The run's fixed duration is now known for good.
                        let _ = representation.segment_duration.set(run_duration);
                        converter.media_time_from_presentation_time(availability_end, representation)
                    }
                };
                repeat = if run_duration > 0.0 {
                    ((repeat_end - scaled_time) / run_duration).ceil() as i64 - 1
                } else {
                    0
                };
                debug!(
                    "open-ended run of {} resolved to {} repeats (end {})",
                    representation.id, repeat, repeat_end
                );
            }

            // Enough segments collected already: keep walking only while
            // the total count is still unknown, counting instead of
            // materializing.
            if has_enough {
                if count_known {
                    break;
                }
                next_sequence += repeat.saturating_add(1).max(0) as u64;
                continue;
            }

            for _ in 0..=repeat {
                let sequence_number = next_sequence;
                next_sequence += 1;

                if cap.is_some_and(|cap| segments.len() > cap) {
                    has_enough = true;
                    if count_known {
                        break;
                    }
                    continue;
                }

                let include = match required_media_time {
                    Some(required) => {
                        scaled_time >= required - run_duration * self.duration_tolerance
                    }
                    None => sequence_number >= start_index,
                };

                if include {
                    let (media, media_range) = match list {
                        Some(entries) => {
                            let entry = entries.get(sequence_number as usize);
                            (
                                entry.and_then(|e| e.media.as_deref()),
                                entry.and_then(|e| e.media_range.as_deref()),
                            )
                        }
                        None => (shared_media, run.media_range.as_deref()),
                    };
                    segments.push(self.builder.build(
                        converter,
                        self.is_dynamic,
                        representation,
                        time,
                        run.duration,
                        timescale,
                        media,
                        media_range,
                        sequence_number,
                        run.raw_start.as_deref(),
                    ));
                }

                time += run.duration;
                scaled_time = time as f64 / scale;
            }
        }

        if !count_known {
            let _ = representation.available_segments_number.set(next_sequence);
            debug!(
                "{} has {} segments in total",
                representation.id, next_sequence
            );
        }

        Ok(segments)
    }
}
