//! Conversion between presentation time and per-representation media time.
//! The resolver only consumes an availability window, it never computes one;
//! that work lives behind this trait.

use chrono::{DateTime, Utc};

use crate::mpd::{AvailabilityRange, Representation};

/// Bridges the presentation timeline and a representation's media timeline.
pub trait TimelineConverter: Send + Sync {
    /// Translate a presentation timestamp (seconds) onto the
    /// representation's media timeline.
    fn media_time_from_presentation_time(
        &self,
        presentation_time: f64,
        representation: &Representation,
    ) -> f64;

    /// Compute the presentation-time range currently considered fetchable.
    fn segment_availability_range(
        &self,
        representation: &Representation,
        is_dynamic: bool,
    ) -> AvailabilityRange;
}

/// Converter for presentations anchored to a wall-clock availability start.
///
/// The live edge is how long the presentation has been available; the start
/// of the window trails it by the time-shift buffer depth.
pub struct WallClockConverter {
    /// Wall-clock time the first segment became available.
    pub availability_start_time: DateTime<Utc>,
    /// How far behind the live edge a client may rewind, in seconds.
    /// `None` means the whole presentation stays fetchable.
    pub time_shift_buffer_depth: Option<f64>,
}

impl WallClockConverter {
    pub fn new(
        availability_start_time: DateTime<Utc>,
        time_shift_buffer_depth: Option<f64>,
    ) -> Self {
        Self {
            availability_start_time,
            time_shift_buffer_depth,
        }
    }

    fn uptime(&self) -> f64 {
        Utc::now()
            .signed_duration_since(self.availability_start_time)
            .to_std()
            .unwrap_or_default()
            .as_secs_f64()
    }
}

impl TimelineConverter for WallClockConverter {
    fn media_time_from_presentation_time(
        &self,
        presentation_time: f64,
        representation: &Representation,
    ) -> f64 {
        let timescale = representation.timescale.max(1) as f64;
        let offset = representation.presentation_time_offset.unwrap_or(0) as f64 / timescale;
        presentation_time + offset
    }

    fn segment_availability_range(
        &self,
        _representation: &Representation,
        is_dynamic: bool,
    ) -> AvailabilityRange {
        let live_edge = self.uptime();
        if !is_dynamic {
            // Static presentations have no rewind bound.
            return AvailabilityRange {
                start: 0.0,
                end: live_edge,
            };
        }
        let earliest_allowed = (live_edge - self.time_shift_buffer_depth.unwrap_or(f64::INFINITY))
            .max(0.0);
        AvailabilityRange {
            start: earliest_allowed,
            end: live_edge,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn media_time_applies_presentation_time_offset() {
        let converter = WallClockConverter::new(Utc::now(), None);
        let mut rep = Representation::new("video-1", 90000);
        rep.presentation_time_offset = Some(9000);

        let media_time = converter.media_time_from_presentation_time(5.0, &rep);
        assert!((media_time - 5.1).abs() < 1e-9);
    }

    #[test]
    fn media_time_without_offset_is_identity() {
        let converter = WallClockConverter::new(Utc::now(), None);
        let rep = Representation::new("video-1", 1);
        assert_eq!(converter.media_time_from_presentation_time(7.5, &rep), 7.5);
    }

    #[test]
    fn live_window_trails_the_edge_by_the_buffer_depth() {
        let converter =
            WallClockConverter::new(Utc::now() - Duration::seconds(30), Some(10.0));
        let rep = Representation::new("video-1", 1);

        let range = converter.segment_availability_range(&rep, true);
        assert!((range.end - 30.0).abs() < 0.5, "end was {}", range.end);
        assert!((range.start - 20.0).abs() < 0.5, "start was {}", range.start);
    }

    #[test]
    fn static_window_starts_at_zero() {
        let converter =
            WallClockConverter::new(Utc::now() - Duration::seconds(30), Some(10.0));
        let rep = Representation::new("video-1", 1);

        let range = converter.segment_availability_range(&rep, false);
        assert_eq!(range.start, 0.0);
        assert!(range.end >= 29.5);
    }
}
