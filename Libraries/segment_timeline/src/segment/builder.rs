//! Final segment assembly: time scaling, identity stamping and media
//! template substitution.

use once_cell::sync::Lazy;
use regex::Regex;

use super::Segment;
use crate::converter::TimelineConverter;
use crate::mpd::Representation;

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$Number(?::%0(\d+)d|%0(\d+)d)?\$").unwrap());

/// Builds the final [`Segment`] value from the primitives the resolver
/// decoded out of one timeline position.
pub trait SegmentBuilder: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    fn build(
        &self,
        converter: &dyn TimelineConverter,
        is_dynamic: bool,
        representation: &Representation,
        time: u64,
        duration: u64,
        timescale: u64,
        media: Option<&str>,
        media_range: Option<&str>,
        sequence_number: u64,
        raw_start: Option<&str>,
    ) -> Segment;
}

/// Default builder: scales run timing to seconds and expands
/// `$RepresentationID$`, `$Time$` and `$Number$` (with optional
/// `%0Nd` width) in the media reference.
pub struct TemplateSegmentBuilder;

impl SegmentBuilder for TemplateSegmentBuilder {
    fn build(
        &self,
        converter: &dyn TimelineConverter,
        is_dynamic: bool,
        representation: &Representation,
        time: u64,
        duration: u64,
        timescale: u64,
        media: Option<&str>,
        media_range: Option<&str>,
        sequence_number: u64,
        raw_start: Option<&str>,
    ) -> Segment {
        let scale = timescale.max(1) as f64;

        // The raw manifest annotation wins for identity: it may carry more
        // precision than the accumulated integer clock.
        let replacement_time = raw_start
            .map(str::to_string)
            .unwrap_or_else(|| time.to_string());

        let media = media.map(|template| {
            expand_media_template(template, &representation.id, &replacement_time, sequence_number)
        });

        let availability_range = representation.segment_availability_range.or_else(|| {
            is_dynamic.then(|| converter.segment_availability_range(representation, is_dynamic))
        });

        Segment {
            representation_id: representation.id.clone(),
            start_time: time as f64 / scale,
            duration: duration as f64 / scale,
            sequence_number,
            media,
            media_range: media_range.map(str::to_string),
            replacement_time,
            availability_range,
        }
    }
}

fn expand_media_template(
    template: &str,
    representation_id: &str,
    replacement_time: &str,
    sequence_number: u64,
) -> String {
    let expanded = template
        .replace("$RepresentationID$", representation_id)
        .replace("$Time$", replacement_time);
    NUMBER_RE
        .replace_all(&expanded, |caps: &regex::Captures| {
            if let Some(width) = caps.get(1).or_else(|| caps.get(2)) {
                format!(
                    "{:0width$}",
                    sequence_number,
                    width = width.as_str().parse::<usize>().unwrap_or(1)
                )
            } else {
                sequence_number.to_string()
            }
        })
        .to_string()
}
