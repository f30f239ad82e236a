use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use segment_timeline::converter::WallClockConverter;
use segment_timeline::mpd::{Representation, SegmentInfo, SegmentTimeline, TimelineRun};
use segment_timeline::{ResolverConfig, SegmentQuery, TimelineResolver};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .compact()
        .without_time()
        .with_file(false)
        .with_line_number(false)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // A live representation that has been on air for one minute: two
    // explicit 2 s runs followed by an open-ended one.
    let mut representation = Representation::new("video-1", 90000);
    representation.segment_info = Some(SegmentInfo::Template {
        media: Some("video/$RepresentationID$/seg-$Number%05d$.m4s".to_string()),
        timeline: SegmentTimeline {
            runs: vec![
                TimelineRun {
                    start_time: Some(0),
                    duration: 180000,
                    repeat: Some(1),
                    ..Default::default()
                },
                TimelineRun {
                    duration: 180000,
                    repeat: Some(-1),
                    ..Default::default()
                },
            ],
        },
    });

    let converter = WallClockConverter::new(Utc::now() - Duration::seconds(60), Some(30.0));
    let resolver = TimelineResolver::new(
        ResolverConfig {
            timeline_converter: Some(Arc::new(converter)),
            ..Default::default()
        },
        true,
    );

    let all = resolver.resolve(Some(&representation), &SegmentQuery::All, None)?;
    info!("timeline currently describes {} segments", all.len());
    info!(
        "representation has ever had {:?} segments",
        representation.available_segments_number.get()
    );

    let near_edge = resolver.resolve(Some(&representation), &SegmentQuery::AtTime(58.0), None)?;
    for segment in &near_edge {
        info!(
            "segment {} at {:.1}s for {:.1}s -> {}",
            segment.sequence_number,
            segment.start_time,
            segment.duration,
            segment.media.as_deref().unwrap_or("<no media>")
        );
    }

    let tail = resolver.resolve(Some(&representation), &SegmentQuery::FromIndex(28), None)?;
    info!("index query from 28 returned {} segments", tail.len());

    Ok(())
}
