//! Measure partitioning and rendering of MMA note triplets.
//!
//! A rendered measure is a list of `beat duration velocity;` triplets. Two
//! measures are duplicates exactly when their triplet lists are equal, so the
//! list doubles as the deduplication key.

use serde::Serialize;
use std::fmt;

use crate::event::DrumHit;
use crate::metadata::Metadata;
use crate::options::Options;

/// Hits starting inside the 1-based `measure`.
///
/// The range is half-open: a hit exactly on the next bar line belongs to
/// the next measure.
pub fn events_in_measure<'a>(
    hits: &'a [DrumHit],
    measure: u32,
    meta: &Metadata,
) -> Vec<&'a DrumHit> {
    let length = meta.measure_length_ticks();
    let begin = measure.saturating_sub(1) as f64 * length;
    let end = begin + length;
    hits.iter().filter(|hit| begin <= hit.start && hit.start < end).collect()
}

/// Duration column of a triplet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Duration {
    /// Rendered as a bare `0`
    Zero,
    /// 192-per-quarter ticks, rendered with a `t` suffix
    Ticks(i64),
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Duration::Zero => write!(f, "0"),
            Duration::Ticks(ticks) => write!(f, "{}t", ticks),
        }
    }
}

/// One MMA drum note: `1.500 96t 100;`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Triplet {
    /// 1-based beat position, already formatted to the configured precision
    pub beat: String,
    pub duration: Duration,
    pub velocity: i32,
}

impl fmt::Display for Triplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {};", self.beat, self.duration, self.velocity)
    }
}

/// The triplets of one measure, in the order the hits were decoded
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RenderedMeasure(pub Vec<Triplet>);

impl RenderedMeasure {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn triplets(&self) -> &[Triplet] {
        &self.0
    }
}

impl fmt::Display for RenderedMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for triplet in &self.0 {
            write!(f, "  {}", triplet)?;
        }
        Ok(())
    }
}

/// Render one measure's hits without re-sorting them
pub fn render_measure(hits: &[&DrumHit], meta: &Metadata, options: &Options) -> RenderedMeasure {
    let ticks = meta.ticks_per_quarter as f64;
    let qpm = meta.quarters_per_measure();

    let triplets = hits
        .iter()
        .map(|hit| {
            // First beat is 1 for musicians
            let beat = (hit.start / ticks) % qpm + 1.0;
            Triplet {
                beat: format!("{:.*}", options.places, beat),
                duration: render_duration(hit.duration, meta, options),
                velocity: hit.velocity,
            }
        })
        .collect();

    RenderedMeasure(triplets)
}

fn render_duration(duration: f64, meta: &Metadata, options: &Options) -> Duration {
    if options.zero {
        return Duration::Zero;
    }
    // MMA reads both 0 and 1 ticks as a plain `0`
    match meta.ticks_to_output_resolution(duration) {
        ticks if ticks <= 1 => Duration::Zero,
        ticks => Duration::Ticks(ticks),
    }
}
