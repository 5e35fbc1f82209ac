//! Channel selection and quantization of incoming note events.

use std::fmt;

use crate::event::{DrumHit, MidiScore, NoteEvent, TrackEvent};
use crate::metadata::{Metadata, Observed};
use crate::options::Options;
use crate::quantize::{quantize_time, quantize_velocity};

/// Kinds of meta event that may only appear once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaKind {
    TimeSignature,
    Tempo,
}

impl fmt::Display for MetaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaKind::TimeSignature => write!(f, "Time Signature"),
            MetaKind::Tempo => write!(f, "Tempo"),
        }
    }
}

/// Result of scanning every track of a file
#[derive(Debug, Clone, Default)]
pub struct Scan {
    /// Accepted notes in track order
    pub hits: Vec<DrumHit>,
    /// Meta kinds seen more than once, each reported once, in detection order
    pub redundant: Vec<MetaKind>,
}

pub struct EventFilter<'a> {
    options: &'a Options,
}

impl<'a> EventFilter<'a> {
    pub fn new(options: &'a Options) -> Self {
        Self { options }
    }

    /// Quantize a note against the registry's current measure geometry
    pub fn quantize(&self, event: &NoteEvent, meta: &Metadata) -> DrumHit {
        let mut start = event.start as f64;
        let mut duration = event.duration as f64;

        let qtime = self.options.quant_time;
        if qtime != 0 {
            let ticks = meta.ticks_per_quarter as f64;
            let qpm = meta.quarters_per_measure();

            // Split into whole measures and an offset into the measure, in quarters
            let quarters = start / ticks;
            let measure = (quarters / qpm).trunc();
            let offset = quantize_time(quarters % qpm, qtime);
            start = (measure * qpm + offset) * ticks;

            duration = quantize_time(duration / ticks, qtime) * ticks;
        }

        DrumHit {
            start,
            duration,
            channel: event.channel,
            note: event.note,
            velocity: quantize_velocity(event.velocity as i32, self.options.quant_vel),
        }
    }

    /// Quantize and keep a note if it is on the selected channel
    pub fn filter_note(&self, event: &NoteEvent, meta: &mut Metadata, hits: &mut Vec<DrumHit>) {
        if !self.options.channel.matches(event.channel) {
            return;
        }
        let hit = self.quantize(event, meta);
        meta.observe_last_event_time(hit.start);
        hits.push(hit);
    }
}

/// Single pass over all tracks: collect drum notes and learn the metadata.
///
/// Notes are quantized against the time signature in effect when they are
/// reached, so notes before the first time signature use 4/4.
pub fn scan_tracks(score: &MidiScore, meta: &mut Metadata, options: &Options) -> Scan {
    let filter = EventFilter::new(options);
    let mut scan = Scan::default();

    for event in score.tracks.iter().flatten() {
        match event {
            TrackEvent::TrackName(name) => meta.name = name.clone(),
            TrackEvent::TimeSignature(time_sig) => {
                if meta.observe_time_sig(*time_sig) == Observed::Redundant {
                    report(&mut scan.redundant, MetaKind::TimeSignature);
                }
            }
            TrackEvent::Tempo(tempo) => {
                if meta.observe_tempo(*tempo) == Observed::Redundant {
                    report(&mut scan.redundant, MetaKind::Tempo);
                }
            }
            TrackEvent::Note(note) => filter.filter_note(note, meta, &mut scan.hits),
        }
    }

    log::debug!("kept {} drum events\n{}", scan.hits.len(), meta);
    scan
}

fn report(redundant: &mut Vec<MetaKind>, kind: MetaKind) {
    if !redundant.contains(&kind) {
        log::warn!("multiple {} events, only using the first", kind);
        redundant.push(kind);
    }
}
