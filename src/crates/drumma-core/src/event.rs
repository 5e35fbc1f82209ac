//! Typed track events handed over by the MIDI decoder.

use serde::{Deserialize, Serialize};

use crate::metadata::TimeSig;

/// A note with its note-on and note-off already merged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Absolute start in the file's ticks
    pub start: u64,
    /// Length in the file's ticks
    pub duration: u64,
    /// 0-based MIDI channel
    pub channel: u8,
    pub note: u8,
    pub velocity: u8,
}

/// The subset of track events the converter looks at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrackEvent {
    Note(NoteEvent),
    TrackName(String),
    TimeSignature(TimeSig),
    /// Microseconds per quarter note
    Tempo(u32),
}

/// A decoded MIDI file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MidiScore {
    /// Ticks per quarter note from the header
    pub ticks_per_quarter: u32,
    /// Tracks in file order, events in decode order
    pub tracks: Vec<Vec<TrackEvent>>,
}

/// A note that passed the channel filter, with quantized timing and velocity.
///
/// Start and duration stay fractional: quantizing to a grid that does not
/// divide the tick resolution lands between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DrumHit {
    pub start: f64,
    pub duration: f64,
    pub channel: u8,
    pub note: u8,
    pub velocity: i32,
}
