//! Musical context of a MIDI file: resolution, tempo, time signature.
//!
//! A `Metadata` is created with defaults before the track events are scanned,
//! mutated while they are scanned, and only read afterwards. Every derived
//! value is recomputed on demand because the time signature may still change
//! while notes are being scanned.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tick resolution of MMA output (ticks per quarter note)
pub const OUTPUT_TICKS_PER_QUARTER: u32 = 192;

/// 500000 µs per quarter note = 120 BPM
pub const DEFAULT_TEMPO: u32 = 500_000;

/// A MIDI time signature meta event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSig {
    pub numerator: u8,
    /// The musical denominator is `2^denominator_exp`
    pub denominator_exp: u8,
    /// MIDI clocks per metronome click (unused)
    pub clocks_per_click: u8,
    /// Notated 32nd notes per MIDI quarter note (unused)
    pub thirty_seconds_per_quarter: u8,
}

impl TimeSig {
    pub fn new(
        numerator: u8,
        denominator_exp: u8,
        clocks_per_click: u8,
        thirty_seconds_per_quarter: u8,
    ) -> Self {
        Self {
            numerator,
            denominator_exp,
            clocks_per_click,
            thirty_seconds_per_quarter,
        }
    }

    /// Musical denominator (4 for 3/4, 8 for 6/8)
    pub fn denominator(&self) -> u64 {
        2u64.saturating_pow(self.denominator_exp as u32)
    }
}

impl Default for TimeSig {
    fn default() -> Self {
        Self::new(4, 2, 24, 8)
    }
}

impl fmt::Display for TimeSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TimeSig: n {} / d {}, c {}, b {}",
            self.numerator,
            self.denominator_exp,
            self.clocks_per_click,
            self.thirty_seconds_per_quarter
        )
    }
}

/// Outcome of offering a meta event to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observed {
    /// First of its kind, now in effect
    Accepted,
    /// A value of this kind was already set, the new one is discarded
    Redundant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    /// Ticks per quarter note, from the file header
    pub ticks_per_quarter: u32,
    /// Microseconds per quarter note
    pub tempo: u32,
    pub time_sig: TimeSig,
    pub name: String,
    last_event: f64,
    tempo_set: bool,
    time_sig_set: bool,
}

impl Metadata {
    pub fn new(ticks_per_quarter: u32) -> Self {
        Self {
            ticks_per_quarter,
            tempo: DEFAULT_TEMPO,
            time_sig: TimeSig::default(),
            name: String::new(),
            last_event: 0.0,
            tempo_set: false,
            time_sig_set: false,
        }
    }

    /// Keep the first time signature, discard the rest
    pub fn observe_time_sig(&mut self, time_sig: TimeSig) -> Observed {
        if self.time_sig_set {
            return Observed::Redundant;
        }
        self.time_sig = time_sig;
        self.time_sig_set = true;
        Observed::Accepted
    }

    /// Keep the first tempo, discard the rest
    pub fn observe_tempo(&mut self, tempo: u32) -> Observed {
        if self.tempo_set {
            return Observed::Redundant;
        }
        self.tempo = tempo;
        self.tempo_set = true;
        Observed::Accepted
    }

    /// Raise the latest note start time; lower values are ignored
    pub fn observe_last_event_time(&mut self, ticks: f64) {
        if ticks > self.last_event {
            self.last_event = ticks;
        }
    }

    pub fn last_event_time(&self) -> f64 {
        self.last_event
    }

    /// Beats per quarter note (4/4 = 1, 6/8 = 2, 15/16 = 4)
    pub fn beats_per_quarter(&self) -> f64 {
        self.time_sig.denominator() as f64 / 4.0
    }

    pub fn quarters_per_measure(&self) -> f64 {
        self.time_sig.numerator as f64 / self.beats_per_quarter()
    }

    /// Length of one measure in the file's ticks
    pub fn measure_length_ticks(&self) -> f64 {
        self.quarters_per_measure() * self.ticks_per_quarter as f64
    }

    /// 1-based number of the measure holding the latest note
    pub fn last_measure_number(&self) -> u32 {
        ((self.last_event / self.measure_length_ticks()).floor() as u32).saturating_add(1)
    }

    /// Rescale file ticks to MMA's fixed 192 ticks per quarter
    pub fn ticks_to_output_resolution(&self, ticks: f64) -> i64 {
        let scaled = ticks / self.ticks_per_quarter as f64 * OUTPUT_TICKS_PER_QUARTER as f64;
        scaled.round_ties_even() as i64
    }

    /// Tempo in whole beats per minute
    pub fn bpm(&self) -> i64 {
        (60_000_000.0 / self.tempo as f64).round_ties_even() as i64
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new(OUTPUT_TICKS_PER_QUARTER)
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Tempo: {}", 60_000_000.0 / self.tempo as f64)?;
        writeln!(f, "Ticks: {}", self.ticks_per_quarter)?;
        writeln!(f, "Last Time: {}", self.last_event)?;
        write!(f, "{}", self.time_sig)
    }
}
