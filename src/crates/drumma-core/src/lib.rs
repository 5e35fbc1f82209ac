//! Core engine for turning MIDI drum events into MMA grooves
//!
//! This crate takes the typed track events of a decoded MIDI file, keeps the
//! percussion notes, quantizes them against the file's time signature and tick
//! resolution, cuts them into measures and factors identical measures of a
//! drum voice into reusable named definitions.
//!
//! # Examples
//!
//! ```
//! use drumma_core::{convert, MidiScore, NoteEvent, Options, TrackEvent};
//!
//! let midi = MidiScore {
//!     ticks_per_quarter: 96,
//!     tracks: vec![vec![
//!         TrackEvent::Note(NoteEvent { start: 0, duration: 48, channel: 9, note: 36, velocity: 100 }),
//!         TrackEvent::Note(NoteEvent { start: 384, duration: 48, channel: 9, note: 36, velocity: 100 }),
//!     ]],
//! };
//!
//! let score = convert(&midi, &Options { mute: true, ..Options::default() });
//! assert!(score.to_string().contains("SEQUENCE KickDrum1M1 KickDrum1M1"));
//! ```
//!
//! # Main Components
//!
//! - **quantize**: grid rounding for positions and velocities
//! - **Metadata**: tick resolution, tempo and time signature of the file
//! - **EventFilter**: channel selection and per-event quantization
//! - **measure**: measure partitioning and triplet rendering
//! - **factor**: per-voice measure deduplication
//! - **Score**: the assembled MMA text

pub mod drums;
pub mod error;
pub mod event;
pub mod factor;
pub mod filter;
pub mod measure;
pub mod metadata;
pub mod options;
pub mod quantize;
pub mod score;

pub use drums::Voice;
pub use error::ConfigError;
pub use event::{DrumHit, MidiScore, NoteEvent, TrackEvent};
pub use factor::{factor_voice, Definition, SequenceToken, VoicePart};
pub use filter::{scan_tracks, EventFilter, MetaKind, Scan};
pub use measure::{events_in_measure, render_measure, Duration, RenderedMeasure, Triplet};
pub use metadata::{Metadata, Observed, TimeSig, OUTPUT_TICKS_PER_QUARTER};
pub use options::{ChannelFilter, Options};
pub use quantize::{quantize_time, quantize_velocity};
pub use score::{convert, Body, Converter, Header, Score};
