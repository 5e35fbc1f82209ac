//! MIDI drum track to MMA converter
//!
//! Decodes a Standard MIDI File and hands its events to [`drumma_core`],
//! which does the quantizing and factoring.

pub mod midi;
pub mod output;

use anyhow::{Context, Result};
use std::path::Path;

pub use drumma_core::{Converter, Options, Score};
pub use midi::{decode, load, DecodeError};

/// Load a MIDI file and convert its drum track
pub fn convert_file(path: &Path, options: &Options) -> Result<Score> {
    options.validate()?;
    let midi = load(path).with_context(|| format!("Cannot convert {}", path.display()))?;
    Ok(Converter::new(options).convert(&midi))
}
