//! Per-voice factoring of rendered measures into shared DEFINE entries and a SEQUENCE.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::drums::Voice;
use crate::event::DrumHit;
use crate::measure::{events_in_measure, render_measure, RenderedMeasure};
use crate::metadata::Metadata;
use crate::options::Options;

/// One slot of a voice's SEQUENCE line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SequenceToken {
    /// Empty measure, `z`
    Rest,
    /// Tag of a defined measure
    Measure(String),
}

impl fmt::Display for SequenceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceToken::Rest => write!(f, "z"),
            SequenceToken::Measure(tag) => write!(f, "{}", tag),
        }
    }
}

/// A named measure inside `BEGIN DEFINE ... END`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Definition {
    pub tag: String,
    pub measure: RenderedMeasure,
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.tag, self.measure)
    }
}

/// The factored measures of one drum voice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoicePart {
    pub note: u8,
    pub tag: String,
    pub tone: String,
    pub definitions: Vec<Definition>,
    pub sequence: Vec<SequenceToken>,
}

impl VoicePart {
    /// The space-separated SEQUENCE tokens
    pub fn sequence_line(&self) -> String {
        self.sequence.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(" ")
    }
}

impl fmt::Display for VoicePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BEGIN Drum-{}", self.tag)?;
        writeln!(f, "  TONE {}", self.tone)?;
        writeln!(f, "  BEGIN DEFINE")?;
        for definition in &self.definitions {
            writeln!(f, "    {}", definition)?;
        }
        writeln!(f, "  END")?;
        writeln!(f, "  SEQUENCE {}", self.sequence_line())?;
        write!(f, "END")
    }
}

/// Walk measures 1..=last of one voice, defining each distinct rendering
/// once and referencing it from the sequence.
///
/// Tags are `<Voice>M<measure>` after the measure where a rendering first
/// appears, so the walk must stay in measure order. With `options.repeat`
/// every non-empty measure gets its own definition.
pub fn factor_voice(
    voice: &Voice,
    hits: &[DrumHit],
    meta: &Metadata,
    options: &Options,
) -> VoicePart {
    let mut seen: HashMap<RenderedMeasure, String> = HashMap::new();
    let mut definitions = Vec::new();
    let mut sequence = Vec::new();

    for measure in 1..=meta.last_measure_number() {
        let in_measure = events_in_measure(hits, measure, meta);
        if in_measure.is_empty() {
            sequence.push(SequenceToken::Rest);
            continue;
        }

        let rendered = render_measure(&in_measure, meta, options);
        if !options.repeat {
            if let Some(tag) = seen.get(&rendered) {
                sequence.push(SequenceToken::Measure(tag.clone()));
                continue;
            }
        }

        let tag = format!("{}M{}", voice.tag, measure);
        seen.insert(rendered.clone(), tag.clone());
        definitions.push(Definition {
            tag: tag.clone(),
            measure: rendered,
        });
        sequence.push(SequenceToken::Measure(tag));
    }

    log::debug!(
        "{}: {} measures, {} definitions",
        voice.tag,
        sequence.len(),
        definitions.len()
    );

    VoicePart {
        note: voice.note,
        tag: voice.tag.clone(),
        tone: voice.tone.to_string(),
        definitions,
        sequence,
    }
}
