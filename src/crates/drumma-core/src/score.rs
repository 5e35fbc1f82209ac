//! Assembly of the complete MMA text.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::drums::Voice;
use crate::event::{DrumHit, MidiScore};
use crate::factor::{factor_voice, VoicePart};
use crate::filter::scan_tracks;
use crate::metadata::Metadata;
use crate::options::{ChannelFilter, Options};

/// TEMPO, TIMESIG, TIME and SEQSIZE
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    /// Beats per minute
    pub tempo: i64,
    pub numerator: u8,
    pub denominator: u64,
    pub quarters_per_measure: f64,
    /// Number of the last measure holding a drum note
    pub seq_size: u32,
}

impl Header {
    pub fn from_metadata(meta: &Metadata) -> Self {
        Self {
            tempo: meta.bpm(),
            numerator: meta.time_sig.numerator,
            denominator: meta.time_sig.denominator(),
            quarters_per_measure: meta.quarters_per_measure(),
            seq_size: meta.last_measure_number(),
        }
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TEMPO {}", self.tempo)?;
        writeln!(f, "TIMESIG {}/{}", self.numerator, self.denominator)?;
        writeln!(f, "TIME {}", self.quarters_per_measure)?;
        write!(f, "SEQSIZE {}", self.seq_size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Body {
    /// Nothing on the selected channel
    NoDrums { channel: ChannelFilter },
    Groove {
        header: Header,
        /// Ascending note number
        voices: Vec<VoicePart>,
        /// Measures the trailing REPEAT block covers
        repeat: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Score {
    pub commentary: Vec<String>,
    pub warnings: Vec<String>,
    pub body: Body,
    #[serde(skip)]
    mute: bool,
}

impl Score {
    pub fn has_drums(&self) -> bool {
        matches!(self.body, Body::Groove { .. })
    }

    pub fn voices(&self) -> &[VoicePart] {
        match &self.body {
            Body::Groove { voices, .. } => voices,
            Body::NoDrums { .. } => &[],
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.commentary.iter().chain(&self.warnings) {
            writeln!(f, "{}", line)?;
        }
        match &self.body {
            Body::NoDrums { channel } => {
                if !self.mute {
                    writeln!(f, "// No events found on {}", channel)?;
                }
            }
            Body::Groove { header, voices, repeat } => {
                writeln!(f, "{}", header)?;
                for voice in voices {
                    writeln!(f, "{}", voice)?;
                }
                // Repeat enough measures of E to render it all
                writeln!(f, "REPEAT\n    E\nREPEATEND NOWARN {}", repeat)?;
            }
        }
        Ok(())
    }
}

/// Runs the whole pipeline on a decoded MIDI file
pub struct Converter<'a> {
    options: &'a Options,
    command_line: Option<String>,
}

impl<'a> Converter<'a> {
    pub fn new(options: &'a Options) -> Self {
        Self {
            options,
            command_line: None,
        }
    }

    /// Echo the invoking command line in the commentary
    pub fn with_command_line(mut self, command_line: impl Into<String>) -> Self {
        self.command_line = Some(command_line.into());
        self
    }

    pub fn convert(&self, midi: &MidiScore) -> Score {
        let mut meta = Metadata::new(midi.ticks_per_quarter);
        let scan = scan_tracks(midi, &mut meta, self.options);

        let mute = self.options.mute;
        let mut commentary = Vec::new();
        let mut warnings = Vec::new();
        if !mute {
            commentary.push("// MMA text produced by drumma".to_string());
            if let Some(line) = &self.command_line {
                commentary.push(format!("// {}", line));
            }
            warnings = scan
                .redundant
                .iter()
                .map(|kind| {
                    format!(
                        "// Warning: Multiple {} events. Only using the first. This output may not work.",
                        kind
                    )
                })
                .collect();
        }

        if scan.hits.is_empty() {
            log::info!("no drum events on {}", self.options.channel);
            return Score {
                commentary,
                warnings,
                body: Body::NoDrums {
                    channel: self.options.channel,
                },
                mute,
            };
        }

        let mut by_note: BTreeMap<u8, Vec<DrumHit>> = BTreeMap::new();
        for hit in scan.hits {
            by_note.entry(hit.note).or_default().push(hit);
        }

        let voices = by_note
            .iter()
            .map(|(&note, hits)| factor_voice(&Voice::for_note(note), hits, &meta, self.options))
            .collect();

        Score {
            commentary,
            warnings,
            body: Body::Groove {
                header: Header::from_metadata(&meta),
                voices,
                repeat: meta.last_measure_number(),
            },
            mute,
        }
    }
}

/// Convert a decoded MIDI file with the given options
pub fn convert(midi: &MidiScore, options: &Options) -> Score {
    Converter::new(options).convert(midi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{NoteEvent, TrackEvent};
    use crate::metadata::TimeSig;

    fn note(start: u64, duration: u64, channel: u8, note: u8, velocity: u8) -> TrackEvent {
        TrackEvent::Note(NoteEvent {
            start,
            duration,
            channel,
            note,
            velocity,
        })
    }

    fn unquantized() -> Options {
        Options {
            quant_time: 0,
            quant_vel: 0,
            places: 3,
            ..Options::default()
        }
    }

    #[test]
    fn test_full_text_layout() {
        let midi = MidiScore {
            ticks_per_quarter: 96,
            tracks: vec![vec![
                TrackEvent::TimeSignature(TimeSig::new(4, 2, 24, 8)),
                note(0, 48, 9, 36, 100),
                note(96, 48, 9, 36, 100),
            ]],
        };
        let score = Converter::new(&unquantized()).with_command_line("drumma in.mid").convert(&midi);

        let expected = "\
// MMA text produced by drumma
// drumma in.mid
TEMPO 120
TIMESIG 4/4
TIME 4
SEQSIZE 1
BEGIN Drum-KickDrum1
  TONE KickDrum1
  BEGIN DEFINE
    KickDrum1M1  1.000 96t 100;  2.000 96t 100;
  END
  SEQUENCE KickDrum1M1
END
REPEAT
    E
REPEATEND NOWARN 1
";
        assert_eq!(score.to_string(), expected);
    }

    #[test]
    fn test_identical_measures_across_bar_lines() {
        let midi = MidiScore {
            ticks_per_quarter: 96,
            tracks: vec![vec![note(0, 48, 9, 36, 100), note(384, 48, 9, 36, 100)]],
        };
        let options = Options {
            mute: true,
            ..unquantized()
        };
        let text = convert(&midi, &options).to_string();

        assert!(text.starts_with("TEMPO 120\nTIMESIG 4/4\nTIME 4\nSEQSIZE 2\n"));
        assert!(text.contains("    KickDrum1M1  1.000 96t 100;\n  END\n"));
        assert!(!text.contains("KickDrum1M2"));
        assert!(text.contains("  SEQUENCE KickDrum1M1 KickDrum1M1\n"));
        assert!(text.ends_with("REPEATEND NOWARN 2\n"));
    }

    #[test]
    fn test_no_drums() {
        let midi = MidiScore {
            ticks_per_quarter: 96,
            tracks: vec![vec![note(0, 48, 0, 60, 100)]],
        };
        let score = convert(&midi, &Options::default());
        assert!(!score.has_drums());
        assert_eq!(
            score.to_string(),
            "// MMA text produced by drumma\n// No events found on MIDI Channel 10\n"
        );

        let options = Options {
            channel: ChannelFilter::Only(3),
            mute: true,
            ..Options::default()
        };
        assert_eq!(convert(&midi, &options).to_string(), "");
    }

    #[test]
    fn test_no_drums_on_any_channel() {
        let midi = MidiScore {
            ticks_per_quarter: 96,
            tracks: vec![vec![TrackEvent::Tempo(400_000)]],
        };
        let options = Options {
            channel: ChannelFilter::All,
            ..Options::default()
        };
        let text = convert(&midi, &options).to_string();
        assert!(text.ends_with("// No events found on any MIDI Channel\n"));
        assert!(!text.contains("TEMPO"));
    }

    #[test]
    fn test_voices_in_note_order() {
        let midi = MidiScore {
            ticks_per_quarter: 96,
            tracks: vec![vec![
                note(0, 48, 9, 42, 80),
                note(0, 48, 9, 100, 80),
                note(0, 48, 9, 36, 80),
                note(192, 48, 9, 38, 80),
            ]],
        };
        let score = convert(&midi, &Options::default());
        let tags: Vec<&str> = score.voices().iter().map(|v| v.tag.as_str()).collect();
        assert_eq!(tags, vec!["KickDrum1", "SnareDrum1", "ClosedHiHat", "Unknown-100"]);

        let text = score.to_string();
        assert!(text.contains("BEGIN Drum-Unknown-100\n  TONE ShortHiWhistle\n"));
        assert!(text.contains("    SnareDrum1M1  3.000 96t 80;\n"));
    }

    #[test]
    fn test_redundant_meta_warnings() {
        let midi = MidiScore {
            ticks_per_quarter: 96,
            tracks: vec![vec![
                TrackEvent::Tempo(500_000),
                TrackEvent::Tempo(400_000),
                TrackEvent::Tempo(300_000),
                TrackEvent::TimeSignature(TimeSig::new(3, 2, 24, 8)),
                TrackEvent::TimeSignature(TimeSig::new(4, 2, 24, 8)),
                note(0, 48, 9, 36, 100),
            ]],
        };
        let score = convert(&midi, &Options::default());
        assert_eq!(
            score.warnings,
            vec![
                "// Warning: Multiple Tempo events. Only using the first. This output may not work.",
                "// Warning: Multiple Time Signature events. Only using the first. This output may not work.",
            ]
        );
        assert!(score.to_string().contains("TIMESIG 3/4\nTIME 3\n"));

        let options = Options {
            mute: true,
            ..Options::default()
        };
        let score = convert(&midi, &options);
        assert!(score.warnings.is_empty());
        assert!(score.to_string().starts_with("TEMPO 120\n"));
    }

    #[test]
    fn test_compound_meter_header() {
        let midi = MidiScore {
            ticks_per_quarter: 480,
            tracks: vec![vec![
                TrackEvent::TimeSignature(TimeSig::new(7, 3, 24, 8)),
                TrackEvent::Tempo(428_571),
                note(1680, 240, 9, 36, 100),
            ]],
        };
        let options = Options {
            mute: true,
            ..Options::default()
        };
        let text = convert(&midi, &options).to_string();
        assert!(text.starts_with("TEMPO 140\nTIMESIG 7/8\nTIME 3.5\nSEQSIZE 2\n"));
        assert!(text.contains("  SEQUENCE z KickDrum1M2\n"));
    }

    #[test]
    fn test_score_serializes() {
        let midi = MidiScore {
            ticks_per_quarter: 96,
            tracks: vec![vec![note(0, 48, 9, 36, 100)]],
        };
        let score = convert(&midi, &Options::default());
        let json = serde_json::to_value(&score).unwrap();
        let voice = &json["body"]["Groove"]["voices"][0];
        assert_eq!(voice["tag"], "KickDrum1");
        assert_eq!(voice["definitions"][0]["measure"][0]["beat"], "1.000");
        assert_eq!(voice["sequence"][0]["Measure"], "KickDrum1M1");
    }
}
