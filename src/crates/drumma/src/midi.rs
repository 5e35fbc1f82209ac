//! Standard MIDI File decoding into the converter's typed track events.
//!
//! Note-on and note-off messages are merged into single notes with a start
//! and a duration. A note is appended to its track when it is released, so
//! the event order within a track follows the note-offs. Notes still sounding
//! when the track ends are released at the track's last tick, grouped by
//! (channel, key) in the order each key was first struck.
//!
//! A file with zero ticks per quarter note is rejected, and time signatures
//! with a zero numerator are dropped: both would give measures of zero length.

use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use thiserror::Error;

use drumma_core::{MidiScore, NoteEvent, TimeSig, TrackEvent};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read MIDI file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse MIDI file")]
    Parse(#[from] midly::Error),
    #[error("MIDI file has a tick resolution of 0 ticks per quarter note")]
    ZeroResolution,
}

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Read and decode a MIDI file
pub fn load(path: &Path) -> Result<MidiScore> {
    let data = std::fs::read(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("read {} ({} bytes)", path.display(), data.len());
    decode(&data)
}

/// Decode the bytes of a Standard MIDI File
pub fn decode(data: &[u8]) -> Result<MidiScore> {
    let smf = Smf::parse(data)?;

    let ticks_per_quarter = match smf.header.timing {
        Timing::Metrical(tpq) => tpq.as_int() as u32,
        Timing::Timecode(fps, subframe) => {
            // Convert timecode to ticks per beat approximation
            let approx = (fps.as_f32() * subframe as f32 * 4.0) as u32;
            log::warn!("SMPTE timing, assuming {} ticks per quarter note", approx);
            approx
        }
    };
    if ticks_per_quarter == 0 {
        return Err(DecodeError::ZeroResolution);
    }

    let tracks = smf.tracks.iter().map(|track| decode_track(track)).collect::<Vec<_>>();
    log::debug!("{} tracks at {} ticks per quarter", tracks.len(), ticks_per_quarter);

    Ok(MidiScore {
        ticks_per_quarter,
        tracks,
    })
}

struct OpenNote {
    start: u64,
    velocity: u8,
}

fn decode_track(track: &[midly::TrackEvent<'_>]) -> Vec<TrackEvent> {
    let mut events = Vec::new();
    // Sounding notes per (channel, key), oldest first
    let mut sounding: HashMap<(u8, u8), VecDeque<OpenNote>> = HashMap::new();
    // Keys in the order they were first struck
    let mut struck: Vec<(u8, u8)> = Vec::new();
    let mut now: u64 = 0;

    for event in track {
        now += event.delta.as_int() as u64;

        match event.kind {
            TrackEventKind::Midi { channel, message } => {
                let channel = channel.as_int();
                match message {
                    MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                        let id = (channel, key.as_int());
                        if !sounding.contains_key(&id) {
                            struck.push(id);
                        }
                        sounding.entry(id).or_default().push_back(OpenNote {
                            start: now,
                            velocity: vel.as_int(),
                        });
                    }
                    // NoteOn with velocity=0 is equivalent to NoteOff
                    MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                        let key = key.as_int();
                        let open = sounding
                            .get_mut(&(channel, key))
                            .and_then(|notes| notes.pop_front());
                        match open {
                            Some(open) => events.push(note_event(&open, now, channel, key)),
                            None => log::debug!(
                                "note off without note on: channel {} key {} at {}",
                                channel,
                                key,
                                now
                            ),
                        }
                    }
                    _ => {}
                }
            }
            TrackEventKind::Meta(MetaMessage::TrackName(name)) => {
                let name = String::from_utf8_lossy(name);
                events.push(TrackEvent::TrackName(name.trim_end_matches('\0').to_string()));
            }
            TrackEventKind::Meta(MetaMessage::TimeSignature(0, dd, ..)) => {
                let denominator = 2u64.saturating_pow(dd as u32);
                log::warn!("ignoring time signature 0/{} at {}", denominator, now);
            }
            TrackEventKind::Meta(MetaMessage::TimeSignature(nn, dd, cc, bb)) => {
                events.push(TrackEvent::TimeSignature(TimeSig::new(nn, dd, cc, bb)));
            }
            TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => {
                events.push(TrackEvent::Tempo(tempo.as_int()));
            }
            _ => {}
        }
    }

    // Release whatever is still sounding at the end of the track
    for (channel, key) in struck {
        let Some(notes) = sounding.remove(&(channel, key)) else {
            continue;
        };
        if !notes.is_empty() {
            log::debug!("{} notes without note off: channel {} key {}", notes.len(), channel, key);
        }
        for open in notes {
            events.push(note_event(&open, now, channel, key));
        }
    }

    events
}

fn note_event(open: &OpenNote, end: u64, channel: u8, note: u8) -> TrackEvent {
    TrackEvent::Note(NoteEvent {
        start: open.start,
        duration: end - open.start,
        channel,
        note,
        velocity: open.velocity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::num::{u15, u24, u28, u4, u7};
    use midly::{Format, Header};

    fn ev(delta: u32, kind: TrackEventKind<'static>) -> midly::TrackEvent<'static> {
        midly::TrackEvent {
            delta: u28::from(delta),
            kind,
        }
    }

    fn on(delta: u32, channel: u8, key: u8, vel: u8) -> midly::TrackEvent<'static> {
        ev(
            delta,
            TrackEventKind::Midi {
                channel: u4::from(channel),
                message: MidiMessage::NoteOn {
                    key: u7::from(key),
                    vel: u7::from(vel),
                },
            },
        )
    }

    fn off(delta: u32, channel: u8, key: u8) -> midly::TrackEvent<'static> {
        ev(
            delta,
            TrackEventKind::Midi {
                channel: u4::from(channel),
                message: MidiMessage::NoteOff {
                    key: u7::from(key),
                    vel: u7::from(0),
                },
            },
        )
    }

    fn encode(tracks: Vec<Vec<midly::TrackEvent<'static>>>) -> Vec<u8> {
        encode_with(Timing::Metrical(u15::from(96)), tracks)
    }

    fn encode_with(timing: Timing, tracks: Vec<Vec<midly::TrackEvent<'static>>>) -> Vec<u8> {
        let mut smf = Smf::new(Header::new(Format::Parallel, timing));
        for mut track in tracks {
            track.push(ev(0, TrackEventKind::Meta(MetaMessage::EndOfTrack)));
            smf.tracks.push(track);
        }
        let mut bytes = Vec::new();
        smf.write(&mut bytes).unwrap();
        bytes
    }

    fn notes(events: &[TrackEvent]) -> Vec<NoteEvent> {
        events
            .iter()
            .filter_map(|e| match e {
                TrackEvent::Note(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_merges_note_on_and_off() {
        let bytes = encode(vec![vec![
            on(0, 9, 36, 100),
            off(48, 9, 36),
            on(48, 9, 36, 90),
            // velocity 0 note on releases
            on(24, 9, 36, 0),
        ]]);
        let score = decode(&bytes).unwrap();
        assert_eq!(score.ticks_per_quarter, 96);

        let decoded = notes(&score.tracks[0]);
        assert_eq!(
            decoded,
            vec![
                NoteEvent { start: 0, duration: 48, channel: 9, note: 36, velocity: 100 },
                NoteEvent { start: 96, duration: 24, channel: 9, note: 36, velocity: 90 },
            ]
        );
    }

    #[test]
    fn test_notes_follow_release_order() {
        let bytes = encode(vec![vec![
            on(0, 9, 36, 100),
            on(0, 9, 42, 80),
            off(10, 9, 42),
            off(38, 9, 36),
        ]]);
        let decoded = notes(&decode(&bytes).unwrap().tracks[0]);
        assert_eq!(decoded[0].note, 42);
        assert_eq!(decoded[0].duration, 10);
        assert_eq!(decoded[1].note, 36);
        assert_eq!(decoded[1].duration, 48);
    }

    #[test]
    fn test_overlapping_same_key_is_fifo() {
        let bytes = encode(vec![vec![on(0, 9, 38, 100), on(10, 9, 38, 50), off(10, 9, 38), off(10, 9, 38)]]);
        let decoded = notes(&decode(&bytes).unwrap().tracks[0]);
        assert_eq!(decoded[0].velocity, 100);
        assert_eq!(decoded[0].duration, 20);
        assert_eq!(decoded[1].velocity, 50);
        assert_eq!(decoded[1].duration, 20);
    }

    #[test]
    fn test_unreleased_notes_end_with_track() {
        let bytes = encode(vec![vec![
            on(0, 9, 49, 120),
            on(96, 9, 36, 100),
            ev(96, TrackEventKind::Meta(MetaMessage::Marker(b"fine"))),
        ]]);
        let decoded = notes(&decode(&bytes).unwrap().tracks[0]);
        assert_eq!(decoded.len(), 2);
        assert_eq!((decoded[0].note, decoded[0].duration), (49, 192));
        assert_eq!((decoded[1].note, decoded[1].duration), (36, 96));
    }

    #[test]
    fn test_unreleased_notes_grouped_by_first_strike() {
        let bytes = encode(vec![vec![
            on(0, 9, 42, 80),
            on(10, 9, 36, 100),
            on(10, 9, 42, 90),
            ev(10, TrackEventKind::Meta(MetaMessage::Marker(b"fine"))),
        ]]);
        let decoded = notes(&decode(&bytes).unwrap().tracks[0]);
        let order: Vec<(u8, u64)> = decoded.iter().map(|n| (n.note, n.start)).collect();
        assert_eq!(order, vec![(42, 0), (42, 20), (36, 10)]);
    }

    #[test]
    fn test_zero_resolution_is_rejected() {
        let bytes = encode_with(Timing::Metrical(u15::from(0)), vec![vec![on(0, 9, 36, 100)]]);
        assert!(matches!(decode(&bytes), Err(DecodeError::ZeroResolution)));
    }

    #[test]
    fn test_zero_numerator_time_signature_is_dropped() {
        let bytes = encode(vec![vec![
            ev(0, TrackEventKind::Meta(MetaMessage::TimeSignature(0, 2, 24, 8))),
            ev(0, TrackEventKind::Meta(MetaMessage::TimeSignature(3, 2, 24, 8))),
            on(0, 9, 36, 100),
            off(48, 9, 36),
        ]]);
        let score = decode(&bytes).unwrap();
        let signatures: Vec<&TimeSig> = score.tracks[0]
            .iter()
            .filter_map(|e| match e {
                TrackEvent::TimeSignature(ts) => Some(ts),
                _ => None,
            })
            .collect();
        assert_eq!(signatures.len(), 1);
        assert_eq!(signatures[0].numerator, 3);
        assert_eq!(notes(&score.tracks[0]).len(), 1);
    }

    #[test]
    fn test_stray_note_off_is_ignored() {
        let bytes = encode(vec![vec![off(0, 9, 36), on(0, 9, 38, 100), off(12, 9, 38)]]);
        let decoded = notes(&decode(&bytes).unwrap().tracks[0]);
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].note, 38);
    }

    #[test]
    fn test_meta_events() {
        let bytes = encode(vec![vec![
            ev(0, TrackEventKind::Meta(MetaMessage::TrackName(b"Drums\0"))),
            ev(0, TrackEventKind::Meta(MetaMessage::TimeSignature(6, 3, 24, 8))),
            ev(0, TrackEventKind::Meta(MetaMessage::Tempo(u24::from(600_000)))),
        ]]);
        let score = decode(&bytes).unwrap();
        assert_eq!(
            score.tracks[0],
            vec![
                TrackEvent::TrackName("Drums".to_string()),
                TrackEvent::TimeSignature(TimeSig::new(6, 3, 24, 8)),
                TrackEvent::Tempo(600_000),
            ]
        );
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(matches!(decode(b"not a midi file"), Err(DecodeError::Parse(_))));
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = load(Path::new("/nonexistent/drums.mid")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/drums.mid"));
    }
}
