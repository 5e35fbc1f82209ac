/// MMA drum tone names for General MIDI percussion notes 27-86
/// (MMA Reference Manual, "Drum Notes, by MIDI Value")
const DRUM_NAMES: [&str; 60] = [
    "HighQ", "Slap", "ScratchPush", "ScratchPull", // 27-30
    "Sticks", "SquareClick", "MetronomeClick", "MetronomeBell", // 31-34
    "KickDrum2", "KickDrum1", "SideKick", "SnareDrum1", // 35-38
    "HandClap", "SnareDrum2", "LowTom2", "ClosedHiHat", // 39-42
    "LowTom1", "PedalHiHat", "MidTom2", "OpenHiHat", // 43-46
    "MidTom1", "HighTom2", "CrashCymbal1", "HighTom1", // 47-50
    "RideCymbal1", "ChineseCymbal", "RideBell", "Tambourine", // 51-54
    "SplashCymbal", "CowBell", "CrashCymbal2", "VibraSlap", // 55-58
    "RideCymbal2", "HighBongo", "LowBongo", "MuteHighConga", // 59-62
    "OpenHighConga", "LowConga", "HighTimbale", "LowTimbale", // 63-66
    "HighAgogo", "LowAgogo", "Cabasa", "Maracas", // 67-70
    "ShortHiWhistle", "LongLowWhistle", "ShortGuiro", "LongGuiro", // 71-74
    "Claves", "HighWoodBlock", "LowWoodBlock", "MuteCuica", // 75-78
    "OpenCuica", "MuteTriangle", "OpenTriangle", "Shaker", // 79-82
    "JingleBell", "Castanets", "MuteSudro", "OpenSudro", // 83-86
];

const FIRST_DRUM_NOTE: u8 = 27;

/// Tone played for notes outside the drum map
pub const FALLBACK_TONE: &str = "ShortHiWhistle";

/// Convert a MIDI drum note number to its MMA tone name
pub fn drum_name(note: u8) -> Option<&'static str> {
    let idx = note.checked_sub(FIRST_DRUM_NOTE)? as usize;
    DRUM_NAMES.get(idx).copied()
}

/// One percussion voice of the output: a note number, the name used in
/// track and measure tags, and the MMA tone that plays it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub note: u8,
    pub tag: String,
    pub tone: &'static str,
}

impl Voice {
    pub fn for_note(note: u8) -> Self {
        match drum_name(note) {
            Some(name) => Voice {
                note,
                tag: name.to_string(),
                tone: name,
            },
            None => Voice {
                note,
                tag: format!("Unknown-{}", note),
                tone: FALLBACK_TONE,
            },
        }
    }
}
