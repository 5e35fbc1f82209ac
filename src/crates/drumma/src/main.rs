use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;

use drumma::midi;
use drumma::output::write_output;
use drumma_core::options::{
    HUMAN_CHANNEL_RANGE, PLACES_RANGE, QUANT_TIME_RANGE, QUANT_VEL_RANGE,
};
use drumma_core::{ChannelFilter, Converter, Options};

/// An option range as the `i64` bounds clap's integer parsers take
macro_rules! arg_range {
    ($range:expr) => {
        (*$range.start() as i64)..=(*$range.end() as i64)
    };
}

#[derive(Parser, Debug)]
#[command(name = "drumma", version)]
#[command(
    about = "Turn General MIDI drum measures into MMA (Musical MIDI Accompaniment) code",
    long_about = None
)]
#[command(after_help = "Trim your MIDI to just the drum measures you want. \
Your MIDI clip should have only one tempo and only one time signature.")]
struct Args {
    /// MIDI file to process
    input: PathBuf,

    /// Output file (if "-" or not set, just print the output)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force all durations to "0"
    #[arg(short, long)]
    zero: bool,

    /// Quantize note starts and durations to the nearest 1/DENOM
    /// (4 means quarter, 8 means 8th, etc.), 0 for no quantization
    #[arg(long, visible_alias = "qt", value_name = "DENOM", default_value_t = 32,
          value_parser = clap::value_parser!(u32).range(arg_range!(QUANT_TIME_RANGE)))]
    quant_time: u32,

    /// Quantize velocities to the center of each NUM-wide velocity step
    /// (if NUM=4, centers are 2, 6, 10, etc.), 0 for no quantization
    #[arg(long, visible_alias = "qv", value_name = "NUM", default_value_t = 0,
          value_parser = clap::value_parser!(u32).range(arg_range!(QUANT_VEL_RANGE)))]
    quant_vel: u32,

    /// Number of places (between 0 and 12) after the decimal point
    #[arg(short, long, default_value_t = 3,
          value_parser = clap::value_parser!(u8).range(arg_range!(PLACES_RANGE)))]
    places: u8,

    /// MIDI channel to find drum events on (0 = all)
    #[arg(short, long, default_value_t = 10,
          value_parser = clap::value_parser!(u8).range(arg_range!(HUMAN_CHANNEL_RANGE)))]
    channel: u8,

    /// Suppress commentary lines
    #[arg(short, long)]
    mute: bool,

    /// Repeat identical measures instead of reusing the first definition
    #[arg(short, long)]
    repeat: bool,

    /// Print the score structure as JSON instead of MMA text
    #[arg(long)]
    json: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log debugging details
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn options(&self) -> Options {
        Options {
            quant_time: self.quant_time,
            quant_vel: self.quant_vel,
            places: self.places as usize,
            zero: self.zero,
            channel: ChannelFilter::from_human(self.channel),
            mute: self.mute,
            repeat: self.repeat,
        }
    }

    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Error
        } else if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_default_env()
        .init();

    let options = args.options();
    options.validate()?;

    let midi = midi::load(&args.input)?;

    let command_line = std::env::args().collect::<Vec<_>>().join(" ");
    let score = Converter::new(&options)
        .with_command_line(command_line)
        .convert(&midi);

    let text = if args.json {
        let mut json = serde_json::to_string_pretty(&score).context("Failed to serialize score")?;
        json.push('\n');
        json
    } else {
        score.to_string()
    };

    write_output(args.output.as_deref(), &text)
}
