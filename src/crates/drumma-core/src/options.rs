//! Converter configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

use crate::error::{ConfigError, Result};

pub const QUANT_TIME_RANGE: RangeInclusive<u32> = 0..=10_000;
pub const QUANT_VEL_RANGE: RangeInclusive<u32> = 0..=127;
pub const PLACES_RANGE: RangeInclusive<usize> = 0..=12;
/// Human channel numbers, 0 meaning every channel
pub const HUMAN_CHANNEL_RANGE: RangeInclusive<u8> = 0..=16;

/// Which MIDI channel the drum notes are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelFilter {
    All,
    /// 0-based channel
    Only(u8),
}

impl ChannelFilter {
    /// Map a 1-based channel number (0 = all) to a filter
    pub fn from_human(channel: u8) -> Self {
        match channel {
            0 => ChannelFilter::All,
            n => ChannelFilter::Only(n - 1),
        }
    }

    /// Numeric form: -1 for all channels, otherwise the 0-based channel
    pub fn sentinel(&self) -> i32 {
        match self {
            ChannelFilter::All => -1,
            ChannelFilter::Only(ch) => *ch as i32,
        }
    }

    pub fn matches(&self, channel: u8) -> bool {
        match self {
            ChannelFilter::All => true,
            ChannelFilter::Only(ch) => *ch == channel,
        }
    }
}

impl Default for ChannelFilter {
    fn default() -> Self {
        // General MIDI percussion lives on channel 10
        ChannelFilter::Only(9)
    }
}

impl fmt::Display for ChannelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelFilter::All => write!(f, "any MIDI Channel"),
            ChannelFilter::Only(ch) => write!(f, "MIDI Channel {}", *ch as u32 + 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Quantize starts and durations to the nearest 1/quant_time quarter, 0 = off
    pub quant_time: u32,
    /// Width of the velocity buckets, 0 = off
    pub quant_vel: u32,
    /// Digits after the decimal point of beat positions
    pub places: usize,
    /// Render every duration as `0`
    pub zero: bool,
    pub channel: ChannelFilter,
    /// Leave out commentary and warning lines
    pub mute: bool,
    /// Give every non-empty measure its own definition
    pub repeat: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            quant_time: 32,
            quant_vel: 0,
            places: 3,
            zero: false,
            channel: ChannelFilter::default(),
            mute: false,
            repeat: false,
        }
    }
}

impl Options {
    /// Check every numeric option against its valid range
    pub fn validate(&self) -> Result<()> {
        check("quant_time", self.quant_time, &QUANT_TIME_RANGE)?;
        check("quant_vel", self.quant_vel, &QUANT_VEL_RANGE)?;
        if !PLACES_RANGE.contains(&self.places) {
            return Err(ConfigError::out_of_range(
                "places",
                self.places as i64,
                *PLACES_RANGE.start() as i64,
                *PLACES_RANGE.end() as i64,
            ));
        }
        if let ChannelFilter::Only(ch) = self.channel {
            let human = ch as i64 + 1;
            let (min, max) = (*HUMAN_CHANNEL_RANGE.start(), *HUMAN_CHANNEL_RANGE.end());
            if human > max as i64 {
                return Err(ConfigError::out_of_range("channel", human, min as i64, max as i64));
            }
        }
        Ok(())
    }
}

fn check(option: &'static str, value: u32, range: &RangeInclusive<u32>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::out_of_range(
            option,
            value,
            *range.start() as i64,
            *range.end() as i64,
        ))
    }
}
