//! Time-of-day service bands.
//!
//! The network is snapshotted per service period: connectivity and travel
//! times differ between the morning rush and a Sunday night. Each band has
//! its own pre-generated snapshot file, and the band name is the file
//! suffix used by the snapshot generator.

use std::fmt;

/// Error returned when parsing an unknown band name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown time band: {name}")]
pub struct InvalidBand {
    name: String,
}

/// A named interval of the day with its own network snapshot.
///
/// The mapping from local hour to band is total: every hour of the day
/// belongs to exactly one band, with overnight hours folded into
/// [`TimeBand::LateNight`] up to the early-morning boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeBand {
    /// 07:00–09:00
    MorningPeak,
    /// 09:00–16:00
    DayOffpeak,
    /// 16:00–19:00
    EveningPeak,
    /// 19:00–23:00
    Evening,
    /// 23:00–07:00
    LateNight,
}

impl TimeBand {
    /// All bands, in day order.
    pub const ALL: [TimeBand; 5] = [
        TimeBand::MorningPeak,
        TimeBand::DayOffpeak,
        TimeBand::EveningPeak,
        TimeBand::Evening,
        TimeBand::LateNight,
    ];

    /// Band for a local hour of day (0–23). Boundaries are half-open.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_server::graph::TimeBand;
    ///
    /// assert_eq!(TimeBand::from_hour(8), TimeBand::MorningPeak);
    /// assert_eq!(TimeBand::from_hour(9), TimeBand::DayOffpeak);
    /// assert_eq!(TimeBand::from_hour(2), TimeBand::LateNight);
    /// ```
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            7..=8 => TimeBand::MorningPeak,
            9..=15 => TimeBand::DayOffpeak,
            16..=18 => TimeBand::EveningPeak,
            19..=22 => TimeBand::Evening,
            _ => TimeBand::LateNight,
        }
    }

    /// The band name as used in snapshot filenames and cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeBand::MorningPeak => "morning_peak",
            TimeBand::DayOffpeak => "day_offpeak",
            TimeBand::EveningPeak => "evening_peak",
            TimeBand::Evening => "evening",
            TimeBand::LateNight => "late_night",
        }
    }

    /// Parse a band from its name.
    pub fn parse(name: &str) -> Result<Self, InvalidBand> {
        TimeBand::ALL
            .into_iter()
            .find(|band| band.as_str() == name)
            .ok_or_else(|| InvalidBand {
                name: name.to_string(),
            })
    }
}

impl fmt::Display for TimeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
