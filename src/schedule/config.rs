use crate::error::{Error, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Wall-clock firing time, validated `HH:mm`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTime {
    pub hour: u8,
    pub minute: u8,
}

impl RunTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(Error::InvalidRunTime(format!("{:02}:{:02}", hour, minute)));
        }
        Ok(RunTime { hour, minute })
    }

    pub fn parse(value: &str) -> Result<Self> {
        let invalid = || Error::InvalidRunTime(value.to_string());

        let (hours, minutes) = value.split_once(':').ok_or_else(invalid)?;
        if hours.len() != 2 || minutes.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = hours.parse().map_err(|_| invalid())?;
        let minute: u8 = minutes.parse().map_err(|_| invalid())?;

        RunTime::new(hour, minute).map_err(|_| invalid())
    }

    /// The deactivation job fires exactly one minute after settlement,
    /// rolling over hour and day (`23:59` -> `00:00`).
    pub fn plus_one_minute(&self) -> RunTime {
        let total = (self.hour as u16 * 60 + self.minute as u16 + 1) % (24 * 60);
        RunTime {
            hour: (total / 60) as u8,
            minute: (total % 60) as u8,
        }
    }
}

impl fmt::Display for RunTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// The logically-current schedule: one settlement firing per day at
/// `run_time` in `time_zone`, suppressed on `market_off_days` (0 = Sunday).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub run_time: RunTime,
    pub time_zone: Tz,
    pub market_off_days: BTreeSet<u8>,
}

impl ScheduleConfig {
    pub fn new(
        run_time: RunTime,
        time_zone: Tz,
        market_off_days: impl IntoIterator<Item = i64>,
    ) -> Result<Self> {
        let mut days = BTreeSet::new();
        for day in market_off_days {
            if !(0..=6).contains(&day) {
                return Err(Error::InvalidMarketOffDay(day));
            }
            days.insert(day as u8);
        }

        Ok(ScheduleConfig {
            run_time,
            time_zone,
            market_off_days: days,
        })
    }

    /// `06:00`, weekend off, in the given zone: the documented fallback when
    /// nothing is persisted or the schedule read fails.
    pub fn default_with_tz(time_zone: Tz) -> Self {
        ScheduleConfig {
            run_time: RunTime { hour: 6, minute: 0 },
            time_zone,
            market_off_days: BTreeSet::from([0, 6]),
        }
    }

    pub fn parse_time_zone(value: &str) -> Result<Tz> {
        value
            .parse::<Tz>()
            .map_err(|_| Error::InvalidTimeZone(value.to_string()))
    }

    pub fn is_off_day(&self, weekday: u8) -> bool {
        self.market_off_days.contains(&weekday)
    }

    pub fn off_day_names(&self) -> Vec<String> {
        self.market_off_days
            .iter()
            .map(|&d| WEEKDAY_NAMES[d as usize].to_string())
            .collect()
    }

    pub fn deactivation_run_time(&self) -> RunTime {
        self.run_time.plus_one_minute()
    }
}
