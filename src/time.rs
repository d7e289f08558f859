#[cfg(test)]
#[path = "./time_tests.rs"]
mod tests;

use std::fmt;

/// Calendar date in the proleptic Gregorian calendar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Date {
    /// Four-digit year.
    pub year: u16,
    /// Month in `1..=12`.
    pub month: u8,
    /// Day in `1..=days_in_month(year, month)`.
    pub day: u8,
}

/// Time of day. Leap seconds are never produced, so `second` is `0..=59`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Time {
    /// Hour in `0..=23`.
    pub hour: u8,
    /// Minute in `0..=59`.
    pub minute: u8,
    /// Second in `0..=59`.
    pub second: u8,
    /// Fractional seconds in microseconds, `0..=999_999`.
    pub microsecond: u32,
}

/// UTC offset suffix of an offset date-time, per RFC 3339.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeOffset {
    /// The `Z` suffix: UTC offset of 00:00.
    Z,
    /// Offset between local time and UTC, in minutes.
    Custom {
        /// Total signed minutes, `-1439..=1439`, never zero.
        minutes: i16,
    },
}

/// One of the four TOML date-time kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Datetime {
    /// `offset-date-time`: date, time and UTC offset.
    Offset {
        /// Date part.
        date: Date,
        /// Time part.
        time: Time,
        /// Offset part.
        offset: TimeOffset,
    },
    /// `local-date-time`: date and time without offset.
    Local {
        /// Date part.
        date: Date,
        /// Time part.
        time: Time,
    },
    /// `local-date`: date only.
    LocalDate(Date),
    /// `local-time`: time only.
    LocalTime(Time),
}

pub(crate) fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub(crate) fn days_in_month(year: u16, month: u8) -> u8 {
    const DAYS: [u8; 13] = [0, 31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    if month == 2 && is_leap_year(year) {
        29
    } else {
        DAYS[month as usize]
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl fmt::Display for Time {
    /// Canonical form: `HH:MM:SS`, with `.ffffff` appended only when the
    /// fractional part is non-zero.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)?;
        if self.microsecond != 0 {
            write!(f, ".{:06}", self.microsecond)?;
        }
        Ok(())
    }
}

impl fmt::Display for TimeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TimeOffset::Z => f.write_str("Z"),
            TimeOffset::Custom { minutes } => {
                let (sign, abs) = if minutes < 0 {
                    ('-', (-minutes) as u16)
                } else {
                    ('+', minutes as u16)
                };
                write!(f, "{}{:02}:{:02}", sign, abs / 60, abs % 60)
            }
        }
    }
}

impl fmt::Display for Datetime {
    /// Canonical RFC 3339 rendering with `T` as the date-time delimiter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Datetime::Offset { date, time, offset } => write!(f, "{date}T{time}{offset}"),
            Datetime::Local { date, time } => write!(f, "{date}T{time}"),
            Datetime::LocalDate(date) => date.fmt(f),
            Datetime::LocalTime(time) => time.fmt(f),
        }
    }
}
