use std::sync::LazyLock;

use {
    jiff::{
        ToSpan,
        civil::{Date, DateTime},
    },
    regex::Regex,
};

/// How far on either side of a fixed clock time a completion still counts.
const CLOCK_SLACK_MINUTES: i32 = 30;

/// A time-of-day attached to a recurrence pattern.
///
/// Either a fixed clock time ("at 5pm", "at 17:30") or a named period of the
/// day ("every morning"). A fixed time narrows the allowed completion window
/// to ±30 minutes around it; a named period narrows it to the period's hour
/// range. Without a time-of-day the window is the full local day.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimeOfDay {
    Clock { hour: i8, minute: i8 },
    Period(Period),
}

/// A named sub-range of the day.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Period {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl Period {
    /// The `[start, end)` hour range of this period. An end of 24 means the
    /// period runs through the end of the day.
    pub fn hours(self) -> (i8, i8) {
        match self {
            Period::Morning => (6, 12),
            Period::Afternoon => (12, 18),
            Period::Evening => (18, 22),
            Period::Night => (22, 24),
        }
    }

    pub(crate) fn from_name(name: &str) -> Option<Period> {
        let period = match name {
            "morning" => Period::Morning,
            "afternoon" => Period::Afternoon,
            "evening" => Period::Evening,
            "night" => Period::Night,
            _ => return None,
        };
        Some(period)
    }
}

/// The interval of instants in which a completion counts toward a target.
///
/// Both endpoints are inclusive.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimeWindow {
    pub start: DateTime,
    pub end: DateTime,
}

impl TimeWindow {
    /// The full-day window for `date`.
    pub fn day(date: Date) -> TimeWindow {
        TimeWindow { start: start_of_day(date), end: end_of_day(date) }
    }

    /// Returns true when `dt` falls inside this window.
    pub fn contains(&self, dt: DateTime) -> bool {
        self.start <= dt && dt <= self.end
    }
}

static CLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^
        (?P<hour>[0-9]{1,2})
        (?: : (?P<minute>[0-9]{2}) )?
        (?: \x20? (?P<meridiem>am|pm) )?
        $
        ",
    )
    .unwrap()
});

impl TimeOfDay {
    /// Parse a time-of-day fragment.
    ///
    /// Accepts 12-hour clock times with an am/pm suffix (`5pm`, `8:30am`),
    /// 24-hour clock times (`17:30`, `9`), and period names (`morning`).
    /// Out-of-range components (hour 0 or above 12 with a meridiem, hour
    /// above 23 without, minute above 59) yield `None`; the caller treats
    /// that the same as unparseable text.
    ///
    /// Input must already be trimmed and lowercased.
    pub fn parse(text: &str) -> Option<TimeOfDay> {
        if let Some(period) = Period::from_name(text) {
            return Some(TimeOfDay::Period(period));
        }
        let caps = CLOCK.captures(text)?;
        // The regex limits each component to two digits, so these can't
        // overflow an i8.
        let mut hour: i8 = caps["hour"].parse().ok()?;
        let minute: i8 = match caps.name("minute") {
            None => 0,
            Some(m) => m.as_str().parse().ok()?,
        };
        if minute > 59 {
            return None;
        }
        match caps.name("meridiem").map(|m| m.as_str()) {
            Some(meridiem) => {
                if !(1..=12).contains(&hour) {
                    return None;
                }
                hour %= 12;
                if meridiem == "pm" {
                    hour += 12;
                }
            }
            None => {
                if hour > 23 {
                    return None;
                }
            }
        }
        Some(TimeOfDay::Clock { hour, minute })
    }

    /// The instant on `date` by which a completion is due.
    ///
    /// For a fixed clock time this is the clock instant itself. For a named
    /// period it is the end of the period's window, matching the convention
    /// that a date-only target is due by the end of its day.
    pub fn due_instant(&self, date: Date) -> DateTime {
        match *self {
            TimeOfDay::Clock { hour, minute } => date.at(hour, minute, 0, 0),
            TimeOfDay::Period(_) => self.window(date).end,
        }
    }

    /// The allowed completion window on `date`.
    ///
    /// Fixed clock times get ±30 minutes, clamped so the window never leaks
    /// into an adjacent day. Periods get their hour range.
    pub fn window(&self, date: Date) -> TimeWindow {
        match *self {
            TimeOfDay::Clock { hour, minute } => {
                let center = date.at(hour, minute, 0, 0);
                let slack = CLOCK_SLACK_MINUTES.minutes();
                let start = center
                    .checked_sub(slack)
                    .unwrap_or(center)
                    .max(start_of_day(date));
                let end = center
                    .checked_add(slack)
                    .unwrap_or(center)
                    .min(end_of_day(date));
                TimeWindow { start, end }
            }
            TimeOfDay::Period(period) => {
                let (from, to) = period.hours();
                let start = date.at(from, 0, 0, 0);
                let end = if to >= 24 {
                    end_of_day(date)
                } else {
                    date.at(to - 1, 59, 59, 999_999_999)
                };
                TimeWindow { start, end }
            }
        }
    }
}

/// The first instant of `date`.
pub(crate) fn start_of_day(date: Date) -> DateTime {
    date.at(0, 0, 0, 0)
}

/// The last instant of `date`.
pub(crate) fn end_of_day(date: Date) -> DateTime {
    date.at(23, 59, 59, 999_999_999)
}
