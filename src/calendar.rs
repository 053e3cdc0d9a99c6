use {
    anyhow::Context,
    jiff::{
        ToSpan,
        civil::{Date, Weekday},
    },
};

/// An inclusive calendar window over which streaks are analyzed.
///
/// A range is validated on construction: `start` must not come after `end`,
/// and `end` may be at most [`DateRange::MAX_DAYS`] days past `start` (far
/// enough to hold two consecutive occurrences of a yearly date). Everything
/// downstream (target generation, streak walking) relies on these bounds to
/// stay cheap, so violating them is a caller bug and reported as an error
/// rather than silently truncated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    /// The maximum number of days `end` may be past `start`.
    pub const MAX_DAYS: i32 = 365;

    /// Create a new inclusive date range.
    pub fn new(start: Date, end: Date) -> anyhow::Result<DateRange> {
        if start > end {
            anyhow::bail!(
                "date range start `{start}` comes after its end `{end}`",
            );
        }
        let days = start
            .until(end)
            .with_context(|| {
                format!("failed to measure range `{start}..={end}`")
            })?
            .get_days();
        if days > DateRange::MAX_DAYS {
            anyhow::bail!(
                "date range `{start}..={end}` spans {days} days, \
                 but the maximum supported is {max}",
                max = DateRange::MAX_DAYS,
            );
        }
        Ok(DateRange { start, end })
    }

    /// The first day in this range.
    pub fn start(&self) -> Date {
        self.start
    }

    /// The last day in this range.
    pub fn end(&self) -> Date {
        self.end
    }

    /// Returns true when `date` falls inside this range, inclusive of both
    /// endpoints.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// The number of calendar days in this range, counting both endpoints.
    pub fn len_days(&self) -> i32 {
        // OK because the range was validated on construction.
        self.start.until(self.end).unwrap().get_days() + 1
    }
}

/// Returns the date for `day` in the given month, clamping to the month's
/// last day when the month is too short.
///
/// That is, "day 31" in February resolves to February 28 (or 29), rather
/// than being skipped. `year` and `month` must be valid; `day` must be in
/// `1..=31`.
pub fn clamp_day(year: i16, month: i8, day: i8) -> Date {
    let first = jiff::civil::date(year, month, 1);
    jiff::civil::date(year, month, day.min(first.days_in_month()))
}

/// Resolve the Nth occurrence of `weekday` in the given month.
///
/// `ordinal` may be `1..=5`, or `-1` for the last occurrence. Returns `None`
/// when the month has no such occurrence (for example, no fifth Friday).
pub fn nth_weekday_of_month(
    year: i16,
    month: i8,
    ordinal: i8,
    weekday: Weekday,
) -> Option<Date> {
    let first = jiff::civil::date(year, month, 1);
    let date = first.nth_weekday_of_month(ordinal, weekday).ok()?;
    // Jiff never returns a date outside the month here, but the fifth
    // occurrence may simply not exist, which is the error case above.
    Some(date)
}

/// Returns true for Monday through Friday.
pub fn is_workday(date: Date) -> bool {
    !is_weekend(date)
}

/// Returns true for Saturday and Sunday.
pub fn is_weekend(date: Date) -> bool {
    matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday)
}

/// Returns the Monday that starts the week containing `date`.
///
/// Returns `None` only when that Monday would fall before the minimum
/// supported date.
pub fn week_start(date: Date) -> Option<Date> {
    if date.weekday() == Weekday::Monday {
        Some(date)
    } else {
        date.nth_weekday(-1, Weekday::Monday).ok()
    }
}

/// The number of whole weeks from the week containing `earlier` to the week
/// containing `later`.
///
/// Both dates are aligned to their Monday week-start before measuring, so
/// two dates in the same week are zero weeks apart regardless of weekday.
pub fn weeks_between(earlier: Date, later: Date) -> Option<i32> {
    let earlier = week_start(earlier)?;
    let later = week_start(later)?;
    let days = earlier.until(later).ok()?.get_days();
    Some(days / 7)
}

/// Iterate `(year, month)` pairs backward from the month containing `from`
/// down to the month containing `until`, stepping `interval` months at a
/// time.
///
/// The first pair yielded is always `from`'s month; the phase of the month
/// cadence is anchored there.
pub fn months_back(
    from: Date,
    until: Date,
    interval: i32,
) -> impl Iterator<Item = (i16, i8)> {
    debug_assert!(interval >= 1);
    let until_index =
        i32::from(until.year()) * 12 + i32::from(until.month()) - 1;
    let from_index = i32::from(from.year()) * 12 + i32::from(from.month()) - 1;
    let mut index = from_index;
    std::iter::from_fn(move || {
        if index < until_index {
            return None;
        }
        let year = i16::try_from(index.div_euclid(12)).ok()?;
        let month = i8::try_from(index.rem_euclid(12) + 1).ok()?;
        index -= interval;
        Some((year, month))
    })
}

/// Map a weekday name to a `Weekday`.
///
/// Full names and the common abbreviations are accepted. Input must already
/// be lowercased.
pub(crate) fn weekday_from_name(name: &str) -> Option<Weekday> {
    use jiff::civil::Weekday::*;

    let weekday = match name {
        "sunday" | "sun" => Sunday,
        "monday" | "mon" => Monday,
        "tuesday" | "tues" | "tue" => Tuesday,
        "wednesday" | "wed" => Wednesday,
        "thursday" | "thurs" | "thu" => Thursday,
        "friday" | "fri" => Friday,
        "saturday" | "sat" => Saturday,
        _ => return None,
    };
    Some(weekday)
}

/// Map a month name to its `1..=12` number.
///
/// Full names and 3-letter abbreviations are accepted. Input must already be
/// lowercased.
pub(crate) fn month_from_name(name: &str) -> Option<i8> {
    let month = match name {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Step `date` backward by `days`, or `None` when that underflows the
/// supported calendar.
pub(crate) fn back(date: Date, days: i32) -> Option<Date> {
    date.checked_sub(days.days()).ok()
}
