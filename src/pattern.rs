use std::sync::LazyLock;

use {
    jiff::civil::{Date, Weekday},
    regex::Regex,
};

use crate::{calendar, holiday, timeofday::TimeOfDay};

/// The recurrence family a piece of text belongs to.
///
/// Families are tried in a fixed precedence order — Daily, Weekly, Monthly,
/// Yearly, Relative, Completion, Holiday — because surface forms overlap.
/// For example, a bare weekday name ("every monday") must be captured by the
/// weekly grammar and never by the monthly day-number rule.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Family {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Relative,
    Completion,
    Holiday,
}

impl Family {
    fn name(self) -> &'static str {
        match self {
            Family::Daily => "daily",
            Family::Weekly => "weekly",
            Family::Monthly => "monthly",
            Family::Yearly => "yearly",
            Family::Relative => "relative",
            Family::Completion => "completion",
            Family::Holiday => "holiday",
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A structured recurrence rule parsed from free text.
///
/// This is a closed union: exactly one variant describes any given piece of
/// text. Numeric fields are validated at parse time, so a constructed
/// pattern never carries an out-of-range day, month, weekday or hour. Text
/// that matches no family, or that matches a family but fails validation,
/// parses to `Unsupported` — syntax errors are data here, not errors, and
/// [`RecurrencePattern::parse`] never fails on user-controlled input.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RecurrencePattern {
    Daily(Daily),
    Weekly(Weekly),
    Monthly(Monthly),
    Yearly(Yearly),
    Relative(Relative),
    Completion(Completion),
    Holiday(Holiday),
    Unsupported(Unsupported),
}

/// Calendar-daily recurrence: "every day", "every 3 days", "every workday".
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Daily {
    /// Days between occurrences. "every other day" is interval 2.
    pub interval: i32,
    /// Restricts occurrences to workdays or weekends.
    pub filter: DayFilter,
    pub time: Option<TimeOfDay>,
    /// "starting <date>" bound, inclusive.
    pub start: Option<Date>,
    /// "ending <date>" bound, inclusive.
    pub end: Option<Date>,
}

/// Which days of the week a daily pattern applies to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DayFilter {
    Any,
    Workday,
    Weekend,
}

/// Weekly recurrence on one or more weekdays: "every monday", "every mon,
/// wed and fri", "every other tuesday".
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Weekly {
    /// Weeks between occurrences. "every other monday" is interval 2.
    pub interval: i32,
    /// Never empty; sorted Monday-first and deduplicated. "every week" with
    /// no weekday anchors to Monday, the start of the week.
    pub weekdays: Vec<Weekday>,
    pub time: Option<TimeOfDay>,
}

/// Monthly recurrence: "every month", "every 15th", "every last day",
/// "every 2nd tuesday".
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Monthly {
    /// Months between occurrences.
    pub interval: i32,
    pub days: MonthlyDays,
    pub time: Option<TimeOfDay>,
}

/// Which day(s) of the month a monthly pattern lands on.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MonthlyDays {
    /// No explicit day given ("every month"); the generator resolves this
    /// to the reference day-of-month, clamped per month.
    Default,
    /// Explicit days, sorted and deduplicated, each in `1..=31`. Days past
    /// a short month's end clamp to its last day.
    Fixed(Vec<i8>),
    /// "every last day of the month".
    Last,
    /// The Nth occurrence of a weekday: ordinal `1..=5`, or `-1` for the
    /// last occurrence.
    Nth { ordinal: i8, weekday: Weekday },
}

/// Yearly recurrence on a fixed month and day: "every year", "every july 4".
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Yearly {
    /// Years between occurrences.
    pub interval: i32,
    /// `1..=12`.
    pub month: i8,
    /// `1..=31`, validated against the month's maximum length. February 29
    /// clamps to February 28 off leap years at generation time.
    pub day: i8,
    pub time: Option<TimeOfDay>,
}

/// Completion-anchored recurrence: "after 3 days", "every! 2 days". The
/// next target is `days` after the last real completion, not a calendar
/// date.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Relative {
    pub days: i32,
    pub time: Option<TimeOfDay>,
}

/// Quota recurrence: "2 times every 3 days" requires `required` completions
/// inside every consecutive `period_days`-length bucket.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Completion {
    pub required: u32,
    /// Always at least `required`.
    pub period_days: u32,
}

/// A named-holiday recurrence: "every christmas day".
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Holiday {
    pub holiday: holiday::Holiday,
    pub time: Option<TimeOfDay>,
}

/// Text that matched no family, or failed numeric validation.
///
/// This is a terminal state, not an error: the streak calculator maps it to
/// a zero result.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Unsupported {
    /// The original text, before normalization.
    pub text: String,
}

impl RecurrencePattern {
    /// Parse a free-text recurrence description.
    ///
    /// This is total: any string yields a pattern, with `Unsupported` as
    /// the catch-all. Matching is case- and whitespace-insensitive.
    pub fn parse(text: &str) -> RecurrencePattern {
        let norm = normalize(text);
        if norm.is_empty() {
            return unsupported(text);
        }
        // Precedence order is load-bearing; see `Family`.
        let parsers: &[fn(&str, &str) -> Option<RecurrencePattern>] = &[
            parse_daily,
            parse_weekly,
            parse_monthly,
            parse_yearly,
            parse_relative,
            parse_completion,
            parse_holiday,
        ];
        for parser in parsers {
            if let Some(pattern) = parser(&norm, text) {
                match pattern.family() {
                    Some(family) => {
                        log::trace!("parsed `{norm}` as a {family} pattern")
                    }
                    None => log::trace!(
                        "`{norm}` matched a rule but failed validation",
                    ),
                }
                return pattern;
            }
        }
        log::trace!("`{norm}` matched no recurrence family");
        unsupported(text)
    }

    /// The family this pattern belongs to, or `None` for `Unsupported`.
    pub fn family(&self) -> Option<Family> {
        let family = match *self {
            RecurrencePattern::Daily(_) => Family::Daily,
            RecurrencePattern::Weekly(_) => Family::Weekly,
            RecurrencePattern::Monthly(_) => Family::Monthly,
            RecurrencePattern::Yearly(_) => Family::Yearly,
            RecurrencePattern::Relative(_) => Family::Relative,
            RecurrencePattern::Completion(_) => Family::Completion,
            RecurrencePattern::Holiday(_) => Family::Holiday,
            RecurrencePattern::Unsupported(_) => return None,
        };
        Some(family)
    }
}

/// Classify text into a recurrence family without keeping the parsed
/// pattern.
pub fn classify(text: &str) -> Option<Family> {
    RecurrencePattern::parse(text).family()
}

/// Lowercase, trim and collapse inner whitespace, and normalize
/// typographic apostrophes, so the grammar only ever sees one spelling.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .replace('\u{2019}', "'")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn unsupported(text: &str) -> RecurrencePattern {
    RecurrencePattern::Unsupported(Unsupported { text: text.to_string() })
}

/// Weekday alternation shared by the weekly and monthly grammars. Full
/// names come first so the preferred capture is the longest spelling.
const WEEKDAY: &str = "(?:monday|tuesday|wednesday|thursday|friday\
                       |saturday|sunday|mon|tues|tue|wed|thurs|thu\
                       |fri|sat|sun)";

const MONTH_NAME: &str = "(?:january|february|march|april|may|june|july\
                          |august|september|october|november|december\
                          |jan|feb|mar|apr|jun|jul|aug|sep|oct|nov|dec)";

/// Optional trailing "at <time>" fragment. The captured blob is validated
/// separately by `TimeOfDay::parse`. Only meaningful inside `(?x)` rules,
/// which ignore the literal whitespace here.
const TIME_SUFFIX: &str = r"(?:\x20at\x20(?P<time>
    [0-9]{1,2} (?::[0-9]{2})? (?:\x20?(?:am|pm))?
    | morning | afternoon | evening | night
    ))?";

static DAILY_EVERY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?x)
        ^ every (?P<bang>!)?
        (?: \x20 (?P<other>other) | \x20 (?P<n>[0-9]+) )?
        \x20 days?
        {TIME_SUFFIX}
        (?: \x20 starting \x20 (?P<start>[0-9]{{4}}-[0-9]{{2}}-[0-9]{{2}}) )?
        (?: \x20 ending \x20 (?P<end>[0-9]{{4}}-[0-9]{{2}}-[0-9]{{2}}) )?
        $",
    ))
    .unwrap()
});

static DAILY_FILTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?x)
        ^ every \x20 (?P<filter>workdays?|weekdays?|weekends?)
        {TIME_SUFFIX}
        $",
    ))
    .unwrap()
});

static DAILY_PERIOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^ every \x20 (?P<period>morning|afternoon|evening|night) $",
    )
    .unwrap()
});

static WEEKLY_EVERY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?x)
        ^ every (?: \x20 (?P<n>[0-9]+) )? \x20 weeks?
        {TIME_SUFFIX}
        $",
    ))
    .unwrap()
});

static WEEKLY_DAYS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?x)
        ^ every (?: \x20 (?P<other>other) )?
        \x20 (?P<days> {WEEKDAY} (?: (?: ,\x20? | ,?\x20and\x20 ) {WEEKDAY} )* )
        {TIME_SUFFIX}
        $",
    ))
    .unwrap()
});

static MONTHLY_EVERY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?x)
        ^ every (?: \x20 (?P<n>[0-9]+) )? \x20 months?
        {TIME_SUFFIX}
        $",
    ))
    .unwrap()
});

static MONTHLY_LAST_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?x)
        ^ every \x20 last \x20 day (?: \x20 of \x20 the \x20 month )?
        {TIME_SUFFIX}
        $",
    ))
    .unwrap()
});

static MONTHLY_NTH_WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?x)
        ^ every
        \x20 (?P<ordinal>1st|2nd|3rd|4th|5th|first|second|third|fourth
                         |fifth|last)
        \x20 (?P<weekday>{WEEKDAY})
        {TIME_SUFFIX}
        $",
    ))
    .unwrap()
});

static MONTHLY_DAYS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?x)
        ^ every
        \x20 (?P<days> [0-9]{{1,2}} (?:st|nd|rd|th)?
                       (?: ,\x20? [0-9]{{1,2}} (?:st|nd|rd|th)? )* )
        (?: \x20 of \x20 the \x20 month )?
        {TIME_SUFFIX}
        $",
    ))
    .unwrap()
});

static YEARLY_EVERY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?x)
        ^ every (?: \x20 (?P<n>[0-9]+) )? \x20 years?
        {TIME_SUFFIX}
        $",
    ))
    .unwrap()
});

static YEARLY_MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?x)
        ^ every
        \x20 (?P<month>{MONTH_NAME})
        \x20 (?P<day>[0-9]{{1,2}}) (?:st|nd|rd|th)?
        {TIME_SUFFIX}
        $",
    ))
    .unwrap()
});

static RELATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?x)
        ^ after \x20 (?P<n>[0-9]+) \x20 days?
        {TIME_SUFFIX}
        $",
    ))
    .unwrap()
});

static COMPLETION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^ (?P<n>[0-9]+) \x20 times?
        \x20 (?:per|every)
        \x20 (?P<m>[0-9]+) \x20 days?
        $",
    )
    .unwrap()
});

// Digits are allowed so that "4th of july" can reach the lookup table.
static HOLIDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?x)
        ^ every \x20 (?P<name>[a-z0-9][a-z0-9'\x20]*?)
        {TIME_SUFFIX}
        $",
    ))
    .unwrap()
});

/// Parse the optional time capture, distinguishing "no time given" from
/// "a time was given but it's invalid".
fn time_capture(
    caps: &regex::Captures<'_>,
) -> Result<Option<TimeOfDay>, ()> {
    match caps.name("time") {
        None => Ok(None),
        Some(m) => TimeOfDay::parse(m.as_str()).map(Some).ok_or(()),
    }
}

fn interval_capture(caps: &regex::Captures<'_>, name: &str) -> Option<i32> {
    match caps.name(name) {
        None => Some(1),
        Some(m) => match m.as_str().parse::<i32>() {
            Ok(n) if n >= 1 => Some(n),
            _ => None,
        },
    }
}

fn parse_daily(norm: &str, original: &str) -> Option<RecurrencePattern> {
    if let Some(caps) = DAILY_PERIOD.captures(norm) {
        // Period names are a closed set in the regex itself.
        let time = TimeOfDay::parse(&caps["period"]).unwrap();
        return Some(RecurrencePattern::Daily(Daily {
            interval: 1,
            filter: DayFilter::Any,
            time: Some(time),
            start: None,
            end: None,
        }));
    }
    if let Some(caps) = DAILY_FILTER.captures(norm) {
        let Ok(time) = time_capture(&caps) else {
            return Some(unsupported(original));
        };
        let filter = if caps["filter"].starts_with("weekend") {
            DayFilter::Weekend
        } else {
            DayFilter::Workday
        };
        return Some(RecurrencePattern::Daily(Daily {
            interval: 1,
            filter,
            time,
            start: None,
            end: None,
        }));
    }
    let caps = DAILY_EVERY.captures(norm)?;
    let interval = if caps.name("other").is_some() {
        2
    } else {
        match interval_capture(&caps, "n") {
            Some(n) => n,
            None => return Some(unsupported(original)),
        }
    };
    let Ok(time) = time_capture(&caps) else {
        return Some(unsupported(original));
    };
    let bound = |name: &str| -> Result<Option<Date>, ()> {
        match caps.name(name) {
            None => Ok(None),
            Some(m) => m.as_str().parse().map(Some).map_err(|_| ()),
        }
    };
    let (Ok(start), Ok(end)) = (bound("start"), bound("end")) else {
        return Some(unsupported(original));
    };
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Some(unsupported(original));
        }
    }
    if caps.name("bang").is_some() {
        // "every! N days" is Todoist's completion-anchored marker: the
        // cadence restarts from the last completion, which is exactly the
        // relative family. Calendar bounds don't compose with it.
        if start.is_some() || end.is_some() {
            return Some(unsupported(original));
        }
        return Some(RecurrencePattern::Relative(Relative {
            days: interval,
            time,
        }));
    }
    Some(RecurrencePattern::Daily(Daily {
        interval,
        filter: DayFilter::Any,
        time,
        start,
        end,
    }))
}

fn parse_weekly(norm: &str, original: &str) -> Option<RecurrencePattern> {
    if let Some(caps) = WEEKLY_EVERY.captures(norm) {
        let Some(interval) = interval_capture(&caps, "n") else {
            return Some(unsupported(original));
        };
        let Ok(time) = time_capture(&caps) else {
            return Some(unsupported(original));
        };
        return Some(RecurrencePattern::Weekly(Weekly {
            interval,
            weekdays: vec![Weekday::Monday],
            time,
        }));
    }
    let caps = WEEKLY_DAYS.captures(norm)?;
    let interval = if caps.name("other").is_some() { 2 } else { 1 };
    let Ok(time) = time_capture(&caps) else {
        return Some(unsupported(original));
    };
    let mut weekdays = vec![];
    for name in caps["days"].replace(" and ", ",").split(',') {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        // The regex only admits names from the weekday alternation.
        weekdays.push(calendar::weekday_from_name(name).unwrap());
    }
    weekdays.sort_by_key(|wd| wd.to_monday_zero_offset());
    weekdays.dedup();
    debug_assert!(!weekdays.is_empty());
    Some(RecurrencePattern::Weekly(Weekly { interval, weekdays, time }))
}

fn parse_monthly(norm: &str, original: &str) -> Option<RecurrencePattern> {
    if let Some(caps) = MONTHLY_EVERY.captures(norm) {
        let Some(interval) = interval_capture(&caps, "n") else {
            return Some(unsupported(original));
        };
        let Ok(time) = time_capture(&caps) else {
            return Some(unsupported(original));
        };
        return Some(RecurrencePattern::Monthly(Monthly {
            interval,
            days: MonthlyDays::Default,
            time,
        }));
    }
    if let Some(caps) = MONTHLY_LAST_DAY.captures(norm) {
        let Ok(time) = time_capture(&caps) else {
            return Some(unsupported(original));
        };
        return Some(RecurrencePattern::Monthly(Monthly {
            interval: 1,
            days: MonthlyDays::Last,
            time,
        }));
    }
    if let Some(caps) = MONTHLY_NTH_WEEKDAY.captures(norm) {
        let Ok(time) = time_capture(&caps) else {
            return Some(unsupported(original));
        };
        let ordinal = match &caps["ordinal"] {
            "1st" | "first" => 1,
            "2nd" | "second" => 2,
            "3rd" | "third" => 3,
            "4th" | "fourth" => 4,
            "5th" | "fifth" => 5,
            "last" => -1,
            // The regex alternation is closed.
            _ => unreachable!(),
        };
        let weekday = calendar::weekday_from_name(&caps["weekday"]).unwrap();
        return Some(RecurrencePattern::Monthly(Monthly {
            interval: 1,
            days: MonthlyDays::Nth { ordinal, weekday },
            time,
        }));
    }
    let caps = MONTHLY_DAYS.captures(norm)?;
    let Ok(time) = time_capture(&caps) else {
        return Some(unsupported(original));
    };
    let mut days = vec![];
    for piece in caps["days"].split(',') {
        let piece =
            piece.trim().trim_end_matches(|c: char| c.is_ascii_alphabetic());
        let Ok(day) = piece.parse::<i8>() else {
            return Some(unsupported(original));
        };
        if !(1..=31).contains(&day) {
            return Some(unsupported(original));
        }
        days.push(day);
    }
    days.sort_unstable();
    days.dedup();
    Some(RecurrencePattern::Monthly(Monthly {
        interval: 1,
        days: MonthlyDays::Fixed(days),
        time,
    }))
}

fn parse_yearly(norm: &str, original: &str) -> Option<RecurrencePattern> {
    if let Some(caps) = YEARLY_EVERY.captures(norm) {
        let Some(interval) = interval_capture(&caps, "n") else {
            return Some(unsupported(original));
        };
        let Ok(time) = time_capture(&caps) else {
            return Some(unsupported(original));
        };
        return Some(RecurrencePattern::Yearly(Yearly {
            interval,
            month: 1,
            day: 1,
            time,
        }));
    }
    let caps = YEARLY_MONTH_DAY.captures(norm)?;
    let Ok(time) = time_capture(&caps) else {
        return Some(unsupported(original));
    };
    // The regex alternation is closed.
    let month = calendar::month_from_name(&caps["month"]).unwrap();
    let Ok(day) = caps["day"].parse::<i8>() else {
        return Some(unsupported(original));
    };
    if !(1..=max_day_of_month(month)).contains(&day) {
        return Some(unsupported(original));
    }
    Some(RecurrencePattern::Yearly(Yearly { interval: 1, month, day, time }))
}

fn parse_relative(norm: &str, original: &str) -> Option<RecurrencePattern> {
    let caps = RELATIVE.captures(norm)?;
    let Some(days) = interval_capture(&caps, "n") else {
        return Some(unsupported(original));
    };
    let Ok(time) = time_capture(&caps) else {
        return Some(unsupported(original));
    };
    Some(RecurrencePattern::Relative(Relative { days, time }))
}

fn parse_completion(norm: &str, original: &str) -> Option<RecurrencePattern> {
    let caps = COMPLETION.captures(norm)?;
    let (Ok(required), Ok(period_days)) =
        (caps["n"].parse::<u32>(), caps["m"].parse::<u32>())
    else {
        return Some(unsupported(original));
    };
    if required < 1 || period_days < required {
        return Some(unsupported(original));
    }
    Some(RecurrencePattern::Completion(Completion { required, period_days }))
}

fn parse_holiday(norm: &str, original: &str) -> Option<RecurrencePattern> {
    let caps = HOLIDAY.captures(norm)?;
    let holiday = holiday::Holiday::lookup(caps["name"].trim())?;
    let Ok(time) = time_capture(&caps) else {
        return Some(unsupported(original));
    };
    Some(RecurrencePattern::Holiday(Holiday { holiday, time }))
}

/// The maximum day number a month can ever have. February admits 29; leap
/// handling happens at generation time by clamping.
fn max_day_of_month(month: i8) -> i8 {
    match month {
        2 => 29,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}
