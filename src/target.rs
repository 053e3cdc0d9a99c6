use jiff::{
    ToSpan,
    civil::{Date, DateTime},
};

use crate::{
    calendar::{self, DateRange},
    pattern::{self, DayFilter, MonthlyDays, RecurrencePattern},
    timeofday::{self, TimeOfDay, TimeWindow},
};

/// One expected occurrence of a recurring task inside an analysis window.
///
/// Targets are ephemeral: they are regenerated on every call and never
/// shared between calculations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Target {
    /// The instant by which a completion is due. For date-only targets this
    /// is the last instant of the allowed day (or period); for fixed-time
    /// targets it is the clock instant itself.
    pub date: DateTime,
    /// The interval of instants in which a completion counts.
    pub window: TimeWindow,
    pub kind: TargetKind,
}

/// Family-specific target metadata.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TargetKind {
    /// A calendar-scheduled occurrence (daily, weekly, monthly, yearly,
    /// holiday).
    Scheduled,
    /// A completion-anchored occurrence: only completions after the anchor
    /// count.
    Anchored { anchor: DateTime },
    /// A quota bucket: `completed` of the `required` completions actually
    /// fell inside the bucket's window.
    Quota { required: u32, completed: u32 },
}

/// Generate the expected occurrences for `pattern` inside `range`,
/// newest first.
///
/// `completions` feeds the completion-anchored and quota families; the
/// calendar families ignore it. `now` resolves the day-of-month for
/// "every month" with no explicit day, and bounds completion-anchored
/// targets that haven't come due yet. An `Unsupported` pattern generates
/// nothing.
pub fn generate(
    pattern: &RecurrencePattern,
    completions: &[DateTime],
    range: &DateRange,
    now: DateTime,
) -> Vec<Target> {
    let targets = match *pattern {
        RecurrencePattern::Daily(ref p) => daily(p, range),
        RecurrencePattern::Weekly(ref p) => weekly(p, range),
        RecurrencePattern::Monthly(ref p) => monthly(p, range, now),
        RecurrencePattern::Yearly(ref p) => yearly(p, range),
        RecurrencePattern::Relative(ref p) => {
            relative(p, completions, range, now)
        }
        RecurrencePattern::Completion(ref p) => quota(p, completions, range),
        RecurrencePattern::Holiday(ref p) => holidays(p, range),
        RecurrencePattern::Unsupported(_) => vec![],
    };
    // Newest-first ordering is what the streak walk relies on.
    debug_assert!(targets.windows(2).all(|w| w[0].date >= w[1].date));
    log::debug!(
        "generated {count} targets in {start}..={end}",
        count = targets.len(),
        start = range.start(),
        end = range.end(),
    );
    targets
}

/// Build a calendar-scheduled target on `date`, with the allowed window
/// narrowed by `time` when present.
fn scheduled(date: Date, time: Option<&TimeOfDay>) -> Target {
    let (due, window) = due_and_window(date, time);
    Target { date: due, window, kind: TargetKind::Scheduled }
}

fn due_and_window(
    date: Date,
    time: Option<&TimeOfDay>,
) -> (DateTime, TimeWindow) {
    match time {
        None => (timeofday::end_of_day(date), TimeWindow::day(date)),
        Some(tod) => (tod.due_instant(date), tod.window(date)),
    }
}

fn daily(p: &pattern::Daily, range: &DateRange) -> Vec<Target> {
    let end = p.end.map_or(range.end(), |e| e.min(range.end()));
    let start = p.start.map_or(range.start(), |s| s.max(range.start()));
    if start > end {
        return vec![];
    }
    // A day filter walks day-by-day and picks matching days; a plain daily
    // pattern strides by its interval, with the phase anchored at the end
    // of the window.
    let step = match p.filter {
        DayFilter::Any => p.interval,
        DayFilter::Workday | DayFilter::Weekend => 1,
    };
    let mut targets = vec![];
    let mut cur = end;
    loop {
        let keep = match p.filter {
            DayFilter::Any => true,
            DayFilter::Workday => calendar::is_workday(cur),
            DayFilter::Weekend => calendar::is_weekend(cur),
        };
        if keep {
            targets.push(scheduled(cur, p.time.as_ref()));
        }
        match calendar::back(cur, step) {
            Some(prev) if prev >= start => cur = prev,
            _ => break,
        }
    }
    targets
}

fn weekly(p: &pattern::Weekly, range: &DateRange) -> Vec<Target> {
    // The phase anchor is the most recent date at/before the end of the
    // window whose weekday is in the set. For interval > 1, only weeks a
    // whole multiple of the interval away from the anchor's week are kept;
    // anchoring to the window end instead of counting per-occurrence is
    // what prevents cadence drift for biweekly+ patterns.
    let mut anchor = range.end();
    for _ in 0..7 {
        if p.weekdays.contains(&anchor.weekday()) {
            break;
        }
        match calendar::back(anchor, 1) {
            Some(prev) => anchor = prev,
            None => return vec![],
        }
    }
    if anchor < range.start() || !p.weekdays.contains(&anchor.weekday()) {
        return vec![];
    }
    let Some(anchor_week) = calendar::week_start(anchor) else {
        return vec![];
    };
    let mut targets = vec![];
    let mut week = anchor_week;
    loop {
        let keep = match calendar::weeks_between(week, anchor_week) {
            Some(dist) => dist % p.interval == 0,
            None => false,
        };
        if keep {
            for weekday in p.weekdays.iter().rev() {
                let offset = i32::from(weekday.to_monday_zero_offset());
                let Ok(date) = week.checked_add(offset.days()) else {
                    continue;
                };
                if range.contains(date) {
                    targets.push(scheduled(date, p.time.as_ref()));
                }
            }
        }
        let Some(prev) = calendar::back(week, 7) else { break };
        let Ok(prev_end) = prev.checked_add(6.days()) else { break };
        if prev_end < range.start() {
            break;
        }
        week = prev;
    }
    targets
}

fn monthly(
    p: &pattern::Monthly,
    range: &DateRange,
    now: DateTime,
) -> Vec<Target> {
    let mut targets = vec![];
    for (year, month) in
        calendar::months_back(range.end(), range.start(), p.interval)
    {
        match p.days {
            MonthlyDays::Default => {
                // No explicit day: anchor on the reference day-of-month,
                // clamped like any other monthly day.
                let date = calendar::clamp_day(year, month, now.date().day());
                if range.contains(date) {
                    targets.push(scheduled(date, p.time.as_ref()));
                }
            }
            MonthlyDays::Fixed(ref days) => {
                let mut last_pushed = None;
                for &day in days.iter().rev() {
                    let date = calendar::clamp_day(year, month, day);
                    // Clamping can collapse distinct configured days (the
                    // 29th and 31st both land on Feb 28); emit one target.
                    if last_pushed == Some(date) {
                        continue;
                    }
                    if range.contains(date) {
                        targets.push(scheduled(date, p.time.as_ref()));
                        last_pushed = Some(date);
                    }
                }
            }
            MonthlyDays::Last => {
                let date = jiff::civil::date(year, month, 1).last_of_month();
                if range.contains(date) {
                    targets.push(scheduled(date, p.time.as_ref()));
                }
            }
            MonthlyDays::Nth { ordinal, weekday } => {
                let Some(date) =
                    calendar::nth_weekday_of_month(year, month, ordinal, weekday)
                else {
                    // No fifth such weekday this month.
                    continue;
                };
                if range.contains(date) {
                    targets.push(scheduled(date, p.time.as_ref()));
                }
            }
        }
    }
    targets
}

fn yearly(p: &pattern::Yearly, range: &DateRange) -> Vec<Target> {
    let mut targets = vec![];
    let start_year = i32::from(range.start().year());
    let mut year = i32::from(range.end().year());
    while year >= start_year {
        // Years walked down from a valid date always fit back in an i16.
        let date =
            calendar::clamp_day(year as i16, p.month, p.day);
        if range.contains(date) {
            targets.push(scheduled(date, p.time.as_ref()));
        }
        year -= p.interval;
    }
    targets
}

fn holidays(p: &pattern::Holiday, range: &DateRange) -> Vec<Target> {
    let mut targets = vec![];
    for year in (range.start().year()..=range.end().year()).rev() {
        let date = p.holiday.date(year);
        if range.contains(date) {
            targets.push(scheduled(date, p.time.as_ref()));
        }
    }
    targets
}

fn relative(
    p: &pattern::Relative,
    completions: &[DateTime],
    range: &DateRange,
    now: DateTime,
) -> Vec<Target> {
    let mut anchors = completions.to_vec();
    anchors.sort();
    let mut targets = vec![];
    for &anchor in anchors.iter().rev() {
        let Ok(due) = anchor.checked_add(p.days.days()) else { continue };
        let date = due.date();
        // A projected target the task hasn't reached yet isn't an
        // expectation to hold the streak against.
        if date > now.date() || !range.contains(date) {
            continue;
        }
        let (due, window) = due_and_window(date, p.time.as_ref());
        targets.push(Target {
            date: due,
            window,
            kind: TargetKind::Anchored { anchor },
        });
    }
    targets
}

fn quota(
    p: &pattern::Completion,
    completions: &[DateTime],
    range: &DateRange,
) -> Vec<Target> {
    if i64::from(p.period_days) > i64::from(range.len_days()) {
        return vec![];
    }
    let period = p.period_days as i32;
    let mut sorted = completions.to_vec();
    sorted.sort();
    let mut targets = vec![];
    let mut bucket_end = range.end();
    loop {
        let Some(bucket_start) = calendar::back(bucket_end, period - 1)
        else {
            break;
        };
        // Only whole buckets count; a trailing fragment at the start of
        // the window is dropped rather than evaluated short.
        if bucket_start < range.start() {
            break;
        }
        let window = TimeWindow {
            start: timeofday::start_of_day(bucket_start),
            end: timeofday::end_of_day(bucket_end),
        };
        let completed = count_in_window(&sorted, &window);
        targets.push(Target {
            date: window.end,
            window,
            kind: TargetKind::Quota { required: p.required, completed },
        });
        match calendar::back(bucket_start, 1) {
            Some(prev) => bucket_end = prev,
            None => break,
        }
    }
    targets
}

/// Count completions inside `window`. `sorted` must be ascending.
fn count_in_window(sorted: &[DateTime], window: &TimeWindow) -> u32 {
    let lo = sorted.partition_point(|&c| c < window.start);
    let hi = sorted.partition_point(|&c| c <= window.end);
    (hi - lo) as u32
}
