/*!
A recurrence pattern and streak engine for recurring-task analytics.

This crate takes a free-text recurrence description attached to a recurring
task (e.g. `every monday`, `every 3 months`, `2 times every 3 days`,
`every christmas day`), parses it into a typed
[`RecurrencePattern`](pattern::RecurrencePattern), projects that pattern
into a newest-first sequence of expected [`Target`](target::Target)
occurrences over a bounded analysis window, and compares those expectations
against the task's actual completion timestamps to produce a
[`StreakResult`](streak::StreakResult): current streak, longest streak,
next-due instant and overdue status.

The engine is deliberately boring about state: every stage is a
deterministic pure function of its inputs. Nothing is cached, nothing is
persisted, and "now" is an explicit parameter rather than a clock read, so
identical inputs always produce identical output. Unparseable pattern text
is data, not an error — it resolves to an `Unsupported` pattern and a zero
streak, never a panic or an `Err`.

All calendar arithmetic is civil-time via [`jiff`]; converting instants
into the task owner's local calendar is the caller's concern.

# Example

```
use jiff::civil::date;
use streakline::{DateRange, compute_streak};

let range = DateRange::new(date(2025, 8, 1), date(2025, 8, 7))?;
let completions = vec![
    date(2025, 8, 6).at(9, 0, 0, 0),
    date(2025, 8, 7).at(9, 0, 0, 0),
];
let result = compute_streak(
    "every day",
    &completions,
    &range,
    date(2025, 8, 7).at(12, 0, 0, 0),
);
assert_eq!(result.current, 2);
assert!(!result.overdue);
# Ok::<(), anyhow::Error>(())
```

For a dashboard full of tasks, [`batch::compute_all`] fans the same
computation out over a fixed pool of worker threads; each task is
independent, so no locking is involved.
*/

use jiff::civil::DateTime;

pub mod batch;
pub mod calendar;
pub mod holiday;
pub mod pattern;
pub mod streak;
pub mod target;
pub mod timeofday;

pub use crate::{
    calendar::DateRange,
    pattern::{Family, RecurrencePattern, classify},
    streak::StreakResult,
    target::{Target, TargetKind},
    timeofday::{Period, TimeOfDay, TimeWindow},
};

/// Parse `text` and compute the streak for one task in a single call.
///
/// This is the all-in-one entry point; callers that cache the parsed
/// pattern across invocations can use [`RecurrencePattern::parse`] and
/// [`streak::compute`] directly.
pub fn compute_streak(
    text: &str,
    completions: &[DateTime],
    range: &DateRange,
    now: DateTime,
) -> StreakResult {
    let pattern = RecurrencePattern::parse(text);
    streak::compute(&pattern, completions, range, now)
}
