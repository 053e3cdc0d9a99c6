use jiff::civil::{Date, Weekday};

use crate::calendar;

/// A named holiday from the closed lookup table.
///
/// Fixed-date holidays resolve to the same month/day every year. Floating
/// holidays (Thanksgiving, Mother's Day, and friends) are defined by an
/// ordinal-weekday rule and resolve deterministically per year; there is no
/// "unknown date" sentinel.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Holiday {
    NewYearsDay,
    MlkDay,
    ValentinesDay,
    PresidentsDay,
    StPatricksDay,
    MothersDay,
    MemorialDay,
    FathersDay,
    IndependenceDay,
    LaborDay,
    ColumbusDay,
    Halloween,
    VeteransDay,
    Thanksgiving,
    ChristmasEve,
    ChristmasDay,
    NewYearsEve,
}

impl Holiday {
    /// Look up a holiday by name.
    ///
    /// The table is closed: only the names (and aliases) below are
    /// recognized. Input must already be trimmed and lowercased, with
    /// typographic apostrophes normalized to `'`.
    pub fn lookup(name: &str) -> Option<Holiday> {
        use self::Holiday::*;

        let holiday = match name {
            "new year's day" | "new years day" | "new year" => NewYearsDay,
            "mlk day" | "martin luther king day" | "martin luther king jr day" => {
                MlkDay
            }
            "valentine's day" | "valentines day" => ValentinesDay,
            "presidents day" | "president's day" | "presidents' day" => {
                PresidentsDay
            }
            "st patrick's day" | "st patricks day" | "saint patrick's day" => {
                StPatricksDay
            }
            "mother's day" | "mothers day" => MothersDay,
            "memorial day" => MemorialDay,
            "father's day" | "fathers day" => FathersDay,
            "independence day" | "4th of july" | "fourth of july" => {
                IndependenceDay
            }
            "labor day" => LaborDay,
            "columbus day" => ColumbusDay,
            "halloween" => Halloween,
            "veterans day" | "veteran's day" => VeteransDay,
            "thanksgiving" | "thanksgiving day" => Thanksgiving,
            "christmas eve" => ChristmasEve,
            "christmas" | "christmas day" | "xmas" => ChristmasDay,
            "new year's eve" | "new years eve" => NewYearsEve,
            _ => return None,
        };
        Some(holiday)
    }

    /// The canonical display name of this holiday.
    pub fn name(self) -> &'static str {
        use self::Holiday::*;

        match self {
            NewYearsDay => "new year's day",
            MlkDay => "mlk day",
            ValentinesDay => "valentine's day",
            PresidentsDay => "presidents day",
            StPatricksDay => "st patrick's day",
            MothersDay => "mother's day",
            MemorialDay => "memorial day",
            FathersDay => "father's day",
            IndependenceDay => "independence day",
            LaborDay => "labor day",
            ColumbusDay => "columbus day",
            Halloween => "halloween",
            VeteransDay => "veterans day",
            Thanksgiving => "thanksgiving",
            ChristmasEve => "christmas eve",
            ChristmasDay => "christmas day",
            NewYearsEve => "new year's eve",
        }
    }

    /// Resolve this holiday's date in the given year.
    pub fn date(self, year: i16) -> Date {
        use self::Holiday::*;

        match self {
            NewYearsDay => jiff::civil::date(year, 1, 1),
            ValentinesDay => jiff::civil::date(year, 2, 14),
            StPatricksDay => jiff::civil::date(year, 3, 17),
            IndependenceDay => jiff::civil::date(year, 7, 4),
            Halloween => jiff::civil::date(year, 10, 31),
            VeteransDay => jiff::civil::date(year, 11, 11),
            ChristmasEve => jiff::civil::date(year, 12, 24),
            ChristmasDay => jiff::civil::date(year, 12, 25),
            NewYearsEve => jiff::civil::date(year, 12, 31),
            MlkDay => floating(year, 1, 3, Weekday::Monday),
            PresidentsDay => floating(year, 2, 3, Weekday::Monday),
            MothersDay => floating(year, 5, 2, Weekday::Sunday),
            MemorialDay => floating(year, 5, -1, Weekday::Monday),
            FathersDay => floating(year, 6, 3, Weekday::Sunday),
            LaborDay => floating(year, 9, 1, Weekday::Monday),
            ColumbusDay => floating(year, 10, 2, Weekday::Monday),
            Thanksgiving => floating(year, 11, 4, Weekday::Thursday),
        }
    }
}

fn floating(year: i16, month: i8, ordinal: i8, weekday: Weekday) -> Date {
    // Every month contains at least four occurrences of every weekday (and
    // always a last one), so the ordinals used by the table above always
    // resolve.
    calendar::nth_weekday_of_month(year, month, ordinal, weekday).unwrap()
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn lookup_aliases() {
        assert_eq!(Holiday::lookup("christmas"), Some(Holiday::ChristmasDay));
        assert_eq!(Holiday::lookup("xmas"), Some(Holiday::ChristmasDay));
        assert_eq!(
            Holiday::lookup("christmas day"),
            Some(Holiday::ChristmasDay),
        );
        assert_eq!(
            Holiday::lookup("4th of july"),
            Some(Holiday::IndependenceDay),
        );
        assert_eq!(Holiday::lookup("mothers day"), Some(Holiday::MothersDay));
        assert_eq!(Holiday::lookup("boxing day"), None);
        assert_eq!(Holiday::lookup(""), None);
    }

    #[test]
    fn fixed_dates() {
        assert_eq!(Holiday::ChristmasDay.date(2024), date(2024, 12, 25));
        assert_eq!(Holiday::ChristmasDay.date(2025), date(2025, 12, 25));
        assert_eq!(Holiday::NewYearsDay.date(2025), date(2025, 1, 1));
        assert_eq!(Holiday::Halloween.date(2025), date(2025, 10, 31));
    }

    #[test]
    fn floating_dates() {
        // 2nd Sunday of May 2025.
        assert_eq!(Holiday::MothersDay.date(2025), date(2025, 5, 11));
        // 4th Thursday of November 2025.
        assert_eq!(Holiday::Thanksgiving.date(2025), date(2025, 11, 27));
        // Last Monday of May 2025.
        assert_eq!(Holiday::MemorialDay.date(2025), date(2025, 5, 26));
        // 1st Monday of September 2025.
        assert_eq!(Holiday::LaborDay.date(2025), date(2025, 9, 1));
        // 3rd Sunday of June 2025.
        assert_eq!(Holiday::FathersDay.date(2025), date(2025, 6, 15));
    }
}
