//! Bundled Chilean holiday table — the offline fallback when the remote
//! calendar API is unreachable.
//!
//! TODO: extend with the 2026 calendar once the official list is published.

use chrono::NaiveDate;

/// One holiday entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holiday {
    pub date: NaiveDate,
    pub title: String,
    /// "Civil" or "Religioso".
    pub kind: String,
}

/// Chile, 2025. (date, title, kind)
pub const CHILE_HOLIDAYS_2025: &[(&str, &str, &str)] = &[
    ("2025-01-01", "Año Nuevo", "Civil"),
    ("2025-04-18", "Viernes Santo", "Religioso"),
    ("2025-04-19", "Sábado Santo", "Religioso"),
    ("2025-05-01", "Día Nacional del Trabajo", "Civil"),
    ("2025-05-21", "Día de las Glorias Navales", "Civil"),
    ("2025-06-29", "San Pedro y San Pablo", "Religioso"),
    ("2025-07-16", "Día de la Virgen del Carmen", "Religioso"),
    ("2025-08-15", "Asunción de la Virgen", "Religioso"),
    ("2025-09-18", "Independencia Nacional", "Civil"),
    ("2025-09-19", "Día de las Glorias del Ejército", "Civil"),
    ("2025-12-08", "Inmaculada Concepción", "Religioso"),
    ("2025-12-25", "Navidad", "Religioso"),
];

/// Look `date` up in the bundled table.
pub fn lookup(date: NaiveDate) -> Option<Holiday> {
    let wanted = date.format("%Y-%m-%d").to_string();
    CHILE_HOLIDAYS_2025
        .iter()
        .find(|(d, _, _)| *d == wanted)
        .map(|(_, title, kind)| Holiday {
            date,
            title: (*title).to_string(),
            kind: (*kind).to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_independence_day_is_listed() {
        let holiday = lookup(date("2025-09-18")).unwrap();
        assert_eq!(holiday.title, "Independencia Nacional");
        assert_eq!(holiday.kind, "Civil");
    }

    #[test]
    fn test_day_before_is_not_listed() {
        assert!(lookup(date("2025-09-17")).is_none());
    }

    #[test]
    fn test_all_entries_parse_as_dates() {
        for (d, _, _) in CHILE_HOLIDAYS_2025 {
            assert!(NaiveDate::parse_from_str(d, "%Y-%m-%d").is_ok(), "bad date: {d}");
        }
    }
}
