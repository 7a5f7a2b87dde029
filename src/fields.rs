//! Enumerations and field types for sticky-note tasks.
//!
//! Priority is stored as a small integer (1 is the most important) and sets
//! the star rating shown on each card.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Task importance, highest first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(into = "u8", try_from = "u8")]
pub enum Priority {
    #[value(name = "1", alias = "highest")]
    Highest,
    #[value(name = "2", alias = "high")]
    High,
    #[value(name = "3", alias = "medium")]
    Medium,
    #[value(name = "4", alias = "low")]
    Low,
}

impl Priority {
    /// All priorities in form order.
    pub const ALL: [Priority; 4] = [Priority::Highest, Priority::High, Priority::Medium, Priority::Low];

    /// Numeric level as persisted, 1 through 4.
    pub fn level(self) -> u8 {
        match self {
            Priority::Highest => 1,
            Priority::High => 2,
            Priority::Medium => 3,
            Priority::Low => 4,
        }
    }

    /// Exact conversion from a persisted level.
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Priority::Highest),
            2 => Some(Priority::High),
            3 => Some(Priority::Medium),
            4 => Some(Priority::Low),
            _ => None,
        }
    }

    /// Lenient conversion used when reading older or hand-edited records.
    /// Values outside 1..=4 snap to the nearest end of the range.
    pub fn from_level_lenient(level: i64) -> Self {
        match level {
            i64::MIN..=1 => Priority::Highest,
            2 => Priority::High,
            3 => Priority::Medium,
            _ => Priority::Low,
        }
    }

    /// Number of stars on the card: three for the highest priority, none for the lowest.
    pub fn star_count(self) -> usize {
        4 - self.level() as usize
    }

    pub fn stars(self) -> String {
        "★".repeat(self.star_count())
    }

    /// Label shown in the priority selector.
    pub fn label(self) -> &'static str {
        match self {
            Priority::Highest => "3 (highest)",
            Priority::High => "2 (high)",
            Priority::Medium => "1 (medium)",
            Priority::Low => "0 (low)",
        }
    }

    fn index(self) -> usize {
        self.level() as usize - 1
    }

    /// Next entry in the selector, wrapping around.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous entry in the selector, wrapping around.
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::High
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> u8 {
        p.level()
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Priority::from_level(level).ok_or_else(|| format!("priority must be between 1 and 4, got {level}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Priority::Highest, 3)]
    #[case(Priority::High, 2)]
    #[case(Priority::Medium, 1)]
    #[case(Priority::Low, 0)]
    fn stars_count_down_with_priority(#[case] p: Priority, #[case] stars: usize) {
        assert_eq!(p.star_count(), stars);
        assert_eq!(p.stars().chars().count(), stars);
    }

    #[test]
    fn all_is_in_level_order() {
        let levels: Vec<u8> = Priority::ALL.iter().map(|p| p.level()).collect();
        assert_eq!(levels, [1, 2, 3, 4]);
    }

    #[test]
    fn selector_cycles_both_ways() {
        assert_eq!(Priority::Low.next(), Priority::Highest);
        assert_eq!(Priority::Highest.prev(), Priority::Low);
        assert_eq!(Priority::High.next(), Priority::Medium);
        assert_eq!(Priority::Medium.prev(), Priority::High);
    }

    #[test]
    fn lenient_level_snaps_into_range() {
        assert_eq!(Priority::from_level_lenient(0), Priority::Highest);
        assert_eq!(Priority::from_level_lenient(9), Priority::Low);
        assert_eq!(Priority::from_level_lenient(3), Priority::Medium);
    }

    #[test]
    fn serializes_as_bare_integer() {
        assert_eq!(serde_json::to_string(&Priority::Medium).unwrap(), "3");
        assert!(serde_json::from_str::<Priority>("7").is_err());
    }
}
