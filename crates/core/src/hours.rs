//! Weekly opening hours with a fixed set of seven weekday keys.
//!
//! The backend stores hours as a free-text map keyed by short weekday name
//! (`Mon` .. `Sun`). Records written by older app versions may be missing
//! keys; a missing key always reads as [`CLOSED`].

use core::fmt;
use std::collections::BTreeMap;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Sentinel value meaning "no hours for this day".
pub const CLOSED: &str = "CLOSED";

/// Day of the week, in the order the app displays them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    /// All seven days, Monday first.
    pub const ALL: [Self; 7] = [
        Self::Mon,
        Self::Tue,
        Self::Wed,
        Self::Thu,
        Self::Fri,
        Self::Sat,
        Self::Sun,
    ];

    /// The short name used as the document key.
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Mon => "Mon",
            Self::Tue => "Tue",
            Self::Wed => "Wed",
            Self::Thu => "Thu",
            Self::Fri => "Fri",
            Self::Sat => "Sat",
            Self::Sun => "Sun",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl std::str::FromStr for Weekday {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Mon" | "mon" => Ok(Self::Mon),
            "Tue" | "tue" => Ok(Self::Tue),
            "Wed" | "wed" => Ok(Self::Wed),
            "Thu" | "thu" => Ok(Self::Thu),
            "Fri" | "fri" => Ok(Self::Fri),
            "Sat" | "sat" => Ok(Self::Sat),
            "Sun" | "sun" => Ok(Self::Sun),
            _ => Err(format!("invalid weekday: {s}")),
        }
    }
}

/// Opening hours for a full week.
///
/// Always exposes exactly seven entries regardless of what the stored
/// record contains. The value for each day is free text (e.g. `9AM-6PM`);
/// [`CLOSED`] is the sentinel for no hours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekHours {
    slots: [String; 7],
}

impl WeekHours {
    /// A week with every day closed.
    #[must_use]
    pub fn closed() -> Self {
        Self::default()
    }

    /// The hours text for a day.
    #[must_use]
    pub fn get(&self, day: Weekday) -> &str {
        &self.slots[day.index()]
    }

    /// Set the hours text for a day. Empty input reads as [`CLOSED`].
    pub fn set(&mut self, day: Weekday, value: impl Into<String>) {
        let value = value.into();
        self.slots[day.index()] = if value.trim().is_empty() {
            CLOSED.to_owned()
        } else {
            value
        };
    }

    /// Whether the restaurant has hours listed for a day.
    #[must_use]
    pub fn is_open(&self, day: Weekday) -> bool {
        self.get(day) != CLOSED
    }

    /// Iterate days with their hours, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &str)> {
        Weekday::ALL.iter().map(|&day| (day, self.get(day)))
    }
}

impl Default for WeekHours {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| CLOSED.to_owned()),
        }
    }
}

impl Serialize for WeekHours {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(7))?;
        for (day, value) in self.iter() {
            map.serialize_entry(day.short_name(), value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for WeekHours {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HoursVisitor;

        impl<'de> Visitor<'de> for HoursVisitor {
            type Value = WeekHours;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of weekday names to hours text")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut hours = WeekHours::closed();
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    // Unknown keys are ignored rather than rejected; the
                    // backend record is not under this client's control.
                    if let Ok(day) = key.parse::<Weekday>() {
                        hours.set(day, value);
                    }
                }
                Ok(hours)
            }
        }

        deserializer.deserialize_map(HoursVisitor)
    }
}

impl From<&WeekHours> for BTreeMap<String, String> {
    fn from(hours: &WeekHours) -> Self {
        hours
            .iter()
            .map(|(day, value)| (day.short_name().to_owned(), value.to_owned()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_all_closed() {
        let hours = WeekHours::closed();
        for day in Weekday::ALL {
            assert_eq!(hours.get(day), CLOSED);
            assert!(!hours.is_open(day));
        }
    }

    #[test]
    fn test_set_and_get() {
        let mut hours = WeekHours::closed();
        hours.set(Weekday::Fri, "11AM-10PM");
        assert_eq!(hours.get(Weekday::Fri), "11AM-10PM");
        assert!(hours.is_open(Weekday::Fri));
        assert_eq!(hours.get(Weekday::Sat), CLOSED);
    }

    #[test]
    fn test_empty_value_reads_closed() {
        let mut hours = WeekHours::closed();
        hours.set(Weekday::Mon, "  ");
        assert_eq!(hours.get(Weekday::Mon), CLOSED);
    }

    #[test]
    fn test_deserialize_partial_record_defaults_missing_days() {
        let json = r#"{"Mon": "9AM-5PM", "Wed": "9AM-5PM"}"#;
        let hours: WeekHours = serde_json::from_str(json).expect("deserialize");
        assert_eq!(hours.get(Weekday::Mon), "9AM-5PM");
        assert_eq!(hours.get(Weekday::Tue), CLOSED);
        assert_eq!(hours.get(Weekday::Sun), CLOSED);
        assert_eq!(hours.iter().count(), 7);
    }

    #[test]
    fn test_deserialize_ignores_unknown_keys() {
        let json = r#"{"Mon": "8AM-2PM", "Holiday": "CLOSED"}"#;
        let hours: WeekHours = serde_json::from_str(json).expect("deserialize");
        assert_eq!(hours.get(Weekday::Mon), "8AM-2PM");
    }

    #[test]
    fn test_serialize_always_emits_seven_keys() {
        let hours = WeekHours::closed();
        let value = serde_json::to_value(&hours).expect("serialize");
        let map = value.as_object().expect("object");
        assert_eq!(map.len(), 7);
        assert_eq!(map.get("Sun").and_then(|v| v.as_str()), Some(CLOSED));
    }
}
