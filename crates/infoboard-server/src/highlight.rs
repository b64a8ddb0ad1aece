//! Highlight rules.
//!
//! A rule either marks every event of one source or marks events whose text
//! matches a case-insensitive regular expression. Rules only ever set the
//! flag; nothing clears it again.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use regex::{Regex, RegexBuilder};

use infoboard_core::Event;

use crate::error::{ServerError, ServerResult};

/// Which event fields a pattern rule looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchFields {
    pub name: bool,
    pub description: bool,
    pub location: bool,
}

impl SearchFields {
    pub const NAME: Self = Self {
        name: true,
        description: false,
        location: false,
    };
    pub const DESCRIPTION: Self = Self {
        name: false,
        description: true,
        location: false,
    };
    pub const LOCATION: Self = Self {
        name: false,
        description: false,
        location: true,
    };
    pub const ALL: Self = Self {
        name: true,
        description: true,
        location: true,
    };

    pub fn is_empty(&self) -> bool {
        !(self.name || self.description || self.location)
    }
}

impl BitOr for SearchFields {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            name: self.name || rhs.name,
            description: self.description || rhs.description,
            location: self.location || rhs.location,
        }
    }
}

impl FromStr for SearchFields {
    type Err = ServerError;

    /// Accepts `name`, `description`, `location` and `all`, or a
    /// comma-separated combination such as `name,location`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = Self::default();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            fields = fields
                | match part.to_ascii_lowercase().as_str() {
                    "name" => Self::NAME,
                    "description" => Self::DESCRIPTION,
                    "location" => Self::LOCATION,
                    "all" => Self::ALL,
                    other => {
                        return Err(ServerError::config(format!(
                            "unknown highlight field {other:?}"
                        )));
                    }
                };
        }

        if fields.is_empty() {
            return Err(ServerError::config("highlight rule selects no fields"));
        }
        Ok(fields)
    }
}

impl fmt::Display for SearchFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::ALL {
            return f.write_str("all");
        }
        let names: Vec<&str> = [
            (self.name, "name"),
            (self.description, "description"),
            (self.location, "location"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect();
        f.write_str(&names.join(","))
    }
}

/// A rule that sets [`Event::is_highlighted`].
#[derive(Debug, Clone)]
pub enum HighlightRule {
    /// Every event of the source registered at `index`.
    Source { index: usize },
    /// Events whose selected fields match `regex`.
    Pattern { fields: SearchFields, regex: Regex },
}

impl HighlightRule {
    pub fn source(index: usize) -> Self {
        Self::Source { index }
    }

    /// Compiles a case-insensitive pattern rule.
    pub fn pattern(pattern: &str, fields: SearchFields) -> ServerResult<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| ServerError::config(format!("invalid highlight pattern: {e}")))?;
        Ok(Self::Pattern { fields, regex })
    }

    /// Returns true if this is a source rule for `index`.
    pub fn targets_source(&self, index: usize) -> bool {
        matches!(self, Self::Source { index: i } if *i == index)
    }

    /// Returns true if this is a pattern rule matching `event`.
    pub fn matches(&self, event: &Event) -> bool {
        let Self::Pattern { fields, regex } = self else {
            return false;
        };

        (fields.name && regex.is_match(event.name()))
            || (fields.description && event.description().is_some_and(|d| regex.is_match(d)))
            || (fields.location && event.location().is_some_and(|l| regex.is_match(l)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn event(name: &str) -> Event {
        let start = NaiveDate::from_ymd_opt(2025, 3, 4)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Event::new(name, start, start + chrono::Duration::hours(1)).unwrap()
    }

    #[test]
    fn parse_fields() {
        assert_eq!("name".parse::<SearchFields>().unwrap(), SearchFields::NAME);
        assert_eq!("ALL".parse::<SearchFields>().unwrap(), SearchFields::ALL);
        assert_eq!(
            "name, location".parse::<SearchFields>().unwrap(),
            SearchFields::NAME | SearchFields::LOCATION
        );
        assert!("room".parse::<SearchFields>().is_err());
        assert!("".parse::<SearchFields>().is_err());
    }

    #[test]
    fn display_fields() {
        assert_eq!(SearchFields::ALL.to_string(), "all");
        assert_eq!(
            (SearchFields::NAME | SearchFields::LOCATION).to_string(),
            "name,location"
        );
    }

    #[test]
    fn pattern_is_case_insensitive() {
        let rule = HighlightRule::pattern("exam", SearchFields::NAME).unwrap();
        assert!(rule.matches(&event("Final EXAM")));
        assert!(!rule.matches(&event("Lecture")));
    }

    #[test]
    fn pattern_only_checks_selected_fields() {
        let e = event("Lecture").with_location("Exam hall").with_description("bring id");

        let by_name = HighlightRule::pattern("exam", SearchFields::NAME).unwrap();
        assert!(!by_name.matches(&e));

        let by_location = HighlightRule::pattern("exam", SearchFields::LOCATION).unwrap();
        assert!(by_location.matches(&e));

        let by_description = HighlightRule::pattern("^bring", SearchFields::DESCRIPTION).unwrap();
        assert!(by_description.matches(&e));
    }

    #[test]
    fn missing_optional_fields_never_match() {
        let rule = HighlightRule::pattern(".*", SearchFields::LOCATION).unwrap();
        assert!(!rule.matches(&event("Lecture")));
    }

    #[test]
    fn source_rules() {
        let rule = HighlightRule::source(1);
        assert!(rule.targets_source(1));
        assert!(!rule.targets_source(0));
        assert!(!rule.matches(&event("anything")));
    }

    #[test]
    fn invalid_pattern() {
        assert!(matches!(
            HighlightRule::pattern("(", SearchFields::ALL),
            Err(ServerError::Config { .. })
        ));
    }
}
