//!  Bookproof Booking Agent
//!
//!  Copyright (C) 2026  The Bookproof Authors
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! # Primary-Action Click Outcome
//!
//! Parses the result of the in-page click heuristic. The automation server
//! wraps evaluate results in free-form text, so the outcome token is
//! extracted by pattern search rather than deserialized.

use once_cell::sync::Lazy;
use regex::Regex;

// 'clicked-next' before 'clicked': alternation is leftmost-first.
static OUTCOME_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"clicked-next|clicked|not-found").expect("valid outcome pattern"));

/// Outcome of one primary-action click attempt.
///
/// `NotFound` is a normal result, not an error: some page variants have no
/// advance button at a given step and the flow proceeds regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A reserve/book control was clicked.
    Clicked,
    /// Fallback: a continue/next control was clicked.
    ClickedNext,
    /// Neither pattern matched anything clickable.
    NotFound,
}

impl ClickOutcome {
    /// Extract the outcome token from raw tool output. Output with no
    /// recognizable token is treated as `NotFound`, the conservative
    /// reading, since nothing confirmed a click happened.
    pub fn from_raw(raw: Option<&str>) -> Self {
        let Some(text) = raw else {
            return Self::NotFound;
        };
        match OUTCOME_TOKEN.find(text).map(|m| m.as_str()) {
            Some("clicked") => Self::Clicked,
            Some("clicked-next") => Self::ClickedNext,
            _ => Self::NotFound,
        }
    }

    pub fn is_click(self) -> bool {
        matches!(self, Self::Clicked | Self::ClickedNext)
    }
}

impl std::fmt::Display for ClickOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Clicked => write!(f, "clicked"),
            Self::ClickedNext => write!(f, "clicked-next"),
            Self::NotFound => write!(f, "not-found"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_tokens_parse() {
        assert_eq!(ClickOutcome::from_raw(Some("clicked")), ClickOutcome::Clicked);
        assert_eq!(
            ClickOutcome::from_raw(Some("clicked-next")),
            ClickOutcome::ClickedNext
        );
        assert_eq!(
            ClickOutcome::from_raw(Some("not-found")),
            ClickOutcome::NotFound
        );
    }

    #[test]
    fn token_is_found_inside_wrapped_tool_output() {
        let wrapped = "Executed JavaScript successfully. Result: \"clicked-next\"";
        assert_eq!(ClickOutcome::from_raw(Some(wrapped)), ClickOutcome::ClickedNext);
    }

    #[test]
    fn missing_or_garbage_output_reads_as_not_found() {
        assert_eq!(ClickOutcome::from_raw(None), ClickOutcome::NotFound);
        assert_eq!(
            ClickOutcome::from_raw(Some("unexpected payload")),
            ClickOutcome::NotFound
        );
        assert!(!ClickOutcome::NotFound.is_click());
    }
}
