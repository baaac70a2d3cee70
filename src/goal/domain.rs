//! Savings goal domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::Error;

/// The name of a savings goal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoalName(String);

impl GoalName {
    /// Create a goal name.
    ///
    /// # Errors
    /// Returns [`Error::EmptyGoalName`] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyGoalName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a goal name without checking that it is non-empty.
    ///
    /// This should only be used when parsing names from a trusted source
    /// such as the application database.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for GoalName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for GoalName {
    type Err = Error;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        Self::new(string)
    }
}

impl Display for GoalName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Alias for goal row IDs.
pub type GoalId = i64;

/// A savings goal the family is working towards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// The ID of the goal.
    pub id: GoalId,
    /// The name of the goal.
    pub name: GoalName,
    /// The amount being saved towards.
    pub target: f64,
    /// The amount saved so far.
    pub saved: f64,
    /// The date the goal should be reached by.
    pub deadline: Date,
    /// A free text label grouping the goal, e.g. "travel".
    pub category: String,
    /// An optional image to show alongside the goal.
    pub image: Option<String>,
}

impl Goal {
    /// The fraction of the target saved so far.
    ///
    /// The fraction is not clamped, so an overfunded goal reports more
    /// than one. Goals with no target report zero. Callers clamp for
    /// display.
    pub fn progress_fraction(&self) -> f64 {
        if self.target <= 0.0 {
            0.0
        } else {
            self.saved / self.target
        }
    }
}

/// The data for creating or updating a goal, parsed from a form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GoalFormData {
    /// The name of the goal.
    pub name: String,
    /// The amount being saved towards.
    pub target: f64,
    /// The amount saved so far.
    pub saved: f64,
    /// The date the goal should be reached by.
    pub deadline: Date,
    /// A free text label grouping the goal, empty when unset.
    #[serde(default)]
    pub category: String,
    /// An optional image reference, empty when unset.
    #[serde(default)]
    pub image: String,
}

#[cfg(test)]
mod goal_domain_tests {
    use time::macros::date;

    use crate::goal::{Goal, GoalName};

    fn test_goal(target: f64, saved: f64) -> Goal {
        Goal {
            id: 1,
            name: GoalName::new_unchecked("Japan Trip"),
            target,
            saved,
            deadline: date!(2026 - 12 - 31),
            category: "travel".to_string(),
            image: None,
        }
    }

    #[test]
    fn progress_fraction_is_unclamped() {
        assert_eq!(test_goal(1_000.0, 1_500.0).progress_fraction(), 1.5);
    }

    #[test]
    fn progress_fraction_is_zero_without_target() {
        assert_eq!(test_goal(0.0, 500.0).progress_fraction(), 0.0);
    }

    #[test]
    fn progress_fraction_of_partial_goal() {
        assert_eq!(test_goal(2_000.0, 500.0).progress_fraction(), 0.25);
    }
}
