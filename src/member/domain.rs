//! Core family member domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, forms::empty_as_none};

/// A validated, non-empty member name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct MemberName(String);

impl MemberName {
    /// Create a member name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyMemberName] if `name` is an empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyMemberName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a member name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for MemberName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for MemberName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MemberName::new(s)
    }
}

impl Display for MemberName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for a family member.
pub type MemberId = i64;

/// A member of the household whose income and spending are tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: MemberName,
    /// A free-text label such as "Parent" or "Child".
    pub role: String,
    /// A URL or path to the member's avatar image.
    pub avatar: Option<String>,
    /// The member's estimated monthly income in dollars, if known.
    pub monthly_income: Option<f64>,
}

/// Form data for member creation and editing.
#[derive(Debug, Serialize, Deserialize)]
pub struct MemberFormData {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub monthly_income: Option<f64>,
}
