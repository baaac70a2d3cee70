//! Account domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// The name of a bank account.
///
/// Account names are unique across the app so that transactions and
/// dashboard summaries can refer to them unambiguously.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountName(String);

impl AccountName {
    /// Create an account name.
    ///
    /// # Errors
    /// Returns [`Error::EmptyAccountName`] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyAccountName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create an account name without checking that it is non-empty.
    ///
    /// This should only be used when parsing names from a trusted source
    /// such as the application database.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for AccountName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountName {
    type Err = Error;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        Self::new(string)
    }
}

impl Display for AccountName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Alias for account row IDs.
pub type AccountId = i64;

/// A bank account belonging to the family.
///
/// The balance is a signed amount so overdrawn accounts show up as
/// negative on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The ID of the account.
    pub id: AccountId,
    /// The display name of the account.
    pub name: AccountName,
    /// The bank or institution holding the account.
    pub institution: String,
    /// The current balance of the account.
    pub balance: f64,
    /// An optional accent colour for rendering the account.
    pub color: Option<String>,
}

/// The data for creating or updating an account, parsed from a form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountFormData {
    /// The display name of the account.
    pub name: String,
    /// The bank or institution holding the account.
    pub institution: String,
    /// The current balance of the account.
    pub balance: f64,
    /// An optional accent colour, empty when unset.
    #[serde(default)]
    pub color: String,
}
