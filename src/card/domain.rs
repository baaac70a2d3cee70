//! Credit card domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// The display name of a credit card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardName(String);

impl CardName {
    /// Create a card name.
    ///
    /// # Errors
    /// Returns [`Error::EmptyCardName`] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCardName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a card name without checking that it is non-empty.
    ///
    /// This should only be used when parsing names from a trusted source
    /// such as the application database.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CardName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CardName {
    type Err = Error;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        Self::new(string)
    }
}

impl Display for CardName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The last four digits of a card number.
///
/// Only the last four digits are ever stored, so cards can be told apart
/// without holding the full card number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LastFour(String);

impl LastFour {
    /// Create the last four digits of a card number.
    ///
    /// # Errors
    /// Returns [`Error::InvalidCardNumber`] unless `digits` is exactly four
    /// ASCII digits.
    pub fn new(digits: &str) -> Result<Self, Error> {
        let digits = digits.trim();

        if digits.len() == 4 && digits.chars().all(|character| character.is_ascii_digit()) {
            Ok(Self(digits.to_string()))
        } else {
            Err(Error::InvalidCardNumber)
        }
    }

    /// Create the last four digits without validating them.
    ///
    /// This should only be used when parsing digits from a trusted source
    /// such as the application database.
    pub fn new_unchecked(digits: &str) -> Self {
        Self(digits.to_string())
    }
}

impl AsRef<str> for LastFour {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for LastFour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A day of the month between 1 and 31.
///
/// Used for statement closing and payment due days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DayOfMonth(u8);

impl DayOfMonth {
    /// Create a day of the month.
    ///
    /// # Errors
    /// Returns [`Error::InvalidDayOfMonth`] if `day` is not between 1 and 31.
    pub fn new(day: u8) -> Result<Self, Error> {
        if (1..=31).contains(&day) {
            Ok(Self(day))
        } else {
            Err(Error::InvalidDayOfMonth(day))
        }
    }

    /// Create a day of the month without checking the range.
    ///
    /// This should only be used when parsing days from a trusted source
    /// such as the application database.
    pub fn new_unchecked(day: u8) -> Self {
        Self(day)
    }

    /// The day as a number between 1 and 31.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Display for DayOfMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Alias for card row IDs.
pub type CardId = i64;

/// A credit card and its current statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// The ID of the card.
    pub id: CardId,
    /// The display name of the card.
    pub name: CardName,
    /// The card brand or issuing institution.
    pub brand: String,
    /// The last four digits of the card number.
    pub last_four: LastFour,
    /// The credit limit of the card.
    pub limit: f64,
    /// The balance of the current statement.
    pub current_invoice: f64,
    /// The day of the month the statement closes.
    pub closing_day: DayOfMonth,
    /// The day of the month payment is due.
    pub due_day: DayOfMonth,
    /// An optional visual theme tag for rendering the card.
    pub theme: Option<String>,
}

impl Card {
    /// The fraction of the credit limit used by the current statement.
    ///
    /// The fraction is not clamped, so an over-limit card reports more than
    /// one. Cards with no limit report zero. Callers clamp for display.
    pub fn usage_fraction(&self) -> f64 {
        if self.limit <= 0.0 {
            0.0
        } else {
            self.current_invoice / self.limit
        }
    }
}

/// The validated details of a card, ready to be written to the database.
#[derive(Debug, Clone, PartialEq)]
pub struct CardDetails {
    pub name: CardName,
    pub brand: String,
    pub last_four: LastFour,
    pub limit: f64,
    pub current_invoice: f64,
    pub closing_day: DayOfMonth,
    pub due_day: DayOfMonth,
    pub theme: Option<String>,
}

impl CardDetails {
    /// Validate the details submitted through a card form.
    ///
    /// # Errors
    /// Returns [`Error::EmptyCardName`], [`Error::InvalidCardNumber`],
    /// [`Error::NegativeAmount`] or [`Error::InvalidDayOfMonth`] when the
    /// corresponding field is invalid.
    pub fn new(form: &CardFormData) -> Result<Self, Error> {
        let name = CardName::new(&form.name)?;
        let last_four = LastFour::new(&form.last_four)?;

        if form.limit < 0.0 {
            return Err(Error::NegativeAmount(form.limit));
        }

        let closing_day = DayOfMonth::new(form.closing_day)?;
        let due_day = DayOfMonth::new(form.due_day)?;

        let theme = form.theme.trim();
        let theme = (!theme.is_empty()).then(|| theme.to_string());

        Ok(Self {
            name,
            brand: form.brand.trim().to_string(),
            last_four,
            limit: form.limit,
            current_invoice: form.current_invoice,
            closing_day,
            due_day,
            theme,
        })
    }
}

/// The data for creating or updating a card, parsed from a form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CardFormData {
    /// The display name of the card.
    pub name: String,
    /// The card brand or issuing institution.
    pub brand: String,
    /// The last four digits of the card number.
    pub last_four: String,
    /// The credit limit of the card.
    pub limit: f64,
    /// The balance of the current statement.
    pub current_invoice: f64,
    /// The day of the month the statement closes.
    pub closing_day: u8,
    /// The day of the month payment is due.
    pub due_day: u8,
    /// An optional visual theme tag, empty when unset.
    #[serde(default)]
    pub theme: String,
}
