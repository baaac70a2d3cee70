//! Shared helpers for deserializing HTML form submissions.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, de};
use time::Date;

use crate::html::DATE_ATTRIBUTE_FORMAT;

/// Deserialize an optional form field, treating an empty string as `None`.
///
/// Browsers submit every named control, so an unselected `<select>` or a blank
/// `<input>` arrives as an empty string rather than a missing field.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let value = Option::<String>::deserialize(deserializer)?;

    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(text) => text.parse::<T>().map(Some).map_err(de::Error::custom),
    }
}

/// Deserialize an optional `<input type="date">` field, treating an empty
/// string as `None`.
pub fn empty_date_as_none<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;

    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(text) => Date::parse(text, DATE_ATTRIBUTE_FORMAT)
            .map(Some)
            .map_err(de::Error::custom),
    }
}

#[cfg(test)]
mod empty_as_none_tests {
    use serde::Deserialize;
    use time::macros::date;

    use super::{empty_as_none, empty_date_as_none};

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestForm {
        #[serde(default, deserialize_with = "empty_as_none")]
        member_id: Option<i64>,
        #[serde(default, deserialize_with = "empty_date_as_none")]
        end_date: Option<time::Date>,
    }

    #[test]
    fn empty_fields_become_none() {
        let form: TestForm = serde_html_form::from_str("member_id=&end_date=").unwrap();

        assert_eq!(
            form,
            TestForm {
                member_id: None,
                end_date: None,
            }
        );
    }

    #[test]
    fn missing_fields_become_none() {
        let form: TestForm = serde_html_form::from_str("").unwrap();

        assert_eq!(
            form,
            TestForm {
                member_id: None,
                end_date: None,
            }
        );
    }

    #[test]
    fn populated_fields_are_parsed() {
        let form: TestForm =
            serde_html_form::from_str("member_id=42&end_date=2024-03-05").unwrap();

        assert_eq!(
            form,
            TestForm {
                member_id: Some(42),
                end_date: Some(date!(2024 - 03 - 05)),
            }
        );
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(serde_html_form::from_str::<TestForm>("member_id=abc").is_err());
        assert!(serde_html_form::from_str::<TestForm>("end_date=05/03/2024").is_err());
    }
}
