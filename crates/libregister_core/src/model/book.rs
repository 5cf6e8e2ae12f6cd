//! Book record domain model.
//!
//! # Responsibility
//! - Define the canonical acquisition record and its validation rules.
//! - Serialize with the backup document's field naming.
//!
//! # Invariants
//! - `accession_no` is the immutable identity; it is never blank.
//! - Date fields, when filled in, carry ISO calendar dates (`YYYY-MM-DD`).
//! - Borrow fields are present only while a book is lent out.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern must compile"));

/// Validation failure raised before any record reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookValidationError {
    /// The primary key is empty or whitespace-only.
    EmptyAccessionNo,
    /// A filled-in date field does not look like `YYYY-MM-DD`.
    InvalidDate {
        field: &'static str,
        value: String,
    },
}

impl Display for BookValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyAccessionNo => write!(f, "accession number must not be empty"),
            Self::InvalidDate { field, value } => {
                write!(f, "field `{field}` holds invalid date `{value}`; expected YYYY-MM-DD")
            }
        }
    }
}

impl Error for BookValidationError {}

/// Canonical acquisition record, one per physical book.
///
/// Wire naming matches the backup document format, so documents exported by
/// the register round-trip through external tooling unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    /// Unique accession number; primary key of the register.
    pub accession_no: String,
    /// Date the book entered the register.
    pub entry_date: String,
    /// Library classification number.
    pub class_no: String,
    /// Title as printed; secondary-indexed, not unique.
    pub book_name: String,
    pub publisher: String,
    pub publish_date: String,
    /// Kept as text; backups written by older tooling may carry a number.
    #[serde(deserialize_with = "string_or_number")]
    pub pages: String,
    /// Kept as text; backups written by older tooling may carry a number.
    #[serde(deserialize_with = "string_or_number")]
    pub price: String,
    /// Language/medium the book is written in.
    pub medium: String,
    /// Date the book was withdrawn from circulation, if ever.
    pub withdraw_date: String,
    pub notes: String,
    /// Set only while the book is lent out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borrow_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
}

impl BookRecord {
    /// Creates a record with identity and title set and all other fields
    /// blank, the shape a freshly filled acquisition form produces.
    pub fn new(accession_no: impl Into<String>, book_name: impl Into<String>) -> Self {
        Self {
            accession_no: accession_no.into(),
            book_name: book_name.into(),
            ..Self::default()
        }
    }

    /// Returns whether the book is currently lent out.
    pub fn is_borrowed(&self) -> bool {
        self.student_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty())
    }

    /// Checks record invariants enforced on every write path.
    ///
    /// # Errors
    /// - [`BookValidationError::EmptyAccessionNo`] when the key is blank.
    /// - [`BookValidationError::InvalidDate`] when a filled date field does
    ///   not match the `YYYY-MM-DD` shape.
    pub fn validate(&self) -> Result<(), BookValidationError> {
        if self.accession_no.trim().is_empty() {
            return Err(BookValidationError::EmptyAccessionNo);
        }

        let dates = [
            ("entryDate", Some(self.entry_date.as_str())),
            ("publishDate", Some(self.publish_date.as_str())),
            ("withdrawDate", Some(self.withdraw_date.as_str())),
            ("borrowDate", self.borrow_date.as_deref()),
            ("returnDate", self.return_date.as_deref()),
        ];
        for (field, value) in dates {
            if let Some(value) = value {
                if !value.is_empty() && !ISO_DATE_RE.is_match(value) {
                    return Err(BookValidationError::InvalidDate {
                        field,
                        value: value.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Accepts a JSON string or number and stores it as text.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrNumber;

    impl<'de> Visitor<'de> for StringOrNumber {
        type Value = String;

        fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str("a string or a number")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<String, E> {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(StringOrNumber)
}
