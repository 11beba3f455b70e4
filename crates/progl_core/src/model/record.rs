//! PROGL record model.
//!
//! # Responsibility
//! - Define the programming-language record persisted in `PROGL`.
//! - Enforce the column limits that SQLite does not enforce on its own.
//!
//! # Invariants
//! - `conceptor` is at most 300 characters when set.
//! - `language` is at most 50 characters when set.
//! - `creation_date` is a `YYYY-MM-DD` calendar date when set.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Primary key of a PROGL record.
pub type RecordId = i64;

/// Maximum length of `conceptor`, mirroring `VARCHAR(300)`.
pub const CONCEPTOR_MAX_CHARS: usize = 300;
/// Maximum length of `language`, mirroring `VARCHAR(50)`.
pub const LANGUAGE_MAX_CHARS: usize = 50;

static CREATION_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("valid creation date regex")
});

/// One programming language and the people who conceived it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub conceptor: Option<String>,
    pub language: Option<String>,
    /// Calendar date rendered as `YYYY-MM-DD`.
    #[serde(rename = "creationDate")]
    pub creation_date: Option<String>,
}

/// Validation failure for a record about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    ConceptorTooLong { id: RecordId, chars: usize },
    LanguageTooLong { id: RecordId, chars: usize },
    InvalidCreationDate { id: RecordId, value: String },
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConceptorTooLong { id, chars } => write!(
                f,
                "record {id}: conceptor has {chars} characters, limit is {CONCEPTOR_MAX_CHARS}"
            ),
            Self::LanguageTooLong { id, chars } => write!(
                f,
                "record {id}: language has {chars} characters, limit is {LANGUAGE_MAX_CHARS}"
            ),
            Self::InvalidCreationDate { id, value } => write!(
                f,
                "record {id}: creation date `{value}` is not a YYYY-MM-DD date"
            ),
        }
    }
}

impl Error for RecordValidationError {}

impl Record {
    /// Creates a fully populated record.
    pub fn new(
        id: RecordId,
        conceptor: impl Into<String>,
        language: impl Into<String>,
        creation_date: impl Into<String>,
    ) -> Self {
        Self {
            id,
            conceptor: Some(conceptor.into()),
            language: Some(language.into()),
            creation_date: Some(creation_date.into()),
        }
    }

    /// Creates a record carrying only its key; every other column is NULL.
    pub fn bare(id: RecordId) -> Self {
        Self {
            id,
            conceptor: None,
            language: None,
            creation_date: None,
        }
    }

    /// Checks column limits before the record reaches storage.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if let Some(conceptor) = &self.conceptor {
            let chars = conceptor.chars().count();
            if chars > CONCEPTOR_MAX_CHARS {
                return Err(RecordValidationError::ConceptorTooLong { id: self.id, chars });
            }
        }

        if let Some(language) = &self.language {
            let chars = language.chars().count();
            if chars > LANGUAGE_MAX_CHARS {
                return Err(RecordValidationError::LanguageTooLong { id: self.id, chars });
            }
        }

        if let Some(date) = &self.creation_date {
            if !is_calendar_date(date) {
                return Err(RecordValidationError::InvalidCreationDate {
                    id: self.id,
                    value: date.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Returns whether `value` looks like a `YYYY-MM-DD` date with plausible
/// month and day fields.
pub fn is_calendar_date(value: &str) -> bool {
    let Some(caps) = CREATION_DATE_RE.captures(value) else {
        return false;
    };
    let month: u32 = caps[2].parse().unwrap_or(0);
    let day: u32 = caps[3].parse().unwrap_or(0);
    (1..=12).contains(&month) && (1..=31).contains(&day)
}
