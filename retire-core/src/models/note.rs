use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub employee_id: i64,
    pub text: String,
    pub date: NaiveDate,
}

impl Note {
    pub fn validate(&self) -> Result<(), EngineError> {
        validate_text(&self.text)
    }
}

/// For creating new notes (no id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNote {
    pub employee_id: i64,
    pub text: String,
    pub date: NaiveDate,
}

impl NewNote {
    pub fn validate(&self) -> Result<(), EngineError> {
        validate_text(&self.text)
    }
}

fn validate_text(text: &str) -> Result<(), EngineError> {
    if text.trim().is_empty() {
        return Err(EngineError::invalid_value("note text is required"));
    }
    Ok(())
}
