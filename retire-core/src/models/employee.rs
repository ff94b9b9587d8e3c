use serde::{Deserialize, Serialize};

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    Officer,
    Office,
    Warehouse,
}

impl Department {
    pub fn all() -> &'static [Department] {
        &[Department::Officer, Department::Office, Department::Warehouse]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Officer => "Officer",
            Self::Office => "Office",
            Self::Warehouse => "Warehouse",
        }
    }

    /// Case-insensitive parse of a department label.
    pub fn parse(s: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl std::fmt::Display for Department {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub department: Option<Department>,
    /// Whether the employer contributes to this employee's retirement plan.
    pub eligible: bool,
}

impl Employee {
    /// Department label, or an empty string when unset.
    pub fn department_label(&self) -> &'static str {
        self.department.map(|d| d.as_str()).unwrap_or("")
    }
}

/// For creating new employees (no id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub name: String,
    pub department: Option<Department>,
    pub eligible: bool,
}

impl NewEmployee {
    /// Rejects a blank name.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.name.trim().is_empty() {
            return Err(EngineError::invalid_value("employee name is required"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn department_parse_is_case_insensitive() {
        assert_eq!(Department::parse("office"), Some(Department::Office));
        assert_eq!(Department::parse(" WAREHOUSE "), Some(Department::Warehouse));
        assert_eq!(Department::parse("Officer"), Some(Department::Officer));
    }

    #[test]
    fn department_parse_rejects_unknown_label() {
        assert_eq!(Department::parse("Sales"), None);
        assert_eq!(Department::parse(""), None);
    }

    #[test]
    fn department_label_is_empty_when_unset() {
        let employee = Employee {
            id: 1,
            name: "Alice".to_string(),
            department: None,
            eligible: false,
        };

        assert_eq!(employee.department_label(), "");
    }

    #[test]
    fn new_employee_requires_name() {
        let employee = NewEmployee {
            name: "   ".to_string(),
            department: Some(Department::Office),
            eligible: true,
        };

        assert!(matches!(
            employee.validate(),
            Err(EngineError::InvalidValue(_))
        ));
    }
}
