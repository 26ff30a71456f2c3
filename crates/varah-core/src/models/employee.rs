use serde::{Deserialize, Serialize};

/// A single employee record as returned by `GET /api/employees`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nfc_card_id: Option<String>,
}

impl Employee {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(unnamed)")
    }

    pub fn card_display(&self) -> &str {
        self.nfc_card_id.as_deref().unwrap_or("-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_employee() {
        let json = r#"{"id": 7, "name": "Ada Lovelace", "nfc_card_id": "04:A2:19:B3"}"#;
        let emp: Employee = serde_json::from_str(json).expect("Failed to parse employee JSON");
        assert_eq!(emp.id, 7);
        assert_eq!(emp.display_name(), "Ada Lovelace");
        assert_eq!(emp.card_display(), "04:A2:19:B3");
    }

    #[test]
    fn test_parse_employee_with_missing_fields() {
        let json = r#"{"id": 3}"#;
        let emp: Employee = serde_json::from_str(json).expect("Failed to parse sparse employee");
        assert_eq!(emp.display_name(), "(unnamed)");
        assert_eq!(emp.card_display(), "-");
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let json = r#"{"id": 1, "name": "Bo", "nfc_card_id": "X1", "company_id": 9}"#;
        let emp: Employee = serde_json::from_str(json).expect("Failed to parse employee JSON");
        assert_eq!(emp.id, 1);
    }
}
