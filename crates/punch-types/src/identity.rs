use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Employee identity as resolved from a tag binding.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeIdentity {
    pub employee_id: String,
    /// Display name, denormalized into every clock event.
    pub name: String,
}

impl EmployeeIdentity {
    pub fn new(employee_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.into(),
            name: name.into(),
        }
    }

    /// Rejects identities whose employee id is empty or whitespace.
    pub fn validate(&self) -> Result<(), TypeError> {
        if self.employee_id.trim().is_empty() {
            return Err(TypeError::EmptyField("employeeId"));
        }
        Ok(())
    }
}

/// Out-of-band mapping from a physical credential to an employee.
///
/// Keyed by `tag_uid`. Bindings are provisioned outside the relay and only
/// ever read by it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagBinding {
    #[serde(alias = "tag_uid", alias = "uid")]
    pub tag_uid: String,
    #[serde(alias = "employee_id")]
    pub employee_id: String,
    pub name: String,
}

impl TagBinding {
    pub fn new(
        tag_uid: impl Into<String>,
        employee_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            tag_uid: tag_uid.into(),
            employee_id: employee_id.into(),
            name: name.into(),
        }
    }

    /// The identity this binding resolves to.
    pub fn identity(&self) -> EmployeeIdentity {
        EmployeeIdentity::new(self.employee_id.clone(), self.name.clone())
    }

    pub fn validate(&self) -> Result<(), TypeError> {
        if self.tag_uid.trim().is_empty() {
            return Err(TypeError::EmptyField("tagUid"));
        }
        self.identity().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_resolves_to_identity() {
        let binding = TagBinding::new("A1B2", "e1", "John Doe");
        assert_eq!(binding.identity(), EmployeeIdentity::new("e1", "John Doe"));
    }

    #[test]
    fn empty_employee_id_rejected() {
        let identity = EmployeeIdentity::new("  ", "Nobody");
        assert_eq!(identity.validate(), Err(TypeError::EmptyField("employeeId")));
    }

    #[test]
    fn binding_requires_tag_uid() {
        let binding = TagBinding::new("", "e1", "John Doe");
        assert_eq!(binding.validate(), Err(TypeError::EmptyField("tagUid")));
    }

    #[test]
    fn binding_accepts_snake_case_fields() {
        let json = r#"{"tag_uid":"A1B2","employee_id":"e1","name":"John Doe"}"#;
        let binding: TagBinding = serde_json::from_str(json).unwrap();
        assert_eq!(binding.tag_uid, "A1B2");
        assert_eq!(binding.employee_id, "e1");
    }
}
