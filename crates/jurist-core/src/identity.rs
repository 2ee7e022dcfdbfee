use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Role;

/// The authenticated principal, as resolved from the profile store.
///
/// Produced by `jurist-auth` when a session is reconciled, consumed by every
/// screen through a [`crate::SessionSnapshot`]. Field names match the
/// profile table's columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Identity {
    /// Identity-provider user id; also the profile record's primary key.
    pub id: String,
    pub email: String,
    pub role: Role,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Name to show in a greeting, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.email
        } else {
            &self.full_name
        }
    }
}

/// Profile row inserted right after account creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NewProfile {
    pub id: String,
    pub email: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
}

/// Editable profile fields. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ProfileUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.phone.is_none()
    }

    /// Apply the update to an in-memory identity.
    #[must_use]
    pub fn apply_to(&self, identity: &Identity) -> Identity {
        let mut updated = identity.clone();
        if let Some(full_name) = &self.full_name {
            updated.full_name.clone_from(full_name);
        }
        if let Some(phone) = &self.phone {
            updated.phone = Some(phone.clone());
        }
        updated
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> Identity {
        Identity {
            id: "8d0c2a8e-1111-4f00-9c1a-000000000001".into(),
            email: "a@b.com".into(),
            role: Role::Client,
            full_name: "Anna Petrova".into(),
            phone: None,
            created_at: "2025-05-27T10:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn deserializes_profile_row_with_offset_timestamp() {
        let row = r#"{
            "id": "8d0c2a8e-1111-4f00-9c1a-000000000001",
            "email": "a@b.com",
            "role": "lawyer",
            "full_name": "Anna Petrova",
            "phone": "+70000000000",
            "created_at": "2025-05-27T10:00:00.123456+00:00"
        }"#;
        let identity: Identity = serde_json::from_str(row).unwrap();
        assert_eq!(identity.role, Role::Lawyer);
        assert_eq!(identity.phone.as_deref(), Some("+70000000000"));
    }

    #[test]
    fn null_phone_deserializes_as_none() {
        let row = r#"{"id":"x","email":"a@b.com","role":"client","full_name":"A",
                      "phone":null,"created_at":"2025-05-27T10:00:00Z"}"#;
        let identity: Identity = serde_json::from_str(row).unwrap();
        assert!(identity.phone.is_none());
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let mut identity = sample();
        assert_eq!(identity.display_name(), "Anna Petrova");
        identity.full_name = "  ".into();
        assert_eq!(identity.display_name(), "a@b.com");
    }

    #[test]
    fn update_serializes_only_present_fields() {
        let update = ProfileUpdate {
            full_name: None,
            phone: Some("+1000".into()),
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({ "phone": "+1000" })
        );
        assert!(ProfileUpdate::default().is_empty());
    }

    #[test]
    fn update_applies_to_identity() {
        let update = ProfileUpdate {
            full_name: Some("Anna Ivanova".into()),
            phone: Some("+1000".into()),
        };
        let updated = update.apply_to(&sample());
        assert_eq!(updated.full_name, "Anna Ivanova");
        assert_eq!(updated.phone.as_deref(), Some("+1000"));
        assert_eq!(updated.id, sample().id);
    }
}
