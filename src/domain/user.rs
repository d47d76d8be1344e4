//! User records
//!
//! `roles` behaves as a set: duplicates are dropped on every path into a
//! User (creation, patch, deserialization), first occurrence wins so the
//! display order stays stable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::status::UserRole;
use crate::id::{generate_id, now};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "deserialize_roles")]
    pub roles: Vec<UserRole>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn create(fields: NewUser) -> Self {
        let created = now();
        Self {
            id: generate_id(),
            name: fields.name,
            email: fields.email,
            roles: dedupe_roles(fields.roles),
            created_at: created,
            updated_at: created,
        }
    }

    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.contains(&role)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub roles: Vec<UserRole>,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            roles: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.roles.push(role);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub roles: Option<Vec<UserRole>>,
}

impl UserPatch {
    pub fn apply_to(self, user: &mut User) {
        if let Some(v) = self.name {
            user.name = v;
        }
        if let Some(v) = self.email {
            user.email = v;
        }
        if let Some(v) = self.roles {
            user.roles = dedupe_roles(v);
        }
    }
}

/// Drop repeated roles, keeping the first occurrence of each
pub fn dedupe_roles(roles: Vec<UserRole>) -> Vec<UserRole> {
    let mut unique = Vec::with_capacity(roles.len());
    for role in roles {
        if !unique.contains(&role) {
            unique.push(role);
        }
    }
    unique
}

fn deserialize_roles<'de, D>(deserializer: D) -> Result<Vec<UserRole>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<UserRole>::deserialize(deserializer).map(dedupe_roles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_dedupes_roles() {
        let user = User::create(
            NewUser::new("Ana", "ana@example.com")
                .with_role(UserRole::Qa)
                .with_role(UserRole::Developer)
                .with_role(UserRole::Qa),
        );
        assert_eq!(user.roles, vec![UserRole::Qa, UserRole::Developer]);
        assert!(user.has_role(UserRole::Developer));
        assert!(!user.has_role(UserRole::Bsa));
    }

    #[test]
    fn test_deserialize_dedupes_roles() {
        let json = r#"{
            "id": "u1",
            "name": "Ana",
            "email": "ana@example.com",
            "roles": ["UAT", "Business User", "UAT"],
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.roles, vec![UserRole::Uat, UserRole::BusinessUser]);
    }

    #[test]
    fn test_patch_roles_dedupes() {
        let mut user = User::create(NewUser::new("Ana", "ana@example.com"));
        UserPatch {
            roles: Some(vec![UserRole::Other, UserRole::Other]),
            ..Default::default()
        }
        .apply_to(&mut user);
        assert_eq!(user.roles, vec![UserRole::Other]);
    }
}
