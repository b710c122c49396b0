use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Company,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Company => "company",
            Role::Admin => "admin",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(Role::User),
            "company" => Some(Role::Company),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Admin permissions: resource → allowed actions. The `*` resource grants everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(pub HashMap<String, Vec<String>>);

impl Permissions {
    pub fn allows(&self, resource: &str, action: &str) -> bool {
        [resource, "*"].iter().any(|r| {
            self.0
                .get(*r)
                .is_some_and(|actions| actions.iter().any(|a| a == action || a == "*"))
        })
    }
}

/// A platform account: candidate (`user`), company or admin.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub role: String,
    pub email: String,
    pub name: String,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub firebase_id: Option<String>,
    pub active: bool,
    /// JD codes this account has applied to.
    pub postulations: Vec<String>,
    pub permissions: Json<Permissions>,
    pub created_date: DateTime<Utc>,
}

impl Account {
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

#[cfg(test)]
pub fn test_account(role: &str, email: &str) -> Account {
    Account {
        id: Uuid::new_v4(),
        role: role.to_string(),
        email: email.to_string(),
        name: "Ana".to_string(),
        last_name: Some("Pérez".to_string()),
        company_name: None,
        firebase_id: None,
        active: true,
        postulations: vec![],
        permissions: Json(Permissions::default()),
        created_date: Utc::now(),
    }
}
