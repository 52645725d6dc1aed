use entity_macros::Entity;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Tenant,
    PropertyManager,
    Technician,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tenant => "TENANT",
            Self::PropertyManager => "PROPERTY_MANAGER",
            Self::Technician => "TECHNICIAN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// UserProfile
///
/// One item per (email, role): a person holding two roles has two items
/// under the same partition.
///
/// * pk = `<email>`, sk = `ACCOUNT_TYPE#<role>`
/// * GSI1 (tenants of a manager): `PM#<manager>` / `TENANT#<email>`
/// * GSI4 (organization members): `ORG#<org>` / `ACCOUNT_TYPE#<role>#EMAIL#<email>`
///

#[derive(Clone, Debug, Entity, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[pk(case = "lower")]
    #[nk(name = "GSI1SK", prefix = "TENANT", case = "lower")]
    #[nk(name = "GSI4SK", prefix = "EMAIL", order = 1, case = "lower")]
    pub email: String,
    #[sk(prefix = "ACCOUNT_TYPE")]
    #[nk(name = "GSI4SK", prefix = "ACCOUNT_TYPE", order = 0)]
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[nk(name = "GSI4PK", prefix = "ORG")]
    #[serde(default)]
    pub organization_id: Option<String>,
    /// Set on tenant profiles; puts the tenant in its manager's GSI1 partition.
    #[nk(name = "GSI1PK", prefix = "PM", case = "lower")]
    #[serde(default)]
    pub property_manager_email: Option<String>,
}
