use chrono::{DateTime, Utc};
use entity_macros::Entity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Set directly by callers; any status may replace any other.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkOrderStatus {
    #[default]
    ToDo,
    Complete,
}

impl WorkOrderStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToDo => "TO_DO",
            Self::Complete => "COMPLETE",
        }
    }
}

impl fmt::Display for WorkOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// WorkOrder
///
/// pk = `WO#<address id>`, sk = `STATUS#<status>`. Each secondary index
/// partitions by one party and sorts by `STATUS#<status>`:
///
/// | index | partition |
/// |---|---|
/// | GSI1 | `PM#<manager>` |
/// | GSI2 | `TECH#<technician>` |
/// | GSI3 | `TENANT#<tenant>` |
/// | GSI4 | `ORG#<organization>` |
///
/// Unassigned parties leave the work order out of that index.
///

#[derive(Clone, Debug, Entity, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrder {
    pub id: String,
    #[pk(prefix = "WO")]
    pub address_id: String,
    #[sk(prefix = "STATUS")]
    #[nk(name = "GSI1SK", prefix = "STATUS")]
    #[nk(name = "GSI2SK", prefix = "STATUS")]
    #[nk(name = "GSI3SK", prefix = "STATUS")]
    #[nk(name = "GSI4SK", prefix = "STATUS")]
    pub status: WorkOrderStatus,
    pub issue: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub additional_details: String,
    #[serde(default)]
    pub permission_to_enter: bool,
    #[nk(name = "GSI1PK", prefix = "PM", case = "lower")]
    pub property_manager_email: String,
    #[nk(name = "GSI2PK", prefix = "TECH", case = "lower")]
    #[serde(default)]
    pub technician_email: Option<String>,
    #[nk(name = "GSI3PK", prefix = "TENANT", case = "lower")]
    #[serde(default)]
    pub tenant_email: Option<String>,
    #[nk(name = "GSI4PK", prefix = "ORG")]
    #[serde(default)]
    pub organization_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
