//! Every read the service performs, one row per access pattern.
//!
//! Each row is answered by a single query on one index. [`audit`] checks
//! every row against the schema of the entity it reads, so a key change
//! that breaks a pattern fails at start-up instead of returning nothing.

use crate::domain::{Event, Property, UserProfile, WorkOrder};
use entity_core::{
    AccessPattern, Case, Entity, Index, KeyTemplate, ScanOrder, Schema, SegmentTemplate,
    SortCondition,
};
use tracing::debug;

pub const DEFAULT_PAGE_SIZE: u16 = 25;

const fn pattern(
    name: &'static str,
    index: Index,
    partition: &'static [SegmentTemplate],
    sort: SortCondition,
    order: ScanOrder,
) -> AccessPattern {
    AccessPattern {
        name,
        index,
        partition: KeyTemplate::new(partition),
        sort,
        order,
        page_size: DEFAULT_PAGE_SIZE,
    }
}

const PM: &[SegmentTemplate] = &[SegmentTemplate::labeled("PM", Case::Lower)];
const TECH: &[SegmentTemplate] = &[SegmentTemplate::labeled("TECH", Case::Lower)];
const TENANT: &[SegmentTemplate] = &[SegmentTemplate::labeled("TENANT", Case::Lower)];
const ORG: &[SegmentTemplate] = &[SegmentTemplate::labeled("ORG", Case::Preserve)];
const WO: &[SegmentTemplate] = &[SegmentTemplate::labeled("WO", Case::Preserve)];
const EV: &[SegmentTemplate] = &[SegmentTemplate::labeled("EV", Case::Preserve)];
const EMAIL: &[SegmentTemplate] = &[SegmentTemplate::bare(Case::Lower)];
const STATUS: SortCondition = SortCondition::BeginsWith("STATUS#");

pub const WORK_ORDERS_BY_PROPERTY_MANAGER: AccessPattern = pattern(
    "work_orders_by_property_manager",
    Index::Gsi1,
    PM,
    STATUS,
    ScanOrder::Forward,
);

pub const WORK_ORDERS_BY_TECHNICIAN: AccessPattern = pattern(
    "work_orders_by_technician",
    Index::Gsi2,
    TECH,
    STATUS,
    ScanOrder::Forward,
);

pub const WORK_ORDERS_BY_TENANT: AccessPattern = pattern(
    "work_orders_by_tenant",
    Index::Gsi3,
    TENANT,
    STATUS,
    ScanOrder::Forward,
);

pub const WORK_ORDERS_BY_ORGANIZATION: AccessPattern = pattern(
    "work_orders_by_organization",
    Index::Gsi4,
    ORG,
    STATUS,
    ScanOrder::Forward,
);

pub const WORK_ORDERS_BY_ADDRESS: AccessPattern = pattern(
    "work_orders_by_address",
    Index::Primary,
    WO,
    STATUS,
    ScanOrder::Forward,
);

pub const EVENTS_BY_WORK_ORDER: AccessPattern = pattern(
    "events_by_work_order",
    Index::Primary,
    EV,
    SortCondition::Any,
    ScanOrder::Reverse,
);

pub const TENANTS_BY_PROPERTY_MANAGER: AccessPattern = pattern(
    "tenants_by_property_manager",
    Index::Gsi1,
    PM,
    SortCondition::BeginsWith("TENANT#"),
    ScanOrder::Forward,
);

pub const PROPERTIES_BY_PROPERTY_MANAGER: AccessPattern = pattern(
    "properties_by_property_manager",
    Index::Primary,
    PM,
    SortCondition::BeginsWith("ADDRESS#"),
    ScanOrder::Forward,
);

pub const ROLES_BY_USER: AccessPattern = pattern(
    "roles_by_user",
    Index::Primary,
    EMAIL,
    SortCondition::BeginsWith("ACCOUNT_TYPE#"),
    ScanOrder::Forward,
);

pub const MEMBERS_BY_ORGANIZATION: AccessPattern = pattern(
    "members_by_organization",
    Index::Gsi4,
    ORG,
    SortCondition::BeginsWith("ACCOUNT_TYPE#"),
    ScanOrder::Forward,
);

/// Every pattern with the schema of the entity it reads.
pub const TABLE: [(&AccessPattern, fn() -> Schema); 10] = [
    (&WORK_ORDERS_BY_PROPERTY_MANAGER, WorkOrder::schema),
    (&WORK_ORDERS_BY_TECHNICIAN, WorkOrder::schema),
    (&WORK_ORDERS_BY_TENANT, WorkOrder::schema),
    (&WORK_ORDERS_BY_ORGANIZATION, WorkOrder::schema),
    (&WORK_ORDERS_BY_ADDRESS, WorkOrder::schema),
    (&EVENTS_BY_WORK_ORDER, Event::schema),
    (&TENANTS_BY_PROPERTY_MANAGER, UserProfile::schema),
    (&PROPERTIES_BY_PROPERTY_MANAGER, Property::schema),
    (&ROLES_BY_USER, UserProfile::schema),
    (&MEMBERS_BY_ORGANIZATION, UserProfile::schema),
];

/// Check every pattern against the entity it reads.
pub fn audit() -> entity_core::Result<()> {
    for (pattern, schema) in TABLE {
        pattern.audit(&schema())?;
        debug!(pattern = pattern.name, index = ?pattern.index, "access pattern ok");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn table_passes_audit() {
        audit().unwrap();
    }

    #[test]
    fn pattern_names_are_unique() {
        let names: BTreeSet<&str> = TABLE.iter().map(|(p, _)| p.name).collect();
        assert_eq!(names.len(), TABLE.len());
    }

    #[test]
    fn events_read_newest_first() {
        assert_eq!(EVENTS_BY_WORK_ORDER.order, ScanOrder::Reverse);
        assert_eq!(EVENTS_BY_WORK_ORDER.sort, SortCondition::Any);
    }

    #[test]
    fn audit_catches_wrong_entity() {
        assert!(WORK_ORDERS_BY_TECHNICIAN.audit(&Property::schema()).is_err());
        assert!(ROLES_BY_USER.audit(&WorkOrder::schema()).is_err());
    }

    #[test]
    fn property_manager_partition_lowercases() {
        let condition = WORK_ORDERS_BY_PROPERTY_MANAGER
            .resolve(&["PM@Example.com"], &[])
            .unwrap();
        assert_eq!(condition.partition, "PM#pm@example.com");
        assert_eq!(condition.index, Index::Gsi1);
    }
}
