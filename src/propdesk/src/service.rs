//! Per-entity operations on top of the repositories.
//!
//! Work-order changes that leave a trace (status, technician) write the
//! [`Event`] first and the work order second. The two writes are separate
//! calls: a failure in between leaves the event without the change.

use crate::domain::{
    Event, EventKind, Organization, Property, PropertyAddress, Role, UserProfile, WorkOrder,
    WorkOrderSetters, WorkOrderStatus,
};
use crate::patterns;
use chrono::Utc;
use entity_core::{
    AccessPattern, Cursor, Entity, ItemStore, Ksuid, Page, Repository, Result,
};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Fields a caller supplies for a new work order.
#[derive(Clone, Debug, Default)]
pub struct NewWorkOrder {
    pub address_id: String,
    pub issue: String,
    pub location: String,
    pub additional_details: String,
    pub permission_to_enter: bool,
    pub property_manager_email: String,
    pub tenant_email: Option<String>,
    pub organization_id: Option<String>,
    /// Defaults to [`WorkOrderStatus::ToDo`].
    pub status: Option<WorkOrderStatus>,
}

///
/// Service
///

#[derive(Clone)]
pub struct Service {
    organizations: Repository<Organization>,
    users: Repository<UserProfile>,
    properties: Repository<Property>,
    work_orders: Repository<WorkOrder>,
    events: Repository<Event>,
    page_size: Option<u16>,
}

impl Service {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self {
            organizations: Repository::new(Arc::clone(&store)),
            users: Repository::new(Arc::clone(&store)),
            properties: Repository::new(Arc::clone(&store)),
            work_orders: Repository::new(Arc::clone(&store)),
            events: Repository::new(store),
            page_size: None,
        }
    }

    /// Override every pattern's page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u16) -> Self {
        self.page_size = Some(page_size);
        self
    }

    async fn list<T: Entity>(
        &self,
        repo: &Repository<T>,
        pattern: &AccessPattern,
        partition: &str,
        cursor: Option<Cursor>,
    ) -> Result<Page<T>> {
        let mut query = repo.query(pattern).partition([partition]).cursor(cursor);
        if let Some(limit) = self.page_size {
            query = query.limit(limit);
        }

        query.send().await
    }

    //
    // ─── ORGANIZATIONS ──────────────────────────────────────────────────────────
    //
    pub async fn create_organization(
        &self,
        name: String,
        id: Option<String>,
    ) -> Result<Organization> {
        let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
        info!(organization = %id, "create organization");

        self.organizations
            .create(Organization { id, name })
            .send()
            .await
    }

    pub async fn get_organization(&self, id: &str) -> Result<Option<Organization>> {
        self.organizations
            .get(&Organization::primary_key_of(id))
            .await
    }

    pub async fn delete_organization(&self, id: &str) -> Result<Option<Organization>> {
        info!(organization = %id, "delete organization");
        self.organizations
            .delete(&Organization::primary_key_of(id))
            .await
    }

    pub async fn list_organization_members(
        &self,
        organization_id: &str,
        cursor: Option<Cursor>,
    ) -> Result<Page<UserProfile>> {
        self.list(
            &self.users,
            &patterns::MEMBERS_BY_ORGANIZATION,
            organization_id,
            cursor,
        )
        .await
    }

    //
    // ─── USERS ──────────────────────────────────────────────────────────────────
    //
    /// Only tenant profiles keep `property_manager_email`, so the tenant
    /// index never lists other roles.
    pub async fn create_user(&self, mut user: UserProfile) -> Result<UserProfile> {
        if user.role != Role::Tenant && user.property_manager_email.is_some() {
            debug!(email = %user.email, role = %user.role, "ignoring property manager on non-tenant");
            user.property_manager_email = None;
        }
        info!(email = %user.email, role = %user.role, "create user profile");
        self.users.create(user).send().await
    }

    pub async fn get_user(&self, email: &str, role: Role) -> Result<Option<UserProfile>> {
        self.users
            .get(&UserProfile::primary_key_of(email, role))
            .await
    }

    /// Remove one role record. Other roles held by the same email stay.
    pub async fn delete_user_role(&self, email: &str, role: Role) -> Result<Option<UserProfile>> {
        info!(%email, %role, "delete user role");
        self.users
            .delete(&UserProfile::primary_key_of(email, role))
            .await
    }

    /// Every role record held by `email`.
    pub async fn list_user_roles(&self, email: &str) -> Result<Vec<UserProfile>> {
        self.users
            .query(&patterns::ROLES_BY_USER)
            .partition([email])
            .send_all()
            .await
    }

    pub async fn list_tenants(
        &self,
        property_manager_email: &str,
        cursor: Option<Cursor>,
    ) -> Result<Page<UserProfile>> {
        self.list(
            &self.users,
            &patterns::TENANTS_BY_PROPERTY_MANAGER,
            property_manager_email,
            cursor,
        )
        .await
    }

    //
    // ─── PROPERTIES ─────────────────────────────────────────────────────────────
    //
    /// Upsert by address. A property already stored at the same
    /// (case-insensitive) address keeps its `address_id`.
    pub async fn create_property(&self, mut property: Property) -> Result<Property> {
        if property.address_id.is_empty() {
            property.address_id = match self.properties.get(&property.primary_key()).await? {
                Some(existing) => existing.address_id,
                None => Uuid::new_v4().to_string(),
            };
        }
        info!(address_id = %property.address_id, "create property");

        self.properties.create(property).send().await
    }

    pub async fn get_property(&self, address: &PropertyAddress) -> Result<Option<Property>> {
        self.properties.get(&address.primary_key()).await
    }

    pub async fn delete_property(&self, address: &PropertyAddress) -> Result<Option<Property>> {
        info!(property_manager = %address.property_manager_email, "delete property");
        self.properties.delete(&address.primary_key()).await
    }

    pub async fn list_properties(
        &self,
        property_manager_email: &str,
        cursor: Option<Cursor>,
    ) -> Result<Page<Property>> {
        self.list(
            &self.properties,
            &patterns::PROPERTIES_BY_PROPERTY_MANAGER,
            property_manager_email,
            cursor,
        )
        .await
    }

    //
    // ─── WORK ORDERS ────────────────────────────────────────────────────────────
    //
    pub async fn create_work_order(&self, new: NewWorkOrder) -> Result<WorkOrder> {
        let work_order = WorkOrder {
            id: Uuid::new_v4().to_string(),
            address_id: new.address_id,
            status: new.status.unwrap_or_default(),
            issue: new.issue,
            location: new.location,
            additional_details: new.additional_details,
            permission_to_enter: new.permission_to_enter,
            property_manager_email: new.property_manager_email,
            technician_email: None,
            tenant_email: new.tenant_email,
            organization_id: new.organization_id,
            created_at: Utc::now(),
        };
        info!(work_order = %work_order.id, address_id = %work_order.address_id, "create work order");

        self.work_orders.create(work_order).send().await
    }

    pub async fn get_work_order(
        &self,
        address_id: &str,
        status: WorkOrderStatus,
    ) -> Result<Option<WorkOrder>> {
        self.work_orders
            .get(&WorkOrder::primary_key_of(address_id, status))
            .await
    }

    /// Removes the work order only; its events stay.
    pub async fn delete_work_order(
        &self,
        address_id: &str,
        status: WorkOrderStatus,
    ) -> Result<Option<WorkOrder>> {
        info!(%address_id, %status, "delete work order");
        self.work_orders
            .delete(&WorkOrder::primary_key_of(address_id, status))
            .await
    }

    /// Record a status event, then move the work order to `new_status`.
    ///
    /// `Ok(None)` if no work order exists at `(address_id, status)`.
    pub async fn update_work_order_status(
        &self,
        address_id: &str,
        status: WorkOrderStatus,
        new_status: WorkOrderStatus,
        actor_email: &str,
    ) -> Result<Option<WorkOrder>> {
        let Some(work_order) = self.get_work_order(address_id, status).await? else {
            return Ok(None);
        };

        self.create_event(
            &work_order.id,
            EventKind::StatusUpdate,
            format!("Status changed from {status} to {new_status}"),
            actor_email,
        )
        .await?;

        self.work_orders
            .update(work_order.primary_key())
            .set_status(new_status)
            .send()
            .await
    }

    pub async fn assign_technician(
        &self,
        address_id: &str,
        status: WorkOrderStatus,
        technician_email: &str,
        actor_email: &str,
    ) -> Result<Option<WorkOrder>> {
        let Some(work_order) = self.get_work_order(address_id, status).await? else {
            return Ok(None);
        };

        self.create_event(
            &work_order.id,
            EventKind::AssignTechnician,
            format!("Assigned technician {technician_email}"),
            actor_email,
        )
        .await?;

        self.work_orders
            .update(work_order.primary_key())
            .set_technician_email(Some(technician_email.to_lowercase()))
            .send()
            .await
    }

    pub async fn remove_technician(
        &self,
        address_id: &str,
        status: WorkOrderStatus,
        actor_email: &str,
    ) -> Result<Option<WorkOrder>> {
        let Some(work_order) = self.get_work_order(address_id, status).await? else {
            return Ok(None);
        };

        let message = match &work_order.technician_email {
            Some(technician) => format!("Removed technician {technician}"),
            None => "No technician assigned".to_owned(),
        };
        self.create_event(
            &work_order.id,
            EventKind::RemoveTechnician,
            message,
            actor_email,
        )
        .await?;

        self.work_orders
            .update(work_order.primary_key())
            .set_technician_email(None)
            .send()
            .await
    }

    pub async fn list_work_orders_by_property_manager(
        &self,
        email: &str,
        cursor: Option<Cursor>,
    ) -> Result<Page<WorkOrder>> {
        self.list(
            &self.work_orders,
            &patterns::WORK_ORDERS_BY_PROPERTY_MANAGER,
            email,
            cursor,
        )
        .await
    }

    pub async fn list_work_orders_by_technician(
        &self,
        email: &str,
        cursor: Option<Cursor>,
    ) -> Result<Page<WorkOrder>> {
        self.list(
            &self.work_orders,
            &patterns::WORK_ORDERS_BY_TECHNICIAN,
            email,
            cursor,
        )
        .await
    }

    pub async fn list_work_orders_by_tenant(
        &self,
        email: &str,
        cursor: Option<Cursor>,
    ) -> Result<Page<WorkOrder>> {
        self.list(
            &self.work_orders,
            &patterns::WORK_ORDERS_BY_TENANT,
            email,
            cursor,
        )
        .await
    }

    pub async fn list_work_orders_by_organization(
        &self,
        organization_id: &str,
        cursor: Option<Cursor>,
    ) -> Result<Page<WorkOrder>> {
        self.list(
            &self.work_orders,
            &patterns::WORK_ORDERS_BY_ORGANIZATION,
            organization_id,
            cursor,
        )
        .await
    }

    /// Every work order at an address, all pages.
    pub async fn list_work_orders_by_address(&self, address_id: &str) -> Result<Vec<WorkOrder>> {
        let mut query = self
            .work_orders
            .query(&patterns::WORK_ORDERS_BY_ADDRESS)
            .partition([address_id]);
        if let Some(limit) = self.page_size {
            query = query.limit(limit);
        }

        let work_orders = query.send_all().await?;
        debug!(%address_id, count = work_orders.len(), "work orders by address");

        Ok(work_orders)
    }

    //
    // ─── EVENTS ─────────────────────────────────────────────────────────────────
    //
    pub async fn create_event(
        &self,
        work_order_id: &str,
        kind: EventKind,
        message: String,
        actor_email: &str,
    ) -> Result<Event> {
        let event = Event {
            work_order_id: work_order_id.to_owned(),
            id: Ksuid::generate()?,
            kind,
            message,
            actor_email: actor_email.to_lowercase(),
            created_at: Utc::now(),
        };
        debug!(work_order = %work_order_id, event = %event.id, ?kind, "create event");

        self.events.create(event).send().await
    }

    pub async fn get_event(&self, work_order_id: &str, id: Ksuid) -> Result<Option<Event>> {
        self.events.get(&Event::primary_key_of(work_order_id, id)).await
    }

    pub async fn delete_event(&self, work_order_id: &str, id: Ksuid) -> Result<Option<Event>> {
        debug!(work_order = %work_order_id, event = %id, "delete event");
        self.events.delete(&Event::primary_key_of(work_order_id, id)).await
    }

    /// Newest first.
    pub async fn list_events(
        &self,
        work_order_id: &str,
        cursor: Option<Cursor>,
    ) -> Result<Page<Event>> {
        self.list(
            &self.events,
            &patterns::EVENTS_BY_WORK_ORDER,
            work_order_id,
            cursor,
        )
        .await
    }
}
