use super::ApiError;
use super::dto::{
    AddressFields, AddressKey, ApiResult, AssignTechnician, CreateEvent, CreateOrganization,
    CreateProperty, CreateUser, CreateWorkOrder, OrganizationKey, OrganizationPage, PageBody,
    PropertyManagerPage, RemoveTechnician, TechnicianPage, TenantPage, UpdateStatus, UserEmail,
    UserKey, WorkOrderKey, WorkOrderPage, acknowledged, cursor, present, required, respond,
};
use crate::service::Service;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::{Value, json};

type Payload<T> = Result<Json<T>, JsonRejection>;

pub async fn health() -> Json<Value> {
    Json(json!({ "response": "ok" }))
}

//
// ─── ORGANIZATIONS ──────────────────────────────────────────────────────────────
//
pub async fn create_organization(
    State(service): State<Service>,
    payload: Payload<CreateOrganization>,
) -> ApiResult {
    let Json(req) = payload?;
    let name = required("name", &req.name)?.to_owned();
    let id = req.id.filter(|id| !id.trim().is_empty());

    respond(&service.create_organization(name, id).await?)
}

pub async fn get_organization(
    State(service): State<Service>,
    payload: Payload<OrganizationKey>,
) -> ApiResult {
    let Json(req) = payload?;
    let id = required("id", &req.id)?;

    respond(&service.get_organization(id).await?)
}

pub async fn delete_organization(
    State(service): State<Service>,
    payload: Payload<OrganizationKey>,
) -> ApiResult {
    let Json(req) = payload?;
    service
        .delete_organization(required("id", &req.id)?)
        .await?;

    acknowledged()
}

pub async fn list_organization_members(
    State(service): State<Service>,
    payload: Payload<OrganizationPage>,
) -> ApiResult {
    let Json(req) = payload?;
    let organization_id = required("organizationId", &req.organization_id)?;
    let page = service
        .list_organization_members(organization_id, cursor(req.cursor.as_deref())?)
        .await?;

    respond(&PageBody::from(page))
}

//
// ─── USERS ──────────────────────────────────────────────────────────────────────
//
pub async fn create_user(
    State(service): State<Service>,
    payload: Payload<CreateUser>,
) -> ApiResult {
    let Json(req) = payload?;

    respond(&service.create_user(req.into_profile()?).await?)
}

pub async fn get_user(State(service): State<Service>, payload: Payload<UserKey>) -> ApiResult {
    let Json(req) = payload?;
    let email = required("email", &req.email)?;
    let role = present("role", req.role)?;

    respond(&service.get_user(email, role).await?)
}

/// Deletes only the record for the given role.
pub async fn delete_user(State(service): State<Service>, payload: Payload<UserKey>) -> ApiResult {
    let Json(req) = payload?;
    let email = required("email", &req.email)?;
    let role = present("role", req.role)?;
    service.delete_user_role(email, role).await?;

    acknowledged()
}

pub async fn list_user_roles(
    State(service): State<Service>,
    payload: Payload<UserEmail>,
) -> ApiResult {
    let Json(req) = payload?;
    let email = required("email", &req.email)?;

    respond(&service.list_user_roles(email).await?)
}

pub async fn list_tenants(
    State(service): State<Service>,
    payload: Payload<PropertyManagerPage>,
) -> ApiResult {
    let Json(req) = payload?;
    let email = required("propertyManagerEmail", &req.property_manager_email)?;
    let page = service
        .list_tenants(email, cursor(req.cursor.as_deref())?)
        .await?;

    respond(&PageBody::from(page))
}

//
// ─── PROPERTIES ─────────────────────────────────────────────────────────────────
//
pub async fn create_property(
    State(service): State<Service>,
    payload: Payload<CreateProperty>,
) -> ApiResult {
    let Json(req) = payload?;

    respond(&service.create_property(req.into_property()?).await?)
}

pub async fn get_property(
    State(service): State<Service>,
    payload: Payload<AddressFields>,
) -> ApiResult {
    let Json(req) = payload?;

    respond(&service.get_property(&req.into_address()?).await?)
}

pub async fn delete_property(
    State(service): State<Service>,
    payload: Payload<AddressFields>,
) -> ApiResult {
    let Json(req) = payload?;
    service.delete_property(&req.into_address()?).await?;

    acknowledged()
}

pub async fn list_properties(
    State(service): State<Service>,
    payload: Payload<PropertyManagerPage>,
) -> ApiResult {
    let Json(req) = payload?;
    let email = required("propertyManagerEmail", &req.property_manager_email)?;
    let page = service
        .list_properties(email, cursor(req.cursor.as_deref())?)
        .await?;

    respond(&PageBody::from(page))
}

//
// ─── WORK ORDERS ────────────────────────────────────────────────────────────────
//
pub async fn create_work_order(
    State(service): State<Service>,
    payload: Payload<CreateWorkOrder>,
) -> ApiResult {
    let Json(req) = payload?;

    respond(&service.create_work_order(req.into_new()?).await?)
}

pub async fn get_work_order(
    State(service): State<Service>,
    payload: Payload<WorkOrderKey>,
) -> ApiResult {
    let Json(req) = payload?;
    let address_id = required("addressId", &req.address_id)?;
    let status = present("status", req.status)?;

    respond(&service.get_work_order(address_id, status).await?)
}

pub async fn update_work_order_status(
    State(service): State<Service>,
    payload: Payload<UpdateStatus>,
) -> ApiResult {
    let Json(req) = payload?;
    let address_id = required("addressId", &req.address_id)?;
    let status = present("status", req.status)?;
    let new_status = present("newStatus", req.new_status)?;
    let actor = required("actorEmail", &req.actor_email)?;

    let updated = service
        .update_work_order_status(address_id, status, new_status, actor)
        .await?
        .ok_or(ApiError::NotFound("work order"))?;

    respond(&updated)
}

pub async fn assign_technician(
    State(service): State<Service>,
    payload: Payload<AssignTechnician>,
) -> ApiResult {
    let Json(req) = payload?;
    let address_id = required("addressId", &req.address_id)?;
    let status = present("status", req.status)?;
    let technician = required("technicianEmail", &req.technician_email)?;
    let actor = required("actorEmail", &req.actor_email)?;

    let updated = service
        .assign_technician(address_id, status, technician, actor)
        .await?
        .ok_or(ApiError::NotFound("work order"))?;

    respond(&updated)
}

pub async fn remove_technician(
    State(service): State<Service>,
    payload: Payload<RemoveTechnician>,
) -> ApiResult {
    let Json(req) = payload?;
    let address_id = required("addressId", &req.address_id)?;
    let status = present("status", req.status)?;
    let actor = required("actorEmail", &req.actor_email)?;

    let updated = service
        .remove_technician(address_id, status, actor)
        .await?
        .ok_or(ApiError::NotFound("work order"))?;

    respond(&updated)
}

pub async fn list_work_orders_by_property_manager(
    State(service): State<Service>,
    payload: Payload<PropertyManagerPage>,
) -> ApiResult {
    let Json(req) = payload?;
    let email = required("propertyManagerEmail", &req.property_manager_email)?;
    let page = service
        .list_work_orders_by_property_manager(email, cursor(req.cursor.as_deref())?)
        .await?;

    respond(&PageBody::from(page))
}

pub async fn list_work_orders_by_technician(
    State(service): State<Service>,
    payload: Payload<TechnicianPage>,
) -> ApiResult {
    let Json(req) = payload?;
    let email = required("technicianEmail", &req.technician_email)?;
    let page = service
        .list_work_orders_by_technician(email, cursor(req.cursor.as_deref())?)
        .await?;

    respond(&PageBody::from(page))
}

pub async fn list_work_orders_by_tenant(
    State(service): State<Service>,
    payload: Payload<TenantPage>,
) -> ApiResult {
    let Json(req) = payload?;
    let email = required("tenantEmail", &req.tenant_email)?;
    let page = service
        .list_work_orders_by_tenant(email, cursor(req.cursor.as_deref())?)
        .await?;

    respond(&PageBody::from(page))
}

pub async fn list_work_orders_by_organization(
    State(service): State<Service>,
    payload: Payload<OrganizationPage>,
) -> ApiResult {
    let Json(req) = payload?;
    let organization_id = required("organizationId", &req.organization_id)?;
    let page = service
        .list_work_orders_by_organization(organization_id, cursor(req.cursor.as_deref())?)
        .await?;

    respond(&PageBody::from(page))
}

/// Every page, not just the first.
pub async fn list_work_orders_by_address(
    State(service): State<Service>,
    payload: Payload<AddressKey>,
) -> ApiResult {
    let Json(req) = payload?;
    let address_id = required("addressId", &req.address_id)?;

    respond(&service.list_work_orders_by_address(address_id).await?)
}

//
// ─── EVENTS ─────────────────────────────────────────────────────────────────────
//
pub async fn create_event(
    State(service): State<Service>,
    payload: Payload<CreateEvent>,
) -> ApiResult {
    let Json(req) = payload?;
    let work_order_id = required("workOrderId", &req.work_order_id)?;
    let message = required("message", &req.message)?.to_owned();
    let actor = required("actorEmail", &req.actor_email)?;

    let event = service
        .create_event(work_order_id, req.kind.unwrap_or_default(), message, actor)
        .await?;

    respond(&event)
}

pub async fn list_events(
    State(service): State<Service>,
    payload: Payload<WorkOrderPage>,
) -> ApiResult {
    let Json(req) = payload?;
    let work_order_id = required("workOrderId", &req.work_order_id)?;
    let page = service
        .list_events(work_order_id, cursor(req.cursor.as_deref())?)
        .await?;

    respond(&PageBody::from(page))
}
