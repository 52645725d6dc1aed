//! Request bodies and the response envelope.
//!
//! Every field is optional at the serde level so a missing field is
//! reported by name as a 400 instead of a generic body rejection.

use super::ApiError;
use crate::domain::{EventKind, Property, PropertyAddress, Role, UserProfile, WorkOrderStatus};
use crate::service::NewWorkOrder;
use axum::Json;
use entity_core::{Cursor, Page};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub type ApiResult = Result<Json<Value>, ApiError>;

/// `{"response": "<json>"}`: the payload is JSON-encoded into a string.
pub fn respond<T: Serialize>(value: &T) -> ApiResult {
    let encoded = serde_json::to_string(value).map_err(entity_core::Error::from)?;

    Ok(Json(json!({ "response": encoded })))
}

/// `{"response": true}`
pub fn acknowledged() -> ApiResult {
    Ok(Json(json!({ "response": true })))
}

pub fn required<'a>(field: &'static str, value: &'a Option<String>) -> Result<&'a str, ApiError> {
    match value.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ApiError::MissingField(field)),
    }
}

fn required_owned(field: &'static str, value: Option<String>) -> Result<String, ApiError> {
    required(field, &value)?;
    Ok(value.unwrap_or_default().trim().to_owned())
}

pub fn present<T>(field: &'static str, value: Option<T>) -> Result<T, ApiError> {
    value.ok_or(ApiError::MissingField(field))
}

/// Blank optional fields count as absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

pub fn cursor(token: Option<&str>) -> Result<Option<Cursor>, ApiError> {
    match token {
        None | Some("") => Ok(None),
        Some(token) => Ok(Some(Cursor::decode(token)?)),
    }
}

///
/// PageBody
///

#[derive(Debug, Serialize)]
pub struct PageBody<T> {
    pub items: Vec<T>,
    /// Pass back unchanged to continue; `null` on the last page.
    pub cursor: Option<String>,
}

impl<T> From<Page<T>> for PageBody<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            items: page.items,
            cursor: page.cursor.as_ref().map(Cursor::encode),
        }
    }
}

//
// ─── ORGANIZATIONS ──────────────────────────────────────────────────────────────
//
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateOrganization {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizationKey {
    pub id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizationPage {
    pub organization_id: Option<String>,
    pub cursor: Option<String>,
}

//
// ─── USERS ──────────────────────────────────────────────────────────────────────
//
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateUser {
    pub email: Option<String>,
    pub role: Option<Role>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub organization_id: Option<String>,
    pub property_manager_email: Option<String>,
}

impl CreateUser {
    pub fn into_profile(self) -> Result<UserProfile, ApiError> {
        Ok(UserProfile {
            email: required_owned("email", self.email)?,
            role: present("role", self.role)?,
            first_name: required_owned("firstName", self.first_name)?,
            last_name: required_owned("lastName", self.last_name)?,
            phone: self.phone.unwrap_or_default(),
            organization_id: non_empty(self.organization_id),
            property_manager_email: non_empty(self.property_manager_email),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserKey {
    pub email: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserEmail {
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyManagerPage {
    pub property_manager_email: Option<String>,
    pub cursor: Option<String>,
}

//
// ─── PROPERTIES ─────────────────────────────────────────────────────────────────
//
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressFields {
    pub property_manager_email: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub unit: Option<String>,
}

impl AddressFields {
    pub fn into_address(self) -> Result<PropertyAddress, ApiError> {
        Ok(PropertyAddress {
            property_manager_email: required_owned(
                "propertyManagerEmail",
                self.property_manager_email,
            )?,
            address: required_owned("address", self.address)?,
            country: required_owned("country", self.country)?,
            city: required_owned("city", self.city)?,
            state: required_owned("state", self.state)?,
            postal_code: required_owned("postalCode", self.postal_code)?,
            unit: self.unit.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateProperty {
    pub address_id: Option<String>,
    #[serde(flatten)]
    pub address: AddressFields,
    pub num_beds: Option<u16>,
    pub num_baths: Option<f32>,
}

impl CreateProperty {
    pub fn into_property(self) -> Result<Property, ApiError> {
        let address = self.address.into_address()?;

        Ok(Property {
            address_id: non_empty(self.address_id).unwrap_or_default(),
            property_manager_email: address.property_manager_email,
            address: address.address,
            country: address.country,
            city: address.city,
            state: address.state,
            postal_code: address.postal_code,
            unit: address.unit,
            num_beds: self.num_beds.unwrap_or_default(),
            num_baths: self.num_baths.unwrap_or_default(),
        })
    }
}

//
// ─── WORK ORDERS ────────────────────────────────────────────────────────────────
//
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateWorkOrder {
    pub address_id: Option<String>,
    pub issue: Option<String>,
    pub location: Option<String>,
    pub additional_details: Option<String>,
    pub permission_to_enter: Option<bool>,
    pub property_manager_email: Option<String>,
    pub tenant_email: Option<String>,
    pub organization_id: Option<String>,
    pub status: Option<WorkOrderStatus>,
}

impl CreateWorkOrder {
    pub fn into_new(self) -> Result<NewWorkOrder, ApiError> {
        Ok(NewWorkOrder {
            address_id: required_owned("addressId", self.address_id)?,
            issue: required_owned("issue", self.issue)?,
            location: self.location.unwrap_or_default(),
            additional_details: self.additional_details.unwrap_or_default(),
            permission_to_enter: self.permission_to_enter.unwrap_or_default(),
            property_manager_email: required_owned(
                "propertyManagerEmail",
                self.property_manager_email,
            )?,
            tenant_email: non_empty(self.tenant_email),
            organization_id: non_empty(self.organization_id),
            status: self.status,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkOrderKey {
    pub address_id: Option<String>,
    pub status: Option<WorkOrderStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateStatus {
    pub address_id: Option<String>,
    pub status: Option<WorkOrderStatus>,
    pub new_status: Option<WorkOrderStatus>,
    pub actor_email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssignTechnician {
    pub address_id: Option<String>,
    pub status: Option<WorkOrderStatus>,
    pub technician_email: Option<String>,
    pub actor_email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoveTechnician {
    pub address_id: Option<String>,
    pub status: Option<WorkOrderStatus>,
    pub actor_email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TechnicianPage {
    pub technician_email: Option<String>,
    pub cursor: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TenantPage {
    pub tenant_email: Option<String>,
    pub cursor: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressKey {
    pub address_id: Option<String>,
}

//
// ─── EVENTS ─────────────────────────────────────────────────────────────────────
//
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateEvent {
    pub work_order_id: Option<String>,
    pub kind: Option<EventKind>,
    pub message: Option<String>,
    pub actor_email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkOrderPage {
    pub work_order_id: Option<String>,
    pub cursor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_required_field_is_missing() {
        let err = required("email", &Some("  ".to_owned())).unwrap_err();
        assert!(matches!(err, ApiError::MissingField("email")));
        assert_eq!(required("email", &Some(" a@b.c ".to_owned())).unwrap(), "a@b.c");
    }

    #[test]
    fn response_payload_is_double_encoded() {
        let Json(body) = respond(&json!({ "id": "x" })).unwrap();
        assert_eq!(body["response"], r#"{"id":"x"}"#);
    }

    #[test]
    fn empty_cursor_starts_from_the_beginning() {
        assert!(cursor(None).unwrap().is_none());
        assert!(cursor(Some("")).unwrap().is_none());
        assert!(matches!(
            cursor(Some("not json")),
            Err(ApiError::Store(entity_core::Error::InvalidCursor))
        ));
    }

    #[test]
    fn user_profile_blank_optionals_are_none() {
        let profile = CreateUser {
            email: Some("A@b.c".to_owned()),
            role: Some(Role::Tenant),
            first_name: Some("A".to_owned()),
            last_name: Some("B".to_owned()),
            organization_id: Some(" ".to_owned()),
            ..CreateUser::default()
        }
        .into_profile()
        .unwrap();
        assert_eq!(profile.organization_id, None);
        assert_eq!(profile.phone, "");
    }

    #[test]
    fn create_property_reads_flattened_address() {
        let body: CreateProperty = serde_json::from_value(json!({
            "propertyManagerEmail": "pm@x.io",
            "address": "1 Main",
            "country": "US",
            "city": "Boston",
            "state": "MA",
            "postalCode": "02101",
            "numBeds": 2
        }))
        .unwrap();
        let property = body.into_property().unwrap();
        assert_eq!(property.city, "Boston");
        assert_eq!(property.num_beds, 2);
        assert_eq!(property.unit, "");
    }
}
