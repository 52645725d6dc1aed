//! JSON-over-HTTP boundary.
//!
//! Every operation is a `POST` with a JSON body and answers
//! `{"response": ...}`. Objects come back JSON-encoded as a string;
//! deletions answer `true`. Missing fields and bad cursors are 400, store
//! failures are logged and answered with a generic 500.

mod dto;
mod error;
mod handlers;

pub use dto::PageBody;
pub use error::ApiError;

use crate::service::Service;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub fn router(service: Service) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/organizations/create", post(handlers::create_organization))
        .route("/api/organizations/get", post(handlers::get_organization))
        .route("/api/organizations/delete", post(handlers::delete_organization))
        .route(
            "/api/organizations/members",
            post(handlers::list_organization_members),
        )
        .route("/api/users/create", post(handlers::create_user))
        .route("/api/users/get", post(handlers::get_user))
        .route("/api/users/delete", post(handlers::delete_user))
        .route("/api/users/roles", post(handlers::list_user_roles))
        .route(
            "/api/tenants/list-by-property-manager",
            post(handlers::list_tenants),
        )
        .route("/api/properties/create", post(handlers::create_property))
        .route("/api/properties/get", post(handlers::get_property))
        .route("/api/properties/delete", post(handlers::delete_property))
        .route(
            "/api/properties/list-by-property-manager",
            post(handlers::list_properties),
        )
        .route("/api/work-orders/create", post(handlers::create_work_order))
        .route("/api/work-orders/get", post(handlers::get_work_order))
        .route(
            "/api/work-orders/update-status",
            post(handlers::update_work_order_status),
        )
        .route(
            "/api/work-orders/assign-technician",
            post(handlers::assign_technician),
        )
        .route(
            "/api/work-orders/remove-technician",
            post(handlers::remove_technician),
        )
        .route(
            "/api/work-orders/list-by-property-manager",
            post(handlers::list_work_orders_by_property_manager),
        )
        .route(
            "/api/work-orders/list-by-technician",
            post(handlers::list_work_orders_by_technician),
        )
        .route(
            "/api/work-orders/list-by-tenant",
            post(handlers::list_work_orders_by_tenant),
        )
        .route(
            "/api/work-orders/list-by-organization",
            post(handlers::list_work_orders_by_organization),
        )
        .route(
            "/api/work-orders/list-by-address",
            post(handlers::list_work_orders_by_address),
        )
        .route("/api/events/create", post(handlers::create_event))
        .route("/api/events/list", post(handlers::list_events))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
