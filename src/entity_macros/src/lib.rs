//! `#[derive(Entity)]`
//!
//! Struct-level attributes describe whole attributes, field-level
//! attributes contribute segments to them:
//!
//! ```ignore
//! #[derive(Entity, Serialize, Deserialize)]
//! #[sk(prefix = "STATUS")]
//! #[nk(name = "GSI1SK", prefix = "STATUS")]
//! struct WorkOrder {
//!     #[pk(prefix = "WO")]
//!     address_id: String,
//!     #[sk]
//!     #[nk(name = "GSI1SK")]
//!     status: WorkOrderStatus,
//!     #[nk(name = "GSI1PK", prefix = "PM", case = "lower")]
//!     property_manager_email: String,
//!     #[nk(name = "GSI2PK", prefix = "TECH", case = "lower")]
//!     technician_email: Option<String>,
//! }
//! ```
//!
//! * `#[pk(name, prefix, suffix)]` / `#[sk(name, prefix, suffix, value)]` on
//!   the struct name the key attributes (default `pk`/`sk`) and add literal
//!   segments around the field segments. `value` makes the sort key static.
//! * `#[pk(prefix, order, case)]` / `#[sk(..)]` on a field add one segment,
//!   rendered `PREFIX#value`. Several fields need distinct `order`s.
//! * `#[nk(name, prefix, order, case)]` on a field feeds the non-key
//!   attribute `name` (default: the field name). An `Option` field makes the
//!   attribute sparse: it is left out of the item while the field is `None`.
//!
//! The derive emits `impl entity_core::Entity`, an inherent
//! `primary_key_of(..)` taking the key fields in order, and a
//! `<Name>Setters` trait with one `set_<field>` per field for
//! `entity_core::UpdateBuilder`.

mod codegen;
mod parser;
mod schema;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

#[proc_macro_derive(Entity, attributes(pk, sk, nk))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    parser::parse_entity(&input)
        .and_then(schema::build_model)
        .map(|model| codegen::generate_impl(&input, &model))
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
