//! Entities stored in the single table.

mod event;
mod organization;
mod property;
mod user;
mod work_order;

pub use event::{Event, EventKind, EventSetters};
pub use organization::{Organization, OrganizationSetters};
pub use property::{Property, PropertyAddress, PropertySetters};
pub use user::{Role, UserProfile, UserProfileSetters};
pub use work_order::{WorkOrder, WorkOrderSetters, WorkOrderStatus};
