//! Business rules shared by the maintenance and approval workflows
//!
//! Everything in here is pure: no database access, no clock. Services feed
//! these functions with rows they loaded and persist what comes back.

pub mod approval;
pub mod quarter;
pub mod scope;
pub mod status;

pub use approval::{FormAction, FormStatus, FormType};
pub use quarter::Quarter;
pub use scope::{scope_to_caller, AccessScope};
pub use status::{aggregate_status, is_healthy, is_system_component, WorkstationStatus};
