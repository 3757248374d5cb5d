//! Data models for LabTrack

pub mod asset;
pub mod daily_report;
pub mod form_request;
pub mod laboratory;
pub mod maintenance;
pub mod procedure;
pub mod user;
pub mod workstation;

// Re-export commonly used types
pub use asset::{Asset, AssetStatus};
pub use daily_report::{DailyReport, DailyReportDetails};
pub use form_request::{FormDetails, FormRequest};
pub use laboratory::Laboratory;
pub use maintenance::{PmcReport, ServiceAction, ServiceLog};
pub use procedure::{Procedure, ProcedureCategory};
pub use user::{Role, User, UserClaims};
pub use workstation::{Workstation, WorkstationDetails, WorkstationSummary};
