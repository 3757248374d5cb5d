//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{
    auth, daily_reports, forms, health, inventory, laboratories, maintenance, procedures, public_forms, users,
    workstations,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LabTrack API",
        version = "0.4.0",
        description = "Laboratory asset, maintenance and request management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        // Laboratories
        laboratories::list_laboratories,
        laboratories::get_laboratory,
        laboratories::create_laboratory,
        laboratories::update_laboratory,
        laboratories::delete_laboratory,
        laboratories::assign_custodian,
        // Workstations
        workstations::list_workstations,
        workstations::get_workstation,
        workstations::create_workstation,
        workstations::update_workstation,
        workstations::delete_workstation,
        workstations::list_service_logs,
        // Inventory
        inventory::list_assets,
        inventory::get_asset,
        inventory::create_asset,
        inventory::create_asset_batch,
        inventory::update_asset,
        inventory::delete_asset,
        inventory::list_statuses,
        inventory::status_summary,
        // Maintenance
        maintenance::list_reports,
        maintenance::submit_report,
        maintenance::get_report,
        maintenance::export_report,
        maintenance::quarter_status,
        maintenance::create_repair_log,
        // Procedures
        procedures::list_procedures,
        procedures::create_procedure,
        procedures::update_procedure,
        procedures::delete_procedure,
        // Daily reports
        daily_reports::list_daily_reports,
        daily_reports::get_daily_report,
        daily_reports::create_daily_report,
        daily_reports::delete_daily_report,
        // Forms
        forms::list_forms,
        forms::get_form,
        forms::approve_form,
        forms::reject_form,
        public_forms::submit_lab_request,
        public_forms::submit_equipment_borrow,
        public_forms::submit_software_installation,
        public_forms::list_laboratories,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            // Users
            crate::models::user::Role,
            crate::models::user::User,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            // Laboratories
            crate::models::laboratory::Laboratory,
            crate::models::laboratory::LaboratoryDetails,
            crate::models::laboratory::LaboratoryOption,
            crate::models::laboratory::CreateLaboratory,
            crate::models::laboratory::UpdateLaboratory,
            crate::models::laboratory::AssignCustodian,
            // Workstations
            crate::models::workstation::Workstation,
            crate::models::workstation::WorkstationSummary,
            crate::models::workstation::WorkstationDetails,
            crate::models::workstation::CreateWorkstation,
            crate::models::workstation::UpdateWorkstation,
            crate::rules::WorkstationStatus,
            // Inventory
            crate::models::asset::Asset,
            crate::models::asset::AssetStatus,
            crate::models::asset::CreateAsset,
            crate::models::asset::CreateAssetBatch,
            crate::models::asset::UpdateAsset,
            crate::models::asset::StatusCount,
            // Maintenance
            crate::models::maintenance::ServiceAction,
            crate::models::maintenance::LogType,
            crate::models::maintenance::AssetActionRecord,
            crate::models::maintenance::PmcReport,
            crate::models::maintenance::PmcReportListing,
            crate::models::maintenance::PmcReportDetails,
            crate::models::maintenance::ServiceLog,
            crate::models::maintenance::MaintenanceOutcome,
            crate::models::maintenance::ServiceState,
            crate::models::maintenance::WorkstationServiceState,
            crate::models::maintenance::MaintenanceAssetAction,
            crate::models::maintenance::SubmitMaintenance,
            crate::models::maintenance::RepairAssetAction,
            crate::models::maintenance::CreateRepairLog,
            crate::models::maintenance::ExportAssetRow,
            crate::models::maintenance::PmcExport,
            // Procedures and daily reports
            crate::models::procedure::ProcedureCategory,
            crate::models::procedure::Procedure,
            crate::models::procedure::CreateProcedure,
            crate::models::procedure::UpdateProcedure,
            crate::models::daily_report::DailyReport,
            crate::models::daily_report::DailyReportEntry,
            crate::models::daily_report::DailyReportDetails,
            crate::models::daily_report::CreateDailyReport,
            crate::models::daily_report::CreateDailyReportEntry,
            // Forms
            crate::rules::FormType,
            crate::rules::FormStatus,
            crate::models::form_request::FormDetails,
            crate::models::form_request::FormRequest,
            crate::models::form_request::SubmitFormRequest,
            crate::models::form_request::RejectForm,
            crate::models::form_request::FormReceipt,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User management"),
        (name = "laboratories", description = "Laboratory management"),
        (name = "workstations", description = "Workstations and their live status"),
        (name = "inventory", description = "Inventory assets"),
        (name = "maintenance", description = "Quarterly preventive maintenance and repairs"),
        (name = "procedures", description = "Checklist procedures"),
        (name = "daily-reports", description = "Daily activity reports"),
        (name = "forms", description = "Review of submitted requests"),
        (name = "public-forms", description = "Public request forms")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
