//! OpenAPI document. Request bodies are mirrored here as schema-only structs so the
//! service crate stays free of documentation derives.
#![allow(dead_code)]

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String, pub message: String, pub timestamp: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    /// TECHNICIAN or USER; privileged roles are rejected.
    pub role: Option<String>,
    pub team_id: Option<Uuid>,
}

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct VerifyRequest { pub email: String, pub code: String }

#[derive(ToSchema)]
pub struct ForgotPasswordRequest { pub email: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ResetPasswordRequest { pub token: String, pub new_password: String }

#[derive(ToSchema)]
pub struct DepartmentInput { pub name: String, pub description: Option<String>, pub location: Option<String> }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct EquipmentInput {
    pub name: String,
    pub serial_number: String,
    pub category: String,
    pub purchase_date: String,
    pub warranty_expiry: Option<String>,
    pub location: String,
    pub status: Option<String>,
    pub department_id: Option<Uuid>,
    pub maintenance_team_id: Uuid,
    pub owner_id: Option<Uuid>,
}

#[derive(ToSchema)]
pub struct CountResponse { pub count: u64 }

#[derive(ToSchema)]
pub struct TeamInput { pub name: String, pub specialty: String, pub description: Option<String> }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct AddMemberInput { pub user_id: Uuid }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct PartInput {
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub min_quantity: i32,
    pub cost: f64,
    pub location: Option<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct RequestInput {
    pub subject: String,
    pub description: Option<String>,
    /// CORRECTIVE or PREVENTIVE
    pub request_type: String,
    pub priority: Option<String>,
    pub equipment_id: Uuid,
    pub scheduled_date: Option<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct RequestUpdateInput {
    pub subject: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    /// `null` clears the schedule
    pub scheduled_date: Option<String>,
    pub duration_hours: Option<f64>,
    pub completion_notes: Option<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct AssignInput { pub technician_id: Uuid }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct CompleteInput { pub duration_hours: Option<f64>, pub completion_notes: Option<String> }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ScrapInput { pub completion_notes: Option<String> }

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "GearGuard", description = "Maintenance tracking API"),
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::verify,
        crate::routes::auth::forgot_password,
        crate::routes::auth::reset_password,
        crate::routes::auth::me,
        crate::routes::auth::logout,
        crate::routes::departments::list,
        crate::routes::departments::get_one,
        crate::routes::departments::create,
        crate::routes::departments::update,
        crate::routes::departments::remove,
        crate::routes::equipment::list,
        crate::routes::equipment::get_one,
        crate::routes::equipment::create,
        crate::routes::equipment::update,
        crate::routes::equipment::remove,
        crate::routes::equipment::requests,
        crate::routes::equipment::requests_count,
        crate::routes::teams::list,
        crate::routes::teams::get_one,
        crate::routes::teams::create,
        crate::routes::teams::update,
        crate::routes::teams::remove,
        crate::routes::teams::add_member,
        crate::routes::teams::remove_member,
        crate::routes::parts::list,
        crate::routes::parts::low_stock,
        crate::routes::parts::get_one,
        crate::routes::parts::create,
        crate::routes::parts::update,
        crate::routes::parts::remove,
        crate::routes::requests::create,
        crate::routes::requests::list,
        crate::routes::requests::kanban,
        crate::routes::requests::calendar,
        crate::routes::requests::overdue,
        crate::routes::requests::pivot,
        crate::routes::requests::get_one,
        crate::routes::requests::update,
        crate::routes::requests::remove,
        crate::routes::requests::assign,
        crate::routes::requests::start,
        crate::routes::requests::complete,
        crate::routes::requests::scrap,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            VerifyRequest,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            DepartmentInput,
            EquipmentInput,
            CountResponse,
            TeamInput,
            AddMemberInput,
            PartInput,
            RequestInput,
            RequestUpdateInput,
            AssignInput,
            CompleteInput,
            ScrapInput,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "departments"),
        (name = "equipment"),
        (name = "teams"),
        (name = "parts"),
        (name = "requests")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_workflow_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/requests/{id}/scrap"));
        assert!(paths.contains_key("/api/parts/low-stock"));
        assert!(paths.contains_key("/api/auth/register"));
        assert!(doc.components.as_ref().is_some_and(|c| c.security_schemes.contains_key("bearer")));
    }
}
