//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, categories, health, loans, requests, returns, stats, tools, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Toolshed API",
        version = "1.0.0",
        description = "Tool Lending Management System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "API root")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        auth::update_profile,
        auth::change_password,
        auth::request_reset,
        auth::reset_password,
        // Tools
        tools::list_tools,
        tools::get_tool,
        tools::get_tool_by_qr,
        tools::create_tool,
        tools::update_tool,
        tools::delete_tool,
        tools::tool_history,
        // Categories
        categories::list_categories,
        // Requests
        requests::create_request,
        requests::list_my_requests,
        requests::list_requests,
        requests::approve_request,
        requests::reject_request,
        requests::cancel_request,
        // Loans
        loans::create_loan,
        loans::return_loan,
        loans::list_loans,
        loans::list_active_loans,
        loans::list_my_loans,
        loans::list_my_active_loans,
        loans::get_loan,
        // Returns
        returns::submit_return,
        returns::list_my_returns,
        returns::list_returns,
        returns::loan_by_qr,
        returns::approve_return,
        returns::reject_return,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::set_user_role,
        users::delete_user,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::AuthResponse,
            auth::UserResponse,
            auth::ChangePasswordRequest,
            auth::RequestResetRequest,
            auth::ResetPasswordRequest,
            // Tools
            crate::models::tool::Tool,
            crate::models::tool::ToolDetails,
            crate::models::tool::CreateTool,
            crate::models::tool::UpdateTool,
            crate::models::enums::ToolState,
            tools::ToolListResponse,
            tools::ToolResponse,
            tools::ToolCreatedResponse,
            tools::ToolHistoryResponse,
            // Categories
            crate::models::category::Category,
            categories::CategoryListResponse,
            // Requests
            crate::models::request::CreateRequest,
            crate::models::request::RequestDetails,
            crate::models::request::ReviewRequest,
            crate::models::enums::RequestState,
            requests::RequestListResponse,
            requests::RequestResponse,
            requests::ApproveResponse,
            // Loans
            crate::models::loan::CreateLoan,
            crate::models::loan::DirectReturn,
            crate::models::loan::LoanDetails,
            crate::models::enums::LoanState,
            loans::LoanListResponse,
            loans::LoanResponse,
            // Returns
            crate::models::tool_return::CreateReturn,
            crate::models::tool_return::ApproveReturn,
            crate::models::tool_return::RejectReturn,
            crate::models::tool_return::ReturnDetails,
            crate::models::enums::ReturnState,
            returns::ReturnListResponse,
            returns::ReturnResponse,
            returns::LoanByQrResponse,
            // Users
            crate::models::user::UserPublic,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            crate::models::user::UpdateProfile,
            crate::models::enums::Role,
            users::UserListResponse,
            users::UserDetailResponse,
            users::SetRoleRequest,
            // History
            crate::models::history::HistoryEntry,
            // Stats
            stats::StatEntry,
            stats::TrendEntry,
            stats::StatsResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
            crate::api::MessageResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication and account endpoints"),
        (name = "tools", description = "Tool registry"),
        (name = "categories", description = "Tool categories"),
        (name = "requests", description = "Borrow requests"),
        (name = "loans", description = "Loan ledger"),
        (name = "returns", description = "Return review"),
        (name = "users", description = "User management"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
