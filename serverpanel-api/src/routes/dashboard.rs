/// Dashboard endpoint
///
/// `GET /api/v1/dashboard/stats` returns resource counts. Tenants see their
/// own; admins see global counts plus users and packages.
use axum::extract::State;
use serde::Serialize;
use serverpanel_shared::{
    auth::middleware::AuthContext,
    models::{
        database::Database, domain::Domain, email_account::EmailAccount, package::Package,
        user::User,
    },
};

use crate::{app::AppState, error::ApiResult, response::ApiResponse};

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub domains: i64,
    pub databases: i64,
    pub email_accounts: i64,

    /// Admin only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<i64>,

    /// Admin only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packages: Option<i64>,
}

pub async fn stats(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<ApiResponse<DashboardStats>> {
    let scope = auth.owner_scope();

    let (users, packages) = if auth.is_admin() {
        (
            Some(User::count(&state.db).await?),
            Some(Package::count(&state.db).await?),
        )
    } else {
        (None, None)
    };

    Ok(ApiResponse::ok(DashboardStats {
        domains: Domain::count(&state.db, scope).await?,
        databases: Database::count(&state.db, scope).await?,
        email_accounts: EmailAccount::count(&state.db, scope).await?,
        users,
        packages,
    }))
}
