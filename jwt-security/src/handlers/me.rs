use axum::Json;

use crate::middleware::AuthUser;
use crate::services::TokenClaims;

/// Claims carried by the caller's bearer token
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Claims of the bearer token"),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "Token",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me(AuthUser(claims): AuthUser) -> Json<TokenClaims> {
    Json(claims)
}
