use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::models::LoginRequest;
use crate::AppState;

/// POST /api/v1/auth/login
pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let authenticated = state
        .users
        .authenticate(&payload.username, &payload.password)
        .await?;
    Ok(HttpResponse::Ok().json(authenticated))
}
