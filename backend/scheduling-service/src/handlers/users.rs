use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::models::{CreateUserRequest, Identity, UpdateUserRequest};
use crate::AppState;

/// GET /api/v1/users
pub async fn list_users(state: web::Data<AppState>, actor: Identity) -> Result<HttpResponse> {
    let users = state.users.list(actor).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// GET /api/v1/users/doctors
pub async fn list_doctors(state: web::Data<AppState>, actor: Identity) -> Result<HttpResponse> {
    let doctors = state.users.list_doctors(actor).await?;
    Ok(HttpResponse::Ok().json(doctors))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    state: web::Data<AppState>,
    actor: Identity,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user = state.users.get(actor, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// POST /api/v1/users
pub async fn create_user(
    state: web::Data<AppState>,
    actor: Identity,
    payload: web::Json<CreateUserRequest>,
) -> Result<HttpResponse> {
    let user = state.users.create(actor, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// PUT /api/v1/users/{id}
pub async fn update_user(
    state: web::Data<AppState>,
    actor: Identity,
    path: web::Path<i64>,
    payload: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse> {
    let user = state
        .users
        .update(actor, path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(user))
}

/// DELETE /api/v1/users/{id}
pub async fn delete_user(
    state: web::Data<AppState>,
    actor: Identity,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    state.users.delete(actor, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "user deleted"
    })))
}
