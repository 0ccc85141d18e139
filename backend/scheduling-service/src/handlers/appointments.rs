use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::models::{CreateAppointmentRequest, Identity, UpdateAppointmentRequest};
use crate::AppState;

/// POST /api/v1/appointments
pub async fn create_appointment(
    state: web::Data<AppState>,
    actor: Identity,
    payload: web::Json<CreateAppointmentRequest>,
) -> Result<HttpResponse> {
    let appointment = state
        .appointments
        .create(actor, payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(appointment))
}

/// GET /api/v1/appointments/doctor/{doctor_id}
pub async fn doctor_schedule(
    state: web::Data<AppState>,
    actor: Identity,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let entries = state
        .appointments
        .list_for_doctor(actor, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(entries))
}

/// GET /api/v1/appointments/patient/{patient_id}
pub async fn patient_schedule(
    state: web::Data<AppState>,
    actor: Identity,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let entries = state
        .appointments
        .list_for_patient(actor, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(entries))
}

/// PATCH /api/v1/appointments/{id}
pub async fn update_appointment(
    state: web::Data<AppState>,
    actor: Identity,
    path: web::Path<i64>,
    payload: web::Json<UpdateAppointmentRequest>,
) -> Result<HttpResponse> {
    let appointment = state
        .appointments
        .update(actor, path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(appointment))
}

/// DELETE /api/v1/appointments/{id}
pub async fn delete_appointment(
    state: web::Data<AppState>,
    actor: Identity,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    state
        .appointments
        .delete(actor, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "appointment deleted"
    })))
}
