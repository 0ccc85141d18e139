use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Closed set of actor roles. All authorization branching is an exhaustive
/// `match` over this enum; an unknown role value is rejected at
/// deserialization and never reaches policy code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verified `(id, role)` pair for the current request, produced by the
/// bearer-token middleware and consumed by every policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub role: Role,
}

/// Stored user record. Deliberately not `Serialize`: every read path goes
/// through [`UserView`], which structurally cannot carry the password hash.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub area: Option<String>,
    pub room: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored appointment record. `revision` is a monotonically increasing
/// counter bumped on every update; callers may supply it back to detect
/// concurrent modification.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Appointment {
    pub id: i64,
    pub scheduled_at: DateTime<Utc>,
    pub appointment_type: Option<String>,
    pub room: Option<String>,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub revision: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==============================
// Request payloads
// ==============================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub area: Option<String>,
    pub room: Option<String>,
}

/// Partial user update. Role is intentionally absent: roles are immutable
/// once assigned.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub area: Option<String>,
    pub room: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    pub scheduled_at: DateTime<Utc>,
    pub appointment_type: Option<String>,
    pub room: Option<String>,
    pub patient_id: i64,
    pub doctor_id: i64,
}

/// Partial appointment update. `expected_revision`, when supplied, must
/// match the stored revision or the update is rejected with a conflict.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub scheduled_at: Option<DateTime<Utc>>,
    pub appointment_type: Option<String>,
    pub room: Option<String>,
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub expected_revision: Option<i64>,
}

impl UpdateAppointmentRequest {
    pub fn is_empty(&self) -> bool {
        self.scheduled_at.is_none()
            && self.appointment_type.is_none()
            && self.room.is_none()
            && self.patient_id.is_none()
            && self.doctor_id.is_none()
    }

    /// True when the payload touches anything beyond the scheduled instant.
    pub fn touches_non_date_fields(&self) -> bool {
        self.appointment_type.is_some()
            || self.room.is_some()
            || self.patient_id.is_some()
            || self.doctor_id.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// ==============================
// Projections
// ==============================

/// Role-safe user projection. The only user shape that crosses the API
/// boundary; the password hash has no representation here.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub area: Option<String>,
    pub room: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        UserView {
            id: u.id,
            username: u.username,
            role: u.role,
            area: u.area,
            room: u.room,
            created_at: u.created_at,
        }
    }
}

/// Minimal doctor projection for selection UIs.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorOption {
    pub id: i64,
    pub username: String,
}

/// One row of a doctor's schedule, with the patient's username attached and
/// the doctor's area/room duplicated onto every row.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorScheduleEntry {
    pub id: i64,
    pub scheduled_at: DateTime<Utc>,
    pub appointment_type: Option<String>,
    pub room: Option<String>,
    pub patient_id: i64,
    pub patient_name: String,
    pub doctor_area: Option<String>,
    pub doctor_room: Option<String>,
    pub revision: i64,
}

/// One row of a patient's schedule. Exposes the doctor's username and
/// practice details only, never internal doctor state.
#[derive(Debug, Clone, Serialize)]
pub struct PatientScheduleEntry {
    pub id: i64,
    pub scheduled_at: DateTime<Utc>,
    pub appointment_type: Option<String>,
    pub room: Option<String>,
    pub doctor_username: String,
    pub doctor_area: Option<String>,
    pub doctor_room: Option<String>,
    pub revision: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub user: UserView,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}
