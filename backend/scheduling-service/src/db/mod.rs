//! Persistent store seam. The record services speak [`ScheduleStore`];
//! production wires in the Postgres implementation, the integration suite an
//! in-memory one.

mod pg;

pub use pg::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{Appointment, Role, User};

#[derive(Debug, Error)]
pub enum StoreError {
    /// Uniqueness violation, surfaced to callers as a conflict.
    #[error("{0}")]
    Conflict(String),

    /// Any other store-layer fault. The message stays internal.
    #[error("{0}")]
    Unavailable(String),
}

/// Field set for inserting a user. The password arrives already hashed;
/// the store never sees a clear-text secret.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub area: Option<String>,
    pub room: Option<String>,
}

/// Partial user update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserRecordChanges {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub area: Option<String>,
    pub room: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAppointmentRecord {
    pub scheduled_at: DateTime<Utc>,
    pub appointment_type: Option<String>,
    pub room: Option<String>,
    pub patient_id: i64,
    pub doctor_id: i64,
}

/// Partial appointment update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct AppointmentRecordChanges {
    pub scheduled_at: Option<DateTime<Utc>>,
    pub appointment_type: Option<String>,
    pub room: Option<String>,
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
}

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    async fn list_users_by_role(&self, role: Role) -> Result<Vec<User>, StoreError>;
    async fn create_user(&self, record: NewUserRecord) -> Result<User, StoreError>;
    async fn update_user(
        &self,
        id: i64,
        changes: UserRecordChanges,
    ) -> Result<Option<User>, StoreError>;
    async fn delete_user(&self, id: i64) -> Result<bool, StoreError>;
    /// True while any appointment still references the user on either side.
    async fn user_has_appointments(&self, user_id: i64) -> Result<bool, StoreError>;

    async fn find_appointment(&self, id: i64) -> Result<Option<Appointment>, StoreError>;
    async fn list_appointments_for_doctor(
        &self,
        doctor_id: i64,
    ) -> Result<Vec<Appointment>, StoreError>;
    async fn list_appointments_for_patient(
        &self,
        patient_id: i64,
    ) -> Result<Vec<Appointment>, StoreError>;
    async fn create_appointment(
        &self,
        record: NewAppointmentRecord,
    ) -> Result<Appointment, StoreError>;
    /// Applies `changes` only while the stored revision still equals
    /// `current_revision`; returns `None` when the record moved underneath
    /// the caller.
    async fn update_appointment(
        &self,
        id: i64,
        current_revision: i64,
        changes: AppointmentRecordChanges,
    ) -> Result<Option<Appointment>, StoreError>;
    async fn delete_appointment(&self, id: i64) -> Result<bool, StoreError>;
}
