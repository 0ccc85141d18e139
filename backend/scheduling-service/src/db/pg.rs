/// Postgres-backed store. Uniqueness and referential integrity are enforced
/// by the schema; unique violations are translated into conflicts, every
/// other fault into `StoreError::Unavailable`.
use async_trait::async_trait;
use sqlx::PgPool;

use super::{
    AppointmentRecordChanges, NewAppointmentRecord, NewUserRecord, ScheduleStore, StoreError,
    UserRecordChanges,
};
use crate::models::{Appointment, Role, User};

const USER_COLUMNS: &str =
    "id, username, password_hash, role, area, room, created_at, updated_at";
const APPOINTMENT_COLUMNS: &str = "id, scheduled_at, appointment_type, room, patient_id, \
     doctor_id, revision, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn translate(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::Conflict("username is already taken".to_string());
        }
    }
    StoreError::Unavailable(err.to_string())
}

#[async_trait]
impl ScheduleStore for PgStore {
    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(translate)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(translate)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(translate)
    }

    async fn list_users_by_role(&self, role: Role) -> Result<Vec<User>, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY username"
        ))
        .bind(role)
        .fetch_all(&self.pool)
        .await
        .map_err(translate)
    }

    async fn create_user(&self, record: NewUserRecord) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, password_hash, role, area, room) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&record.username)
        .bind(&record.password_hash)
        .bind(record.role)
        .bind(&record.area)
        .bind(&record.room)
        .fetch_one(&self.pool)
        .await
        .map_err(translate)
    }

    async fn update_user(
        &self,
        id: i64,
        changes: UserRecordChanges,
    ) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET \
                username = COALESCE($1, username), \
                password_hash = COALESCE($2, password_hash), \
                area = COALESCE($3, area), \
                room = COALESCE($4, room), \
                updated_at = now() \
             WHERE id = $5 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&changes.username)
        .bind(&changes.password_hash)
        .bind(&changes.area)
        .bind(&changes.room)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(translate)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(translate)?;
        Ok(result.rows_affected() > 0)
    }

    async fn user_has_appointments(&self, user_id: i64) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM appointments WHERE patient_id = $1 OR doctor_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(translate)
    }

    async fn find_appointment(&self, id: i64) -> Result<Option<Appointment>, StoreError> {
        sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(translate)
    }

    async fn list_appointments_for_doctor(
        &self,
        doctor_id: i64,
    ) -> Result<Vec<Appointment>, StoreError> {
        sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments \
             WHERE doctor_id = $1 ORDER BY scheduled_at"
        ))
        .bind(doctor_id)
        .fetch_all(&self.pool)
        .await
        .map_err(translate)
    }

    async fn list_appointments_for_patient(
        &self,
        patient_id: i64,
    ) -> Result<Vec<Appointment>, StoreError> {
        sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments \
             WHERE patient_id = $1 ORDER BY scheduled_at"
        ))
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await
        .map_err(translate)
    }

    async fn create_appointment(
        &self,
        record: NewAppointmentRecord,
    ) -> Result<Appointment, StoreError> {
        sqlx::query_as::<_, Appointment>(&format!(
            "INSERT INTO appointments (scheduled_at, appointment_type, room, patient_id, doctor_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {APPOINTMENT_COLUMNS}"
        ))
        .bind(record.scheduled_at)
        .bind(&record.appointment_type)
        .bind(&record.room)
        .bind(record.patient_id)
        .bind(record.doctor_id)
        .fetch_one(&self.pool)
        .await
        .map_err(translate)
    }

    async fn update_appointment(
        &self,
        id: i64,
        current_revision: i64,
        changes: AppointmentRecordChanges,
    ) -> Result<Option<Appointment>, StoreError> {
        // The revision guard makes the read-modify-write detectable: a
        // concurrent writer bumps the counter and this statement matches
        // nothing.
        sqlx::query_as::<_, Appointment>(&format!(
            "UPDATE appointments SET \
                scheduled_at = COALESCE($1, scheduled_at), \
                appointment_type = COALESCE($2, appointment_type), \
                room = COALESCE($3, room), \
                patient_id = COALESCE($4, patient_id), \
                doctor_id = COALESCE($5, doctor_id), \
                revision = revision + 1, \
                updated_at = now() \
             WHERE id = $6 AND revision = $7 \
             RETURNING {APPOINTMENT_COLUMNS}"
        ))
        .bind(changes.scheduled_at)
        .bind(&changes.appointment_type)
        .bind(&changes.room)
        .bind(changes.patient_id)
        .bind(changes.doctor_id)
        .bind(id)
        .bind(current_revision)
        .fetch_optional(&self.pool)
        .await
        .map_err(translate)
    }

    async fn delete_appointment(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(translate)?;
        Ok(result.rows_affected() > 0)
    }
}
