#![allow(dead_code)]

//! Shared test harness: an in-memory `ScheduleStore` plus service fixtures,
//! so the whole authorization and lifecycle engine runs without a database.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use scheduling_service::authz::policy_from_name;
use scheduling_service::db::{
    AppointmentRecordChanges, NewAppointmentRecord, NewUserRecord, ScheduleStore, StoreError,
    UserRecordChanges,
};
use scheduling_service::models::{
    Appointment, CreateAppointmentRequest, CreateUserRequest, Identity, Role, User,
};
use scheduling_service::security::jwt;
use scheduling_service::services::{AppointmentService, UserService};

pub const ADMIN: Identity = Identity { id: 999, role: Role::Admin };

#[derive(Default)]
struct State {
    users: BTreeMap<i64, User>,
    appointments: BTreeMap<i64, Appointment>,
    next_user_id: i64,
    next_appointment_id: i64,
}

/// In-memory realization of the store collaborator. Uniqueness is enforced
/// the way the relational schema would enforce it.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl ScheduleStore for InMemoryStore {
    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.state.lock().unwrap().users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.state.lock().unwrap().users.values().cloned().collect())
    }

    async fn list_users_by_role(&self, role: Role) -> Result<Vec<User>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .values()
            .filter(|u| u.role == role)
            .cloned()
            .collect())
    }

    async fn create_user(&self, record: NewUserRecord) -> Result<User, StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.users.values().any(|u| u.username == record.username) {
            return Err(StoreError::Conflict("username is already taken".into()));
        }
        state.next_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: state.next_user_id,
            username: record.username,
            password_hash: record.password_hash,
            role: record.role,
            area: record.area,
            room: record.room,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(
        &self,
        id: i64,
        changes: UserRecordChanges,
    ) -> Result<Option<User>, StoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(new_name) = &changes.username {
            if state
                .users
                .values()
                .any(|u| u.id != id && &u.username == new_name)
            {
                return Err(StoreError::Conflict("username is already taken".into()));
            }
        }
        let Some(user) = state.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(area) = changes.area {
            user.area = Some(area);
        }
        if let Some(room) = changes.room {
            user.room = Some(room);
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.state.lock().unwrap().users.remove(&id).is_some())
    }

    async fn user_has_appointments(&self, user_id: i64) -> Result<bool, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .appointments
            .values()
            .any(|a| a.patient_id == user_id || a.doctor_id == user_id))
    }

    async fn find_appointment(&self, id: i64) -> Result<Option<Appointment>, StoreError> {
        Ok(self.state.lock().unwrap().appointments.get(&id).cloned())
    }

    async fn list_appointments_for_doctor(
        &self,
        doctor_id: i64,
    ) -> Result<Vec<Appointment>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .appointments
            .values()
            .filter(|a| a.doctor_id == doctor_id)
            .cloned()
            .collect())
    }

    async fn list_appointments_for_patient(
        &self,
        patient_id: i64,
    ) -> Result<Vec<Appointment>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .appointments
            .values()
            .filter(|a| a.patient_id == patient_id)
            .cloned()
            .collect())
    }

    async fn create_appointment(
        &self,
        record: NewAppointmentRecord,
    ) -> Result<Appointment, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.next_appointment_id += 1;
        let now = Utc::now();
        let appointment = Appointment {
            id: state.next_appointment_id,
            scheduled_at: record.scheduled_at,
            appointment_type: record.appointment_type,
            room: record.room,
            patient_id: record.patient_id,
            doctor_id: record.doctor_id,
            revision: 0,
            created_at: now,
            updated_at: now,
        };
        state.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn update_appointment(
        &self,
        id: i64,
        current_revision: i64,
        changes: AppointmentRecordChanges,
    ) -> Result<Option<Appointment>, StoreError> {
        let mut state = self.state.lock().unwrap();
        let Some(appointment) = state.appointments.get_mut(&id) else {
            return Ok(None);
        };
        if appointment.revision != current_revision {
            return Ok(None);
        }
        if let Some(scheduled_at) = changes.scheduled_at {
            appointment.scheduled_at = scheduled_at;
        }
        if let Some(appointment_type) = changes.appointment_type {
            appointment.appointment_type = Some(appointment_type);
        }
        if let Some(room) = changes.room {
            appointment.room = Some(room);
        }
        if let Some(patient_id) = changes.patient_id {
            appointment.patient_id = patient_id;
        }
        if let Some(doctor_id) = changes.doctor_id {
            appointment.doctor_id = doctor_id;
        }
        appointment.revision += 1;
        appointment.updated_at = Utc::now();
        Ok(Some(appointment.clone()))
    }

    async fn delete_appointment(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.state.lock().unwrap().appointments.remove(&id).is_some())
    }
}

/// Services wired to a fresh in-memory store under the named policy.
pub fn test_env(policy_name: &str) -> (UserService, AppointmentService) {
    jwt::initialize("scheduling-test-secret");
    let store: Arc<dyn ScheduleStore> = InMemoryStore::new();
    let policy = policy_from_name(policy_name).expect("known policy variant");
    (
        UserService::new(store.clone(), policy.clone()),
        AppointmentService::new(store, policy),
    )
}

pub fn future_instant() -> DateTime<Utc> {
    Utc::now() + Duration::days(7)
}

pub async fn seed_user(
    users: &UserService,
    username: &str,
    role: Role,
    area: Option<&str>,
    room: Option<&str>,
) -> Identity {
    let view = users
        .create(
            ADMIN,
            CreateUserRequest {
                username: username.to_string(),
                password: format!("{username}-password"),
                role,
                area: area.map(str::to_string),
                room: room.map(str::to_string),
            },
        )
        .await
        .expect("seed user");
    Identity {
        id: view.id,
        role: view.role,
    }
}

pub fn booking(patient: Identity, doctor: Identity) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        scheduled_at: future_instant(),
        appointment_type: Some("consultation".to_string()),
        room: Some("204".to_string()),
        patient_id: patient.id,
        doctor_id: doctor.id,
    }
}
