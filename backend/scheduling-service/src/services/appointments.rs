//! Appointment record service: policy gate, referential and temporal
//! invariants, store I/O, role-appropriate projection.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::authz::{AccessPolicy, Decision, Operation, Parties};
use crate::db::{AppointmentRecordChanges, NewAppointmentRecord, ScheduleStore};
use crate::error::{AppError, Result};
use crate::models::{
    Appointment, CreateAppointmentRequest, DoctorScheduleEntry, Identity, PatientScheduleEntry,
    Role, UpdateAppointmentRequest, User,
};

#[derive(Clone)]
pub struct AppointmentService {
    store: Arc<dyn ScheduleStore>,
    policy: Arc<dyn AccessPolicy>,
}

impl AppointmentService {
    pub fn new(store: Arc<dyn ScheduleStore>, policy: Arc<dyn AccessPolicy>) -> Self {
        Self { store, policy }
    }

    pub async fn create(
        &self,
        actor: Identity,
        req: CreateAppointmentRequest,
    ) -> Result<Appointment> {
        let parties = Parties {
            patient_id: req.patient_id,
            doctor_id: req.doctor_id,
        };
        self.require(actor, Operation::CreateAppointment { parties })?;

        // A missing referent and a role-mismatched one are the same failure:
        // there is no such patient/doctor.
        self.resolve_role(req.patient_id, Role::Patient).await?;
        self.resolve_role(req.doctor_id, Role::Doctor).await?;
        ensure_future(req.scheduled_at)?;

        let appointment = self
            .store
            .create_appointment(NewAppointmentRecord {
                scheduled_at: req.scheduled_at,
                appointment_type: req.appointment_type,
                room: req.room,
                patient_id: req.patient_id,
                doctor_id: req.doctor_id,
            })
            .await?;

        tracing::info!(
            appointment_id = appointment.id,
            patient_id = appointment.patient_id,
            doctor_id = appointment.doctor_id,
            actor_id = actor.id,
            "appointment created"
        );
        Ok(appointment)
    }

    /// A doctor's schedule with the patient's username on every row. Zero
    /// matches yield an empty list, never a not-found.
    pub async fn list_for_doctor(
        &self,
        actor: Identity,
        doctor_id: i64,
    ) -> Result<Vec<DoctorScheduleEntry>> {
        self.require(actor, Operation::ReadDoctorSchedule { doctor_id })?;
        let doctor = self.resolve_role(doctor_id, Role::Doctor).await?;

        let appointments = self.store.list_appointments_for_doctor(doctor_id).await?;
        let mut entries = Vec::with_capacity(appointments.len());
        for a in appointments {
            let patient = self.resolve_party(a.patient_id).await?;
            entries.push(DoctorScheduleEntry {
                id: a.id,
                scheduled_at: a.scheduled_at,
                appointment_type: a.appointment_type,
                room: a.room,
                patient_id: a.patient_id,
                patient_name: patient.username,
                doctor_area: doctor.area.clone(),
                doctor_room: doctor.room.clone(),
                revision: a.revision,
            });
        }
        Ok(entries)
    }

    /// A patient's schedule with the doctor's username, area and room on
    /// every row.
    pub async fn list_for_patient(
        &self,
        actor: Identity,
        patient_id: i64,
    ) -> Result<Vec<PatientScheduleEntry>> {
        self.require(actor, Operation::ReadPatientSchedule { patient_id })?;
        self.resolve_role(patient_id, Role::Patient).await?;

        let appointments = self.store.list_appointments_for_patient(patient_id).await?;
        let mut entries = Vec::with_capacity(appointments.len());
        for a in appointments {
            let doctor = self.resolve_party(a.doctor_id).await?;
            entries.push(PatientScheduleEntry {
                id: a.id,
                scheduled_at: a.scheduled_at,
                appointment_type: a.appointment_type,
                room: a.room,
                doctor_username: doctor.username,
                doctor_area: doctor.area,
                doctor_room: doctor.room,
                revision: a.revision,
            });
        }
        Ok(entries)
    }

    pub async fn update(
        &self,
        actor: Identity,
        id: i64,
        req: UpdateAppointmentRequest,
    ) -> Result<Appointment> {
        let appointment = self.load(id).await?;
        let parties = Parties {
            patient_id: appointment.patient_id,
            doctor_id: appointment.doctor_id,
        };

        let grant = self.require(actor, Operation::UpdateAppointment { parties })?;
        if req.is_empty() {
            return Err(AppError::Validation(
                "at least one field must be provided".to_string(),
            ));
        }
        if grant == Decision::GrantedDateOnly && req.touches_non_date_fields() {
            return Err(AppError::Forbidden(crate::authz::DenyReason::DateOnlyUpdate));
        }

        if let Some(scheduled_at) = req.scheduled_at {
            ensure_future(scheduled_at)?;
        }
        if let Some(patient_id) = req.patient_id {
            self.resolve_role(patient_id, Role::Patient).await?;
        }
        if let Some(doctor_id) = req.doctor_id {
            self.resolve_role(doctor_id, Role::Doctor).await?;
        }
        if let Some(expected) = req.expected_revision {
            if expected != appointment.revision {
                return Err(AppError::Conflict(format!(
                    "appointment changed since revision {expected}"
                )));
            }
        }

        let updated = self
            .store
            .update_appointment(
                id,
                appointment.revision,
                AppointmentRecordChanges {
                    scheduled_at: req.scheduled_at,
                    appointment_type: req.appointment_type,
                    room: req.room,
                    patient_id: req.patient_id,
                    doctor_id: req.doctor_id,
                },
            )
            .await?
            .ok_or_else(|| {
                AppError::Conflict("appointment was modified concurrently".to_string())
            })?;

        tracing::info!(appointment_id = id, actor_id = actor.id, "appointment updated");
        Ok(updated)
    }

    pub async fn delete(&self, actor: Identity, id: i64) -> Result<()> {
        let appointment = self.load(id).await?;
        let parties = Parties {
            patient_id: appointment.patient_id,
            doctor_id: appointment.doctor_id,
        };
        self.require(actor, Operation::DeleteAppointment { parties })?;

        if !self.store.delete_appointment(id).await? {
            return Err(AppError::NotFound("appointment not found".to_string()));
        }
        tracing::info!(appointment_id = id, actor_id = actor.id, "appointment deleted");
        Ok(())
    }

    fn require(&self, actor: Identity, op: Operation) -> Result<Decision> {
        match self.policy.check(actor, op) {
            Decision::Denied(reason) => Err(AppError::Forbidden(reason)),
            granted => Ok(granted),
        }
    }

    async fn load(&self, id: i64) -> Result<Appointment> {
        self.store
            .find_appointment(id)
            .await?
            .ok_or_else(|| AppError::NotFound("appointment not found".to_string()))
    }

    /// Resolve a referenced user id and require the expected role. Absent
    /// records and role mismatches are both surfaced as not-found.
    async fn resolve_role(&self, id: i64, role: Role) -> Result<User> {
        match self.store.find_user(id).await? {
            Some(user) if user.role == role => Ok(user),
            _ => Err(AppError::NotFound(format!("{role} not found"))),
        }
    }

    /// Resolve a user an existing appointment references. Referential
    /// integrity makes a dangling reference an internal fault, not a 404.
    async fn resolve_party(&self, id: i64) -> Result<User> {
        self.store.find_user(id).await?.ok_or_else(|| {
            AppError::Internal(format!("appointment references missing user {id}"))
        })
    }
}

fn ensure_future(scheduled_at: DateTime<Utc>) -> Result<()> {
    if scheduled_at <= Utc::now() {
        return Err(AppError::Validation(
            "scheduled_at must be in the future".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn past_and_present_instants_fail_the_temporal_rule() {
        assert!(ensure_future(Utc::now() - Duration::minutes(1)).is_err());
        assert!(ensure_future(Utc::now() - Duration::days(30)).is_err());
        assert!(ensure_future(Utc::now() + Duration::minutes(5)).is_ok());
    }
}
