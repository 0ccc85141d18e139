//! Permission policy: pure decision functions over `(role, operation,
//! ownership)`. No I/O happens here; record services resolve ownership facts
//! first and call into the active [`AccessPolicy`] before touching the store.
//!
//! Two strategies ship because the upstream product never settled on one
//! behavior for patient self-service. The default is the permissive
//! self-service variant; the strict variant can be selected at startup via
//! `SCHEDULING_POLICY=strict`.

use std::sync::Arc;

use crate::models::{Identity, Role};

/// Ownership facts of the appointment a mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parties {
    pub patient_id: i64,
    pub doctor_id: i64,
}

impl Parties {
    pub fn patient_of_record(&self, actor: Identity) -> bool {
        actor.role == Role::Patient && actor.id == self.patient_id
    }

    pub fn doctor_of_record(&self, actor: Identity) -> bool {
        actor.role == Role::Doctor && actor.id == self.doctor_id
    }
}

/// Every policy-gated operation, with the ownership facts a decision needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateAppointment { parties: Parties },
    ReadDoctorSchedule { doctor_id: i64 },
    ReadPatientSchedule { patient_id: i64 },
    UpdateAppointment { parties: Parties },
    DeleteAppointment { parties: Parties },
    ListUsers,
    ListDoctors,
    ReadUser,
    CreateUser,
    UpdateUser,
    DeleteUser,
}

/// Denial reason codes, each with a role-specific message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    UserAdministration,
    UserCreation,
    DoctorScheduleAccess,
    ForeignDoctorSchedule,
    PatientScheduleAccess,
    SelfBookingOnly,
    DoctorBookingForOthers,
    PatientBooking,
    NotPartyToAppointment,
    PatientAppointmentUpdate,
    DoctorAppointmentDelete,
    DateOnlyUpdate,
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            DenyReason::UserAdministration => "patients are not allowed to manage user records",
            DenyReason::UserCreation => "only administrators may create user accounts",
            DenyReason::DoctorScheduleAccess => "patients may not view doctor schedules",
            DenyReason::ForeignDoctorSchedule => "doctors may only view their own schedule",
            DenyReason::PatientScheduleAccess => {
                "you may only view your own appointment information"
            }
            DenyReason::SelfBookingOnly => "patients may only book appointments for themselves",
            DenyReason::DoctorBookingForOthers => {
                "doctors may only create appointments for themselves"
            }
            DenyReason::PatientBooking => "patients may not create appointments",
            DenyReason::NotPartyToAppointment => "you are not a party to this appointment",
            DenyReason::PatientAppointmentUpdate => "patients may not modify appointments",
            DenyReason::DoctorAppointmentDelete => "doctors may not delete appointments",
            DenyReason::DateOnlyUpdate => "patients may only reschedule the date and time",
        };
        f.write_str(msg)
    }
}

/// Outcome of a policy check. `GrantedDateOnly` is a scoped grant used for
/// appointment updates: the mutation may touch the scheduled instant and
/// nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Granted,
    GrantedDateOnly,
    Denied(DenyReason),
}

impl Decision {
    pub fn is_granted(&self) -> bool {
        matches!(self, Decision::Granted | Decision::GrantedDateOnly)
    }
}

/// Swappable authorization strategy. Implementations must be pure: same
/// inputs, same decision, no side effects.
pub trait AccessPolicy: Send + Sync {
    fn name(&self) -> &'static str;
    fn check(&self, actor: Identity, op: Operation) -> Decision;
}

/// Resolve a policy by its configured name.
pub fn policy_from_name(name: &str) -> Option<Arc<dyn AccessPolicy>> {
    match name {
        "self_service" => Some(Arc::new(SelfServicePolicy)),
        "strict" => Some(Arc::new(StrictPolicy)),
        _ => None,
    }
}

/// User-record rules are identical in both shipped strategies: patients are
/// always denied, creation is admin-only, listing doctors only needs a
/// verified identity.
fn check_user_operation(actor: Identity, op: Operation) -> Decision {
    match op {
        Operation::ListUsers | Operation::ReadUser | Operation::UpdateUser | Operation::DeleteUser => {
            match actor.role {
                Role::Patient => Decision::Denied(DenyReason::UserAdministration),
                Role::Doctor | Role::Admin => Decision::Granted,
            }
        }
        Operation::CreateUser => match actor.role {
            Role::Admin => Decision::Granted,
            Role::Patient | Role::Doctor => Decision::Denied(DenyReason::UserCreation),
        },
        Operation::ListDoctors => Decision::Granted,
        // Appointment operations never reach this helper; both strategies
        // route only the user-record variants here.
        Operation::CreateAppointment { .. }
        | Operation::ReadDoctorSchedule { .. }
        | Operation::ReadPatientSchedule { .. }
        | Operation::UpdateAppointment { .. }
        | Operation::DeleteAppointment { .. } => {
            unreachable!("appointment operations are handled per-strategy")
        }
    }
}

/// Default strategy: patients may self-book, reschedule their own
/// appointments (date only), and cancel them.
pub struct SelfServicePolicy;

impl AccessPolicy for SelfServicePolicy {
    fn name(&self) -> &'static str {
        "self_service"
    }

    fn check(&self, actor: Identity, op: Operation) -> Decision {
        match op {
            Operation::CreateAppointment { parties } => match actor.role {
                Role::Admin => Decision::Granted,
                Role::Doctor if parties.doctor_id == actor.id => Decision::Granted,
                Role::Doctor => Decision::Denied(DenyReason::DoctorBookingForOthers),
                Role::Patient if parties.patient_id == actor.id => Decision::Granted,
                Role::Patient => Decision::Denied(DenyReason::SelfBookingOnly),
            },
            Operation::ReadDoctorSchedule { .. } => match actor.role {
                Role::Admin | Role::Doctor => Decision::Granted,
                Role::Patient => Decision::Denied(DenyReason::DoctorScheduleAccess),
            },
            Operation::ReadPatientSchedule { patient_id } => match actor.role {
                Role::Admin => Decision::Granted,
                Role::Patient if actor.id == patient_id => Decision::Granted,
                Role::Patient | Role::Doctor => {
                    Decision::Denied(DenyReason::PatientScheduleAccess)
                }
            },
            Operation::UpdateAppointment { parties } => match actor.role {
                Role::Admin => Decision::Granted,
                Role::Doctor if parties.doctor_of_record(actor) => Decision::Granted,
                Role::Patient if parties.patient_of_record(actor) => Decision::GrantedDateOnly,
                Role::Doctor | Role::Patient => {
                    Decision::Denied(DenyReason::NotPartyToAppointment)
                }
            },
            Operation::DeleteAppointment { parties } => match actor.role {
                Role::Admin => Decision::Granted,
                Role::Doctor if parties.doctor_of_record(actor) => Decision::Granted,
                Role::Patient if parties.patient_of_record(actor) => Decision::Granted,
                Role::Doctor | Role::Patient => {
                    Decision::Denied(DenyReason::NotPartyToAppointment)
                }
            },
            Operation::ListUsers
            | Operation::ListDoctors
            | Operation::ReadUser
            | Operation::CreateUser
            | Operation::UpdateUser
            | Operation::DeleteUser => check_user_operation(actor, op),
        }
    }
}

/// Strict strategy: no patient self-service, doctors confined to their own
/// schedule, appointment deletion reserved for admins and the
/// patient-of-record.
pub struct StrictPolicy;

impl AccessPolicy for StrictPolicy {
    fn name(&self) -> &'static str {
        "strict"
    }

    fn check(&self, actor: Identity, op: Operation) -> Decision {
        match op {
            Operation::CreateAppointment { parties } => match actor.role {
                Role::Admin => Decision::Granted,
                Role::Doctor if parties.doctor_id == actor.id => Decision::Granted,
                Role::Doctor => Decision::Denied(DenyReason::DoctorBookingForOthers),
                Role::Patient => Decision::Denied(DenyReason::PatientBooking),
            },
            Operation::ReadDoctorSchedule { doctor_id } => match actor.role {
                Role::Admin => Decision::Granted,
                Role::Doctor if actor.id == doctor_id => Decision::Granted,
                Role::Doctor => Decision::Denied(DenyReason::ForeignDoctorSchedule),
                Role::Patient => Decision::Denied(DenyReason::DoctorScheduleAccess),
            },
            Operation::ReadPatientSchedule { patient_id } => match actor.role {
                Role::Admin => Decision::Granted,
                Role::Patient if actor.id == patient_id => Decision::Granted,
                Role::Patient | Role::Doctor => {
                    Decision::Denied(DenyReason::PatientScheduleAccess)
                }
            },
            Operation::UpdateAppointment { parties } => match actor.role {
                Role::Admin => Decision::Granted,
                Role::Doctor if parties.doctor_of_record(actor) => Decision::Granted,
                Role::Doctor => Decision::Denied(DenyReason::NotPartyToAppointment),
                Role::Patient => Decision::Denied(DenyReason::PatientAppointmentUpdate),
            },
            Operation::DeleteAppointment { parties } => match actor.role {
                Role::Admin => Decision::Granted,
                Role::Patient if parties.patient_of_record(actor) => Decision::Granted,
                Role::Patient => Decision::Denied(DenyReason::NotPartyToAppointment),
                Role::Doctor => Decision::Denied(DenyReason::DoctorAppointmentDelete),
            },
            Operation::ListUsers
            | Operation::ListDoctors
            | Operation::ReadUser
            | Operation::CreateUser
            | Operation::UpdateUser
            | Operation::DeleteUser => check_user_operation(actor, op),
        }
    }
}
