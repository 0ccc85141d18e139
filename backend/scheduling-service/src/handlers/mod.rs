mod appointments;
mod auth;
mod health;
mod users;

pub use appointments::{
    create_appointment, delete_appointment, doctor_schedule, patient_schedule, update_appointment,
};
pub use auth::login;
pub use health::{health_check, liveness_check, readiness_check};
pub use users::{create_user, delete_user, get_user, list_doctors, list_users, update_user};
