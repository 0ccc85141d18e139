mod appointments;
mod users;

pub use appointments::AppointmentService;
pub use users::{AuthenticatedUser, UserService};
