pub mod authz;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod security;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};

use services::{AppointmentService, UserService};

#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub appointments: AppointmentService,
}
