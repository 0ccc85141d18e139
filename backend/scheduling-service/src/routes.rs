//! Route configuration. Auth-gated scopes wrap the bearer-token middleware;
//! everything else stays public.

use actix_web::web;

use crate::handlers;
use crate::middleware::AuthMiddleware;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(handlers::health_check))
            .route("/health/live", web::get().to(handlers::liveness_check))
            .route("/health/ready", web::get().to(handlers::readiness_check))
            .service(web::scope("/auth").route("/login", web::post().to(handlers::login)))
            .service(
                web::scope("/users")
                    .wrap(AuthMiddleware)
                    .route("", web::get().to(handlers::list_users))
                    .route("", web::post().to(handlers::create_user))
                    .route("/doctors", web::get().to(handlers::list_doctors))
                    .route("/{id}", web::get().to(handlers::get_user))
                    .route("/{id}", web::put().to(handlers::update_user))
                    .route("/{id}", web::delete().to(handlers::delete_user)),
            )
            .service(
                web::scope("/appointments")
                    .wrap(AuthMiddleware)
                    .route("", web::post().to(handlers::create_appointment))
                    .route("/doctor/{doctor_id}", web::get().to(handlers::doctor_schedule))
                    .route(
                        "/patient/{patient_id}",
                        web::get().to(handlers::patient_schedule),
                    )
                    .route("/{id}", web::patch().to(handlers::update_appointment))
                    .route("/{id}", web::delete().to(handlers::delete_appointment)),
            ),
    );
}
