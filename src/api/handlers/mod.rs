use crate::{api::models::ApiError, core::errors::CareLinkError, core::services::CareLinkService};
use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, post},
};
use http::header;

use std::sync::Arc;

pub mod doctors;
pub mod patients;
pub mod users;

/// Validates the bearer token and exposes its claims to handlers as an extension.
async fn auth_middleware(
    State(service): State<Arc<CareLinkService>>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| CareLinkError::NotAuthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| CareLinkError::NotAuthorized("Invalid Authorization header".to_string()))?;

    let claims = service.validate_token(token)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

// Routes relative to /api
pub fn api_routes(service: Arc<CareLinkService>) -> Router {
    let protected_routes = Router::new()
        .route("/users/{user_id}", get(users::get_user))
        .route(
            "/patients/user/{user_id}",
            get(patients::get_patient).patch(patients::update_patient),
        )
        .route(
            "/patients/{patient_id}/doctors",
            get(patients::get_patient_doctors),
        )
        .route(
            "/patients/{patient_id}/doctors/{doctor_id}",
            post(patients::add_doctor).delete(patients::remove_doctor),
        )
        .route(
            "/doctors/user/{user_id}",
            get(doctors::get_doctor).patch(doctors::update_doctor),
        )
        .route("/doctors", post(doctors::search_doctors))
        .route(
            "/doctors/{doctor_id}/patients",
            get(doctors::get_doctor_patients),
        )
        .route(
            "/doctors/{doctor_id}/patients/{patient_id}",
            axum::routing::delete(doctors::remove_patient),
        )
        .route_layer(middleware::from_fn_with_state(service.clone(), auth_middleware));

    Router::new()
        .route("/users/login", post(users::login))
        .route("/users/patients", post(users::signup_patient)) // Unprotected
        .route("/users/doctors", post(users::signup_doctor)) // Unprotected
        .merge(protected_routes)
        .with_state(service)
}
