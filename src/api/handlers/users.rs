use crate::{
    api::extract::{AppJson, AppPath},
    api::models::{ApiError, ErrorResponse, LoginRequest, LoginResponse},
    auth::jwt::Claims,
    core::{
        models::{
            doctor::DoctorSignup,
            patient::PatientSignup,
            user::{UserReadOnly, UserRole},
        },
        services::CareLinkService,
    },
};
use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Bad credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn login(
    State(service): State<Arc<CareLinkService>>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let token = service.authenticate(&req.username, &req.password).await?;
    Ok(Json(LoginResponse { token }))
}

#[utoipa::path(
    post,
    path = "/api/users/patients",
    request_body = PatientSignup,
    responses(
        (status = 201, description = "Patient registered", body = UserReadOnly),
        (status = 400, description = "Invalid registration or value already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn signup_patient(
    State(service): State<Arc<CareLinkService>>,
    AppJson(req): AppJson<PatientSignup>,
) -> Result<(StatusCode, Json<UserReadOnly>), ApiError> {
    let user = service.signup_patient(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    post,
    path = "/api/users/doctors",
    request_body = DoctorSignup,
    responses(
        (status = 201, description = "Doctor registered", body = UserReadOnly),
        (status = 400, description = "Invalid registration or value already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn signup_doctor(
    State(service): State<Arc<CareLinkService>>,
    AppJson(req): AppJson<DoctorSignup>,
) -> Result<(StatusCode, Json<UserReadOnly>), ApiError> {
    let user = service.signup_doctor(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    params(
        ("user_id" = i64, Path, description = "ID of the user to retrieve")
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = UserReadOnly),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "users"
)]
pub async fn get_user(
    State(service): State<Arc<CareLinkService>>,
    Extension(claims): Extension<Claims>,
    AppPath(user_id): AppPath<i64>,
) -> Result<Json<UserReadOnly>, ApiError> {
    claims.require_role(&[UserRole::Patient, UserRole::Doctor])?;
    let user = service.get_user(user_id).await?;
    Ok(Json(user))
}
