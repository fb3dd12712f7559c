use crate::{
    api::extract::{AppJson, AppPath, AppQuery},
    api::models::{ApiError, ErrorResponse, MessageResponse, PageQuery},
    auth::jwt::Claims,
    core::{
        models::{
            doctor::UserDoctorView,
            patient::UserPatientView,
            user::{UserRole, UserUpdate},
        },
        pagination::PaginatedResult,
        services::CareLinkService,
    },
};
use axum::{
    Extension, Json,
    extract::State,
};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/patients/user/{user_id}",
    params(("user_id" = i64, Path, description = "User id of the patient")),
    responses(
        (status = 200, description = "Patient profile", body = UserPatientView),
        (status = 403, description = "Role not allowed", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "patients"
)]
pub async fn get_patient(
    State(service): State<Arc<CareLinkService>>,
    Extension(claims): Extension<Claims>,
    AppPath(user_id): AppPath<i64>,
) -> Result<Json<UserPatientView>, ApiError> {
    claims.require_role(&[UserRole::Patient, UserRole::Doctor])?;
    Ok(Json(service.get_patient(user_id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/patients/user/{user_id}",
    params(("user_id" = i64, Path, description = "User id of the logged-in patient")),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "Updated patient profile", body = UserPatientView),
        (status = 400, description = "Invalid update or value already taken", body = ErrorResponse),
        (status = 403, description = "Not the logged-in patient", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "patients"
)]
pub async fn update_patient(
    State(service): State<Arc<CareLinkService>>,
    Extension(claims): Extension<Claims>,
    AppPath(user_id): AppPath<i64>,
    AppJson(update): AppJson<UserUpdate>,
) -> Result<Json<UserPatientView>, ApiError> {
    claims.require_role(&[UserRole::Patient])?.ensure_owner(user_id)?;
    Ok(Json(service.update_patient(user_id, update).await?))
}

#[utoipa::path(
    post,
    path = "/api/patients/{patient_id}/doctors/{doctor_id}",
    params(
        ("patient_id" = i64, Path, description = "User id of the logged-in patient"),
        ("doctor_id" = i64, Path, description = "User id of the doctor to add")
    ),
    responses(
        (status = 200, description = "Doctor added", body = MessageResponse),
        (status = 400, description = "Doctor already added", body = ErrorResponse),
        (status = 403, description = "Not the logged-in patient", body = ErrorResponse),
        (status = 404, description = "Patient or doctor not found", body = ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "patients"
)]
pub async fn add_doctor(
    State(service): State<Arc<CareLinkService>>,
    Extension(claims): Extension<Claims>,
    AppPath((patient_id, doctor_id)): AppPath<(i64, i64)>,
) -> Result<Json<MessageResponse>, ApiError> {
    claims.require_role(&[UserRole::Patient])?.ensure_owner(patient_id)?;
    service.add_doctor_to_patient(patient_id, doctor_id).await?;
    Ok(Json(MessageResponse::new("Doctor added successfully.")))
}

#[utoipa::path(
    delete,
    path = "/api/patients/{patient_id}/doctors/{doctor_id}",
    params(
        ("patient_id" = i64, Path, description = "User id of the logged-in patient"),
        ("doctor_id" = i64, Path, description = "User id of the doctor to remove")
    ),
    responses(
        (status = 200, description = "Doctor removed", body = MessageResponse),
        (status = 403, description = "Not the logged-in patient", body = ErrorResponse),
        (status = 404, description = "Patient, doctor or association not found", body = ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "patients"
)]
pub async fn remove_doctor(
    State(service): State<Arc<CareLinkService>>,
    Extension(claims): Extension<Claims>,
    AppPath((patient_id, doctor_id)): AppPath<(i64, i64)>,
) -> Result<Json<MessageResponse>, ApiError> {
    claims.require_role(&[UserRole::Patient])?.ensure_owner(patient_id)?;
    service.remove_doctor_from_patient(patient_id, doctor_id).await?;
    Ok(Json(MessageResponse::new("Doctor removed successfully.")))
}

#[utoipa::path(
    get,
    path = "/api/patients/{patient_id}/doctors",
    params(
        ("patient_id" = i64, Path, description = "User id of the logged-in patient"),
        PageQuery
    ),
    responses(
        (status = 200, description = "A page of the patient's doctors", body = PaginatedResult<UserDoctorView>),
        (status = 400, description = "Invalid page request", body = ErrorResponse),
        (status = 403, description = "Not the logged-in patient", body = ErrorResponse),
        (status = 404, description = "Patient not found or no doctors", body = ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "patients"
)]
pub async fn get_patient_doctors(
    State(service): State<Arc<CareLinkService>>,
    Extension(claims): Extension<Claims>,
    AppPath(patient_id): AppPath<i64>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Json<PaginatedResult<UserDoctorView>>, ApiError> {
    claims.require_role(&[UserRole::Patient])?.ensure_owner(patient_id)?;
    let page = query.into_page()?;
    Ok(Json(service.patient_doctors_page(patient_id, page).await?))
}
