use crate::{
    api::extract::{AppJson, AppPath, AppQuery},
    api::models::{ApiError, ErrorResponse, MessageResponse, PageQuery},
    auth::jwt::Claims,
    core::{
        models::{
            doctor::{DoctorFilters, UserDoctorView},
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
    path = "/api/doctors/user/{user_id}",
    params(("user_id" = i64, Path, description = "User id of the doctor")),
    responses(
        (status = 200, description = "Doctor profile", body = UserDoctorView),
        (status = 403, description = "Role not allowed", body = ErrorResponse),
        (status = 404, description = "Doctor not found", body = ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "doctors"
)]
pub async fn get_doctor(
    State(service): State<Arc<CareLinkService>>,
    Extension(claims): Extension<Claims>,
    AppPath(user_id): AppPath<i64>,
) -> Result<Json<UserDoctorView>, ApiError> {
    claims.require_role(&[UserRole::Doctor, UserRole::Patient])?;
    Ok(Json(service.get_doctor(user_id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/doctors/user/{user_id}",
    params(("user_id" = i64, Path, description = "User id of the logged-in doctor")),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "Updated doctor profile", body = UserDoctorView),
        (status = 400, description = "Invalid update or value already taken", body = ErrorResponse),
        (status = 403, description = "Not the logged-in doctor", body = ErrorResponse),
        (status = 404, description = "Doctor not found", body = ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "doctors"
)]
pub async fn update_doctor(
    State(service): State<Arc<CareLinkService>>,
    Extension(claims): Extension<Claims>,
    AppPath(user_id): AppPath<i64>,
    AppJson(update): AppJson<UserUpdate>,
) -> Result<Json<UserDoctorView>, ApiError> {
    claims.require_role(&[UserRole::Doctor])?.ensure_owner(user_id)?;
    Ok(Json(service.update_doctor(user_id, update).await?))
}

#[utoipa::path(
    delete,
    path = "/api/doctors/{doctor_id}/patients/{patient_id}",
    params(
        ("doctor_id" = i64, Path, description = "User id of the logged-in doctor"),
        ("patient_id" = i64, Path, description = "User id of the patient to remove")
    ),
    responses(
        (status = 200, description = "Patient removed", body = MessageResponse),
        (status = 403, description = "Not the logged-in doctor", body = ErrorResponse),
        (status = 404, description = "Doctor, patient or association not found", body = ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "doctors"
)]
pub async fn remove_patient(
    State(service): State<Arc<CareLinkService>>,
    Extension(claims): Extension<Claims>,
    AppPath((doctor_id, patient_id)): AppPath<(i64, i64)>,
) -> Result<Json<MessageResponse>, ApiError> {
    claims.require_role(&[UserRole::Doctor])?.ensure_owner(doctor_id)?;
    service.remove_patient_from_doctor(doctor_id, patient_id).await?;
    Ok(Json(MessageResponse::new("Patient removed successfully.")))
}

#[utoipa::path(
    get,
    path = "/api/doctors/{doctor_id}/patients",
    params(
        ("doctor_id" = i64, Path, description = "User id of the logged-in doctor"),
        PageQuery
    ),
    responses(
        (status = 200, description = "A page of the doctor's patients", body = PaginatedResult<UserPatientView>),
        (status = 400, description = "Invalid page request", body = ErrorResponse),
        (status = 403, description = "Not the logged-in doctor", body = ErrorResponse),
        (status = 404, description = "Doctor not found or no patients", body = ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "doctors"
)]
pub async fn get_doctor_patients(
    State(service): State<Arc<CareLinkService>>,
    Extension(claims): Extension<Claims>,
    AppPath(doctor_id): AppPath<i64>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<Json<PaginatedResult<UserPatientView>>, ApiError> {
    claims.require_role(&[UserRole::Doctor])?.ensure_owner(doctor_id)?;
    let page = query.into_page()?;
    Ok(Json(service.doctor_patients_page(doctor_id, page).await?))
}

#[utoipa::path(
    post,
    path = "/api/doctors",
    params(PageQuery),
    request_body = DoctorFilters,
    responses(
        (status = 200, description = "A page of matching doctors", body = PaginatedResult<UserDoctorView>),
        (status = 400, description = "Invalid page request or specialty", body = ErrorResponse),
        (status = 403, description = "Only patients may search", body = ErrorResponse),
        (status = 404, description = "No doctors match", body = ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "doctors"
)]
pub async fn search_doctors(
    State(service): State<Arc<CareLinkService>>,
    Extension(claims): Extension<Claims>,
    AppQuery(query): AppQuery<PageQuery>,
    AppJson(filters): AppJson<DoctorFilters>,
) -> Result<Json<PaginatedResult<UserDoctorView>>, ApiError> {
    claims.require_role(&[UserRole::Patient])?;
    let page = query.into_page()?;
    Ok(Json(service.doctors_filtered_page(filters, page).await?))
}
