use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    api::models::{ErrorResponse, LoginRequest, LoginResponse, MessageResponse},
    core::models::{
        doctor::{DoctorFilters, DoctorSignup, Specialty, UserDoctorView},
        patient::{PatientSignup, UserPatientView},
        user::{UserReadOnly, UserRole, UserUpdate},
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "Bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::users::login,
        super::handlers::users::signup_patient,
        super::handlers::users::signup_doctor,
        super::handlers::users::get_user,
        super::handlers::patients::get_patient,
        super::handlers::patients::update_patient,
        super::handlers::patients::add_doctor,
        super::handlers::patients::remove_doctor,
        super::handlers::patients::get_patient_doctors,
        super::handlers::doctors::get_doctor,
        super::handlers::doctors::update_doctor,
        super::handlers::doctors::remove_patient,
        super::handlers::doctors::get_doctor_patients,
        super::handlers::doctors::search_doctors
    ),
    components(schemas(
        LoginRequest,
        LoginResponse,
        MessageResponse,
        ErrorResponse,
        PatientSignup,
        DoctorSignup,
        UserUpdate,
        DoctorFilters,
        UserReadOnly,
        UserPatientView,
        UserDoctorView,
        UserRole,
        Specialty
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "users", description = "Registration, login and user lookup"),
        (name = "patients", description = "Patient profiles and their doctors"),
        (name = "doctors", description = "Doctor profiles, their patients and doctor search")
    ),
    info(
        title = "CareLink API",
        description = "Directory service connecting patients with their doctors",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
