use super::{CareLinkService, ensure_path_matches_body};
use crate::core::errors::CareLinkError;
use crate::core::models::{
    doctor::UserDoctorView,
    patient::{PatientSignup, UserPatientView},
    user::{UserReadOnly, UserRole, UserUpdate},
};
use crate::core::pagination::{PageRequest, PaginatedResult};
use crate::core::validation::Validate;
use tracing::{info, warn};

impl CareLinkService {
    pub async fn signup_patient(&self, signup: PatientSignup) -> Result<UserReadOnly, CareLinkError> {
        if signup.user_role.is_some_and(|role| role != UserRole::Patient) {
            return Err(CareLinkError::invalid_argument(
                "userRole",
                "Patient signup must carry the Patient role",
            ));
        }
        signup.validate()?;
        self.ensure_user_unique(&signup.username, &signup.email, None).await?;
        if self.storage.get_patient_by_amka(&signup.amka).await?.is_some() {
            warn!("Patient signup rejected, amka {} taken", signup.amka);
            return Err(CareLinkError::already_exists(
                "Patient",
                format!("Patient with amka {} already exists", signup.amka),
            ));
        }

        let password_hash = self.hash(&signup.password)?;
        let (user, patient) = signup.into_parts(password_hash);
        let created = self.storage.create_patient_user(user, patient).await?;
        info!("Patient {} registered with user id {}", created.user.username, created.user.id);
        Ok(UserReadOnly::from(&created.user))
    }

    pub async fn get_patient(&self, user_id: i64) -> Result<UserPatientView, CareLinkError> {
        let patient = self.require_patient(user_id).await?;
        Ok(UserPatientView::from(&patient))
    }

    pub async fn update_patient(&self, user_id: i64, update: UserUpdate) -> Result<UserPatientView, CareLinkError> {
        ensure_path_matches_body(user_id, update.id)?;
        update.validate()?;
        self.require_patient(user_id).await?;
        self.ensure_user_unique(&update.username, &update.email, Some(user_id)).await?;

        let updated = self.storage.update_patient_profile(user_id, &update).await?;
        info!("Patient with user id {} updated", user_id);
        Ok(UserPatientView::from(&updated))
    }

    pub async fn add_doctor_to_patient(&self, patient_user_id: i64, doctor_user_id: i64) -> Result<(), CareLinkError> {
        self.require_patient(patient_user_id).await?;
        self.require_doctor(doctor_user_id).await?;
        if self.storage.association_exists(patient_user_id, doctor_user_id).await? {
            return Err(CareLinkError::already_exists(
                "Doctor",
                format!("Doctor with user id {} already added to my doctors", doctor_user_id),
            ));
        }

        self.storage.add_association(patient_user_id, doctor_user_id).await?;
        info!("Doctor {} added to patient {}", doctor_user_id, patient_user_id);
        Ok(())
    }

    pub async fn remove_doctor_from_patient(
        &self,
        patient_user_id: i64,
        doctor_user_id: i64,
    ) -> Result<(), CareLinkError> {
        self.require_patient(patient_user_id).await?;
        self.require_doctor(doctor_user_id).await?;
        if !self.storage.remove_association(patient_user_id, doctor_user_id).await? {
            return Err(CareLinkError::not_found(
                "Doctor",
                format!(
                    "Doctor with user id {} is not associated with the patient",
                    doctor_user_id
                ),
            ));
        }
        info!("Doctor {} removed from patient {}", doctor_user_id, patient_user_id);
        Ok(())
    }

    pub async fn patient_doctors_page(
        &self,
        patient_user_id: i64,
        page: PageRequest,
    ) -> Result<PaginatedResult<UserDoctorView>, CareLinkError> {
        self.require_patient(patient_user_id).await?;
        let total = self.storage.count_patient_doctors(patient_user_id).await?;
        if total == 0 {
            return Err(CareLinkError::not_found(
                "Doctor",
                format!("No doctors found for patient with user id {}", patient_user_id),
            ));
        }

        let doctors = self.storage.get_patient_doctors_page(patient_user_id, page).await?;
        Ok(PaginatedResult::new(doctors, total, page).map(|d| UserDoctorView::from(&d)))
    }
}
