use super::{CareLinkService, ensure_path_matches_body};
use crate::core::errors::CareLinkError;
use crate::core::models::{
    doctor::{DoctorCriteria, DoctorFilters, DoctorSignup, UserDoctorView},
    patient::UserPatientView,
    user::{UserReadOnly, UserRole, UserUpdate},
};
use crate::core::pagination::{PageRequest, PaginatedResult};
use crate::core::validation::Validate;
use tracing::{info, warn};

impl CareLinkService {
    pub async fn signup_doctor(&self, signup: DoctorSignup) -> Result<UserReadOnly, CareLinkError> {
        if signup.user_role.is_some_and(|role| role != UserRole::Doctor) {
            return Err(CareLinkError::invalid_argument(
                "userRole",
                "Doctor signup must carry the Doctor role",
            ));
        }
        signup.validate()?;
        self.ensure_user_unique(&signup.username, &signup.email, None).await?;
        if self.storage.get_doctor_by_afm(&signup.afm).await?.is_some() {
            warn!("Doctor signup rejected, afm {} taken", signup.afm);
            return Err(CareLinkError::already_exists(
                "Doctor",
                format!("Doctor with afm {} already exists", signup.afm),
            ));
        }
        if self
            .storage
            .get_doctor_by_phone_number(&signup.phone_number)
            .await?
            .is_some()
        {
            warn!("Doctor signup rejected, phone number {} taken", signup.phone_number);
            return Err(CareLinkError::already_exists(
                "Doctor",
                format!("Doctor with phone number {} already exists", signup.phone_number),
            ));
        }

        let password_hash = self.hash(&signup.password)?;
        let (user, doctor) = signup.into_parts(password_hash);
        let created = self.storage.create_doctor_user(user, doctor).await?;
        info!("Doctor {} registered with user id {}", created.user.username, created.user.id);
        Ok(UserReadOnly::from(&created.user))
    }

    pub async fn get_doctor(&self, user_id: i64) -> Result<UserDoctorView, CareLinkError> {
        let doctor = self.require_doctor(user_id).await?;
        Ok(UserDoctorView::from(&doctor))
    }

    pub async fn update_doctor(&self, user_id: i64, update: UserUpdate) -> Result<UserDoctorView, CareLinkError> {
        ensure_path_matches_body(user_id, update.id)?;
        update.validate()?;
        self.require_doctor(user_id).await?;
        self.ensure_user_unique(&update.username, &update.email, Some(user_id)).await?;
        let phone_owner = self.storage.get_doctor_by_phone_number(&update.phone_number).await?;
        if phone_owner.is_some_and(|d| d.user.id != user_id) {
            return Err(CareLinkError::already_exists(
                "Doctor",
                format!("Doctor with phone number {} already exists", update.phone_number),
            ));
        }

        let updated = self.storage.update_doctor_profile(user_id, &update).await?;
        info!("Doctor with user id {} updated", user_id);
        Ok(UserDoctorView::from(&updated))
    }

    pub async fn remove_patient_from_doctor(
        &self,
        doctor_user_id: i64,
        patient_user_id: i64,
    ) -> Result<(), CareLinkError> {
        self.require_doctor(doctor_user_id).await?;
        self.require_patient(patient_user_id).await?;
        if !self.storage.remove_association(patient_user_id, doctor_user_id).await? {
            return Err(CareLinkError::not_found(
                "Patient",
                format!(
                    "Patient with user id {} is not associated with the doctor",
                    patient_user_id
                ),
            ));
        }
        info!("Patient {} removed from doctor {}", patient_user_id, doctor_user_id);
        Ok(())
    }

    pub async fn doctor_patients_page(
        &self,
        doctor_user_id: i64,
        page: PageRequest,
    ) -> Result<PaginatedResult<UserPatientView>, CareLinkError> {
        self.require_doctor(doctor_user_id).await?;
        let total = self.storage.count_doctor_patients(doctor_user_id).await?;
        if total == 0 {
            return Err(CareLinkError::not_found(
                "Patient",
                format!("No patients found for doctor with user id {}", doctor_user_id),
            ));
        }

        let patients = self.storage.get_doctor_patients_page(doctor_user_id, page).await?;
        Ok(PaginatedResult::new(patients, total, page).map(|p| UserPatientView::from(&p)))
    }

    pub async fn doctors_filtered_page(
        &self,
        filters: DoctorFilters,
        page: PageRequest,
    ) -> Result<PaginatedResult<UserDoctorView>, CareLinkError> {
        let criteria = DoctorCriteria::try_from(filters)?;
        let total = self.storage.count_doctors_filtered(&criteria).await?;
        if total == 0 {
            return Err(CareLinkError::not_found(
                "Doctor",
                "No doctors found matching the given criteria",
            ));
        }

        let doctors = self.storage.get_doctors_filtered_page(&criteria, page).await?;
        Ok(PaginatedResult::new(doctors, total, page).map(|d| UserDoctorView::from(&d)))
    }
}
