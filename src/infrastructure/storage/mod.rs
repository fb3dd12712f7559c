use crate::core::errors::CareLinkError;
use crate::core::models::{
    doctor::{DoctorCriteria, NewDoctor, UserDoctor},
    patient::{NewPatient, UserPatient},
    user::{NewUser, User, UserUpdate},
};
use crate::core::pagination::PageRequest;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, user_id: i64) -> Result<Option<User>, CareLinkError>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, CareLinkError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, CareLinkError>;
}

/// Patient lookups are keyed by user id; `patients.id` never leaves the store.
#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// Inserts the user row and its patient profile atomically.
    async fn create_patient_user(&self, user: NewUser, patient: NewPatient) -> Result<UserPatient, CareLinkError>;
    async fn get_patient_by_user_id(&self, user_id: i64) -> Result<Option<UserPatient>, CareLinkError>;
    async fn get_patient_by_amka(&self, amka: &str) -> Result<Option<UserPatient>, CareLinkError>;
    async fn update_patient_profile(&self, user_id: i64, update: &UserUpdate) -> Result<UserPatient, CareLinkError>;
    async fn count_patient_doctors(&self, patient_user_id: i64) -> Result<i64, CareLinkError>;
    async fn get_patient_doctors_page(
        &self,
        patient_user_id: i64,
        page: PageRequest,
    ) -> Result<Vec<UserDoctor>, CareLinkError>;
}

#[async_trait]
pub trait DoctorRepository: Send + Sync {
    async fn create_doctor_user(&self, user: NewUser, doctor: NewDoctor) -> Result<UserDoctor, CareLinkError>;
    async fn get_doctor_by_user_id(&self, user_id: i64) -> Result<Option<UserDoctor>, CareLinkError>;
    async fn get_doctor_by_afm(&self, afm: &str) -> Result<Option<UserDoctor>, CareLinkError>;
    async fn get_doctor_by_phone_number(&self, phone_number: &str) -> Result<Option<UserDoctor>, CareLinkError>;
    async fn update_doctor_profile(&self, user_id: i64, update: &UserUpdate) -> Result<UserDoctor, CareLinkError>;
    async fn count_doctor_patients(&self, doctor_user_id: i64) -> Result<i64, CareLinkError>;
    async fn get_doctor_patients_page(
        &self,
        doctor_user_id: i64,
        page: PageRequest,
    ) -> Result<Vec<UserPatient>, CareLinkError>;
    async fn count_doctors_filtered(&self, criteria: &DoctorCriteria) -> Result<i64, CareLinkError>;
    async fn get_doctors_filtered_page(
        &self,
        criteria: &DoctorCriteria,
        page: PageRequest,
    ) -> Result<Vec<UserDoctor>, CareLinkError>;
}

/// The patients_doctors link table, addressed by user ids of both sides.
#[async_trait]
pub trait AssociationRepository: Send + Sync {
    async fn association_exists(&self, patient_user_id: i64, doctor_user_id: i64) -> Result<bool, CareLinkError>;
    async fn add_association(&self, patient_user_id: i64, doctor_user_id: i64) -> Result<(), CareLinkError>;
    /// Returns whether a row was removed.
    async fn remove_association(&self, patient_user_id: i64, doctor_user_id: i64) -> Result<bool, CareLinkError>;
}

pub trait Storage: UserRepository + PatientRepository + DoctorRepository + AssociationRepository {}

impl<T> Storage for T where T: UserRepository + PatientRepository + DoctorRepository + AssociationRepository {}

pub mod in_memory;
pub mod sqlite;
