use crate::core::errors::CareLinkError;
use crate::core::models::{
    doctor::{Doctor, DoctorCriteria, NewDoctor, UserDoctor},
    patient::{NewPatient, Patient, UserPatient},
    user::{NewUser, User, UserUpdate},
};
use crate::core::pagination::PageRequest;
use crate::infrastructure::storage::{AssociationRepository, DoctorRepository, PatientRepository, UserRepository};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    patients: BTreeMap<i64, Patient>,
    doctors: BTreeMap<i64, Doctor>,
    // (patient id, doctor id)
    links: BTreeSet<(i64, i64)>,
    next_user_id: i64,
    next_patient_id: i64,
    next_doctor_id: i64,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn patient_for_user(&self, user_id: i64) -> Option<&Patient> {
        self.patients.values().find(|p| p.user_id == user_id)
    }

    fn doctor_for_user(&self, user_id: i64) -> Option<&Doctor> {
        self.doctors.values().find(|d| d.user_id == user_id)
    }

    fn user_patient(&self, patient: &Patient) -> Option<UserPatient> {
        self.users.get(&patient.user_id).map(|user| UserPatient {
            user: user.clone(),
            patient: patient.clone(),
        })
    }

    fn user_doctor(&self, doctor: &Doctor) -> Option<UserDoctor> {
        self.users.get(&doctor.user_id).map(|user| UserDoctor {
            user: user.clone(),
            doctor: doctor.clone(),
        })
    }

    fn check_user_unique(&self, username: &str, email: &str, except: Option<i64>) -> Result<(), CareLinkError> {
        let others = self.users.values().filter(|u| Some(u.id) != except);
        for user in others {
            if user.username == username {
                return Err(CareLinkError::already_exists(
                    "User",
                    format!("User with username {} already exists", username),
                ));
            }
            if user.email == email {
                return Err(CareLinkError::already_exists(
                    "User",
                    format!("User with email {} already exists", email),
                ));
            }
        }
        Ok(())
    }

    fn check_doctor_phone_unique(&self, phone_number: &str, except_user: Option<i64>) -> Result<(), CareLinkError> {
        if self
            .doctors
            .values()
            .any(|d| d.phone_number == phone_number && Some(d.user_id) != except_user)
        {
            return Err(CareLinkError::already_exists(
                "Doctor",
                format!("Doctor with phone number {} already exists", phone_number),
            ));
        }
        Ok(())
    }

    fn insert_user(&mut self, new_user: NewUser) -> User {
        let now = Utc::now();
        let user = User {
            id: Self::next_id(&mut self.next_user_id),
            username: new_user.username,
            email: new_user.email,
            password: new_user.password_hash,
            firstname: new_user.firstname,
            lastname: new_user.lastname,
            role: new_user.role,
            inserted_at: now,
            modified_at: now,
        };
        self.users.insert(user.id, user.clone());
        user
    }

    fn apply_user_update(&mut self, user_id: i64, update: &UserUpdate) -> Result<(), CareLinkError> {
        let user = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| CareLinkError::not_found("User", format!("User with id {} wasn't found", user_id)))?;
        user.username = update.username.clone();
        user.email = update.email.clone();
        user.firstname = update.firstname.clone();
        user.lastname = update.lastname.clone();
        user.modified_at = Utc::now();
        Ok(())
    }

    fn resolve_link(&self, patient_user_id: i64, doctor_user_id: i64) -> Result<(i64, i64), CareLinkError> {
        let patient = self.patient_for_user(patient_user_id).ok_or_else(|| {
            CareLinkError::not_found(
                "Patient",
                format!("Patient with user id {} wasn't found", patient_user_id),
            )
        })?;
        let doctor = self.doctor_for_user(doctor_user_id).ok_or_else(|| {
            CareLinkError::not_found(
                "Doctor",
                format!("Doctor with user id {} wasn't found", doctor_user_id),
            )
        })?;
        Ok((patient.id, doctor.id))
    }

    fn doctors_of(&self, patient_user_id: i64) -> Vec<&Doctor> {
        let Some(patient) = self.patient_for_user(patient_user_id) else {
            return Vec::new();
        };
        self.links
            .range((patient.id, i64::MIN)..=(patient.id, i64::MAX))
            .filter_map(|(_, doctor_id)| self.doctors.get(doctor_id))
            .collect()
    }

    fn patients_of(&self, doctor_user_id: i64) -> Vec<&Patient> {
        let Some(doctor) = self.doctor_for_user(doctor_user_id) else {
            return Vec::new();
        };
        // patients map iterates in id order
        self.patients
            .values()
            .filter(|p| self.links.contains(&(p.id, doctor.id)))
            .collect()
    }

    fn filtered_doctors<'a>(&'a self, criteria: &'a DoctorCriteria) -> impl Iterator<Item = &'a Doctor> + 'a {
        self.doctors.values().filter(move |d| {
            self.users
                .get(&d.user_id)
                .is_some_and(|u| criteria.matches(&u.lastname, &d.city, d.specialty))
        })
    }
}

/// Map-backed store used by tests and ephemeral runs.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryStorage {
    async fn get_user(&self, user_id: i64) -> Result<Option<User>, CareLinkError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&user_id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, CareLinkError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, CareLinkError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl PatientRepository for InMemoryStorage {
    async fn create_patient_user(&self, user: NewUser, patient: NewPatient) -> Result<UserPatient, CareLinkError> {
        let mut tables = self.tables.write().await;
        tables.check_user_unique(&user.username, &user.email, None)?;
        if tables.patients.values().any(|p| p.amka == patient.amka) {
            return Err(CareLinkError::already_exists(
                "Patient",
                format!("Patient with amka {} already exists", patient.amka),
            ));
        }

        let user = tables.insert_user(user);
        let patient = Patient {
            id: Tables::next_id(&mut tables.next_patient_id),
            user_id: user.id,
            amka: patient.amka,
            city: patient.city,
            address: patient.address,
            phone_number: patient.phone_number,
            inserted_at: user.inserted_at,
            modified_at: user.modified_at,
        };
        tables.patients.insert(patient.id, patient.clone());
        Ok(UserPatient { user, patient })
    }

    async fn get_patient_by_user_id(&self, user_id: i64) -> Result<Option<UserPatient>, CareLinkError> {
        let tables = self.tables.read().await;
        Ok(tables.patient_for_user(user_id).and_then(|p| tables.user_patient(p)))
    }

    async fn get_patient_by_amka(&self, amka: &str) -> Result<Option<UserPatient>, CareLinkError> {
        let tables = self.tables.read().await;
        Ok(tables
            .patients
            .values()
            .find(|p| p.amka == amka)
            .and_then(|p| tables.user_patient(p)))
    }

    async fn update_patient_profile(&self, user_id: i64, update: &UserUpdate) -> Result<UserPatient, CareLinkError> {
        let mut tables = self.tables.write().await;
        let patient_id = tables
            .patient_for_user(user_id)
            .map(|p| p.id)
            .ok_or_else(|| CareLinkError::not_found("Patient", format!("Patient with user id {} wasn't found", user_id)))?;
        tables.check_user_unique(&update.username, &update.email, Some(user_id))?;
        tables.apply_user_update(user_id, update)?;

        let now = Utc::now();
        if let Some(patient) = tables.patients.get_mut(&patient_id) {
            patient.city = update.city.clone();
            patient.address = update.address.clone();
            patient.phone_number = update.phone_number.clone();
            patient.modified_at = now;
        }
        tables
            .patients
            .get(&patient_id)
            .and_then(|p| tables.user_patient(p))
            .ok_or_else(|| CareLinkError::InternalServerError("Updated patient vanished".to_string()))
    }

    async fn count_patient_doctors(&self, patient_user_id: i64) -> Result<i64, CareLinkError> {
        let tables = self.tables.read().await;
        Ok(tables.doctors_of(patient_user_id).len() as i64)
    }

    async fn get_patient_doctors_page(
        &self,
        patient_user_id: i64,
        page: PageRequest,
    ) -> Result<Vec<UserDoctor>, CareLinkError> {
        let tables = self.tables.read().await;
        let doctors = tables.doctors_of(patient_user_id);
        Ok(page
            .apply(doctors)
            .into_iter()
            .filter_map(|d| tables.user_doctor(d))
            .collect())
    }
}

#[async_trait]
impl DoctorRepository for InMemoryStorage {
    async fn create_doctor_user(&self, user: NewUser, doctor: NewDoctor) -> Result<UserDoctor, CareLinkError> {
        let mut tables = self.tables.write().await;
        tables.check_user_unique(&user.username, &user.email, None)?;
        if tables.doctors.values().any(|d| d.afm == doctor.afm) {
            return Err(CareLinkError::already_exists(
                "Doctor",
                format!("Doctor with afm {} already exists", doctor.afm),
            ));
        }
        tables.check_doctor_phone_unique(&doctor.phone_number, None)?;

        let user = tables.insert_user(user);
        let doctor = Doctor {
            id: Tables::next_id(&mut tables.next_doctor_id),
            user_id: user.id,
            afm: doctor.afm,
            city: doctor.city,
            address: doctor.address,
            phone_number: doctor.phone_number,
            specialty: doctor.specialty,
            inserted_at: user.inserted_at,
            modified_at: user.modified_at,
        };
        tables.doctors.insert(doctor.id, doctor.clone());
        Ok(UserDoctor { user, doctor })
    }

    async fn get_doctor_by_user_id(&self, user_id: i64) -> Result<Option<UserDoctor>, CareLinkError> {
        let tables = self.tables.read().await;
        Ok(tables.doctor_for_user(user_id).and_then(|d| tables.user_doctor(d)))
    }

    async fn get_doctor_by_afm(&self, afm: &str) -> Result<Option<UserDoctor>, CareLinkError> {
        let tables = self.tables.read().await;
        Ok(tables
            .doctors
            .values()
            .find(|d| d.afm == afm)
            .and_then(|d| tables.user_doctor(d)))
    }

    async fn get_doctor_by_phone_number(&self, phone_number: &str) -> Result<Option<UserDoctor>, CareLinkError> {
        let tables = self.tables.read().await;
        Ok(tables
            .doctors
            .values()
            .find(|d| d.phone_number == phone_number)
            .and_then(|d| tables.user_doctor(d)))
    }

    async fn update_doctor_profile(&self, user_id: i64, update: &UserUpdate) -> Result<UserDoctor, CareLinkError> {
        let mut tables = self.tables.write().await;
        let doctor_id = tables
            .doctor_for_user(user_id)
            .map(|d| d.id)
            .ok_or_else(|| CareLinkError::not_found("Doctor", format!("Doctor with user id {} wasn't found", user_id)))?;
        tables.check_user_unique(&update.username, &update.email, Some(user_id))?;
        tables.check_doctor_phone_unique(&update.phone_number, Some(user_id))?;
        tables.apply_user_update(user_id, update)?;

        let now = Utc::now();
        if let Some(doctor) = tables.doctors.get_mut(&doctor_id) {
            doctor.city = update.city.clone();
            doctor.address = update.address.clone();
            doctor.phone_number = update.phone_number.clone();
            doctor.modified_at = now;
        }
        tables
            .doctors
            .get(&doctor_id)
            .and_then(|d| tables.user_doctor(d))
            .ok_or_else(|| CareLinkError::InternalServerError("Updated doctor vanished".to_string()))
    }

    async fn count_doctor_patients(&self, doctor_user_id: i64) -> Result<i64, CareLinkError> {
        let tables = self.tables.read().await;
        Ok(tables.patients_of(doctor_user_id).len() as i64)
    }

    async fn get_doctor_patients_page(
        &self,
        doctor_user_id: i64,
        page: PageRequest,
    ) -> Result<Vec<UserPatient>, CareLinkError> {
        let tables = self.tables.read().await;
        let patients = tables.patients_of(doctor_user_id);
        Ok(page
            .apply(patients)
            .into_iter()
            .filter_map(|p| tables.user_patient(p))
            .collect())
    }

    async fn count_doctors_filtered(&self, criteria: &DoctorCriteria) -> Result<i64, CareLinkError> {
        let tables = self.tables.read().await;
        Ok(tables.filtered_doctors(criteria).count() as i64)
    }

    async fn get_doctors_filtered_page(
        &self,
        criteria: &DoctorCriteria,
        page: PageRequest,
    ) -> Result<Vec<UserDoctor>, CareLinkError> {
        let tables = self.tables.read().await;
        Ok(page
            .apply(tables.filtered_doctors(criteria))
            .into_iter()
            .filter_map(|d| tables.user_doctor(d))
            .collect())
    }
}

#[async_trait]
impl AssociationRepository for InMemoryStorage {
    async fn association_exists(&self, patient_user_id: i64, doctor_user_id: i64) -> Result<bool, CareLinkError> {
        let tables = self.tables.read().await;
        match tables.resolve_link(patient_user_id, doctor_user_id) {
            Ok(key) => Ok(tables.links.contains(&key)),
            Err(CareLinkError::EntityNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn add_association(&self, patient_user_id: i64, doctor_user_id: i64) -> Result<(), CareLinkError> {
        let mut tables = self.tables.write().await;
        let key = tables.resolve_link(patient_user_id, doctor_user_id)?;
        if !tables.links.insert(key) {
            return Err(CareLinkError::already_exists(
                "Doctor",
                format!("Doctor with user id {} already added to my doctors", doctor_user_id),
            ));
        }
        Ok(())
    }

    async fn remove_association(&self, patient_user_id: i64, doctor_user_id: i64) -> Result<bool, CareLinkError> {
        let mut tables = self.tables.write().await;
        let key = tables.resolve_link(patient_user_id, doctor_user_id)?;
        Ok(tables.links.remove(&key))
    }
}
