mod doctor_tests;
mod patient_tests;
mod sqlite_tests;

use crate::core::models::{
    doctor::{DoctorSignup, Specialty},
    patient::PatientSignup,
    user::UserUpdate,
};
use crate::core::services::CareLinkService;
use crate::infrastructure::storage::Storage;
use crate::infrastructure::storage::in_memory::InMemoryStorage;
use std::sync::Arc;

pub const TEST_SECRET: &str = "test-secret";
pub const TEST_PASSWORD: &str = "Secret#123";

pub fn create_service_with(storage: Arc<dyn Storage>) -> CareLinkService {
    // Lowest bcrypt cost keeps the suite fast
    CareLinkService::new(storage, TEST_SECRET.to_string(), 3).with_password_cost(4)
}

pub fn create_test_service() -> CareLinkService {
    create_service_with(Arc::new(InMemoryStorage::new()))
}

pub fn patient_signup(n: u32) -> PatientSignup {
    PatientSignup {
        username: format!("patient{}", n),
        email: format!("patient{}@example.com", n),
        password: TEST_PASSWORD.to_string(),
        firstname: "Maria".to_string(),
        lastname: "Papadaki".to_string(),
        phone_number: format!("69000000{:02}", n),
        city: "Athens".to_string(),
        address: "Ermou 12".to_string(),
        amka: format!("{:011}", n),
        user_role: None,
    }
}

pub fn doctor_signup(n: u32, lastname: &str, city: &str, specialty: Specialty) -> DoctorSignup {
    DoctorSignup {
        username: format!("doctor{}", n),
        email: format!("doctor{}@example.com", n),
        password: TEST_PASSWORD.to_string(),
        firstname: "Nikos".to_string(),
        lastname: lastname.to_string(),
        phone_number: format!("21000000{:02}", n),
        city: city.to_string(),
        address: "Patision 40".to_string(),
        afm: format!("{:09}", n),
        doctor_specialty: specialty,
        user_role: None,
    }
}

pub fn update_for(id: i64, n: u32) -> UserUpdate {
    UserUpdate {
        id,
        username: format!("renamed{}", n),
        email: format!("renamed{}@example.com", n),
        firstname: "Eleni".to_string(),
        lastname: "Kosta".to_string(),
        phone_number: format!("69900000{:02}", n),
        city: "Thessaloniki".to_string(),
        address: "Tsimiski 5".to_string(),
    }
}
