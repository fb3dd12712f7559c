use crate::core::errors::CareLinkError;
use crate::core::models::doctor::{DoctorFilters, Specialty};
use crate::core::pagination::PageRequest;
use crate::core::services::CareLinkService;
use crate::infrastructure::storage::sqlite::SqliteStorage;
use crate::infrastructure::storage::{AssociationRepository, PatientRepository};
use crate::tests::{create_service_with, doctor_signup, patient_signup, update_for};
use std::sync::Arc;

async fn sqlite_storage() -> SqliteStorage {
    SqliteStorage::connect("sqlite::memory:").await.unwrap()
}

async fn sqlite_service() -> (SqliteStorage, CareLinkService) {
    let storage = sqlite_storage().await;
    let service = create_service_with(Arc::new(storage.clone()));
    (storage, service)
}

#[tokio::test]
async fn test_sqlite_signup_and_lookup() {
    let (_, service) = sqlite_service().await;
    let user = service.signup_patient(patient_signup(1)).await.unwrap();
    let patient = service.get_patient(user.id).await.unwrap();
    assert_eq!(patient.username, "patient1");
    assert_eq!(patient.amka, "00000000001");

    let doctor = service
        .signup_doctor(doctor_signup(1, "Georgiou", "Athens", Specialty::Angiologist))
        .await
        .unwrap();
    let view = service.get_doctor(doctor.id).await.unwrap();
    assert_eq!(view.doctor_specialty, Specialty::Angiologist);
}

#[tokio::test]
async fn test_sqlite_unique_index_rejects_duplicate_amka() {
    let storage = sqlite_storage().await;
    let service = create_service_with(Arc::new(storage.clone()));
    service.signup_patient(patient_signup(1)).await.unwrap();

    // Bypass the service checks to hit the index directly
    let mut duplicate = patient_signup(2);
    duplicate.amka = "00000000001".to_string();
    let (user, patient) = duplicate.into_parts("hash".to_string());
    assert!(matches!(
        storage.create_patient_user(user, patient).await,
        Err(CareLinkError::EntityAlreadyExists { .. })
    ));
    // The failed transaction left no orphan user behind
    assert!(service.get_user(2).await.is_err());
}

#[tokio::test]
async fn test_sqlite_primary_key_rejects_duplicate_pair() {
    let (storage, service) = sqlite_service().await;
    let patient = service.signup_patient(patient_signup(1)).await.unwrap();
    let doctor = service
        .signup_doctor(doctor_signup(1, "Georgiou", "Athens", Specialty::Surgeon))
        .await
        .unwrap();

    storage.add_association(patient.id, doctor.id).await.unwrap();
    assert!(matches!(
        storage.add_association(patient.id, doctor.id).await,
        Err(CareLinkError::EntityAlreadyExists { .. })
    ));
    assert!(storage.association_exists(patient.id, doctor.id).await.unwrap());
    assert!(storage.remove_association(patient.id, doctor.id).await.unwrap());
    assert!(!storage.remove_association(patient.id, doctor.id).await.unwrap());
}

#[tokio::test]
async fn test_sqlite_like_wildcards_match_literally() {
    let (_, service) = sqlite_service().await;
    service
        .signup_doctor(doctor_signup(1, "Ab_cd", "Athens", Specialty::Surgeon))
        .await
        .unwrap();
    service
        .signup_doctor(doctor_signup(2, "Abxcd", "Athens", Specialty::Surgeon))
        .await
        .unwrap();

    let by = |lastname: &str| DoctorFilters {
        lastname: Some(lastname.to_string()),
        ..Default::default()
    };
    let page = service
        .doctors_filtered_page(by("ab_"), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].lastname, "Ab_cd");

    assert!(matches!(
        service.doctors_filtered_page(by("%"), PageRequest::default()).await,
        Err(CareLinkError::EntityNotFound { .. })
    ));
}

#[tokio::test]
async fn test_sqlite_pages_follow_doctor_order() {
    let (_, service) = sqlite_service().await;
    let patient = service.signup_patient(patient_signup(1)).await.unwrap();
    let mut doctors = Vec::new();
    for n in 1..=5 {
        let doctor = service
            .signup_doctor(doctor_signup(n, "Georgiou", "Athens", Specialty::Pulmonologist))
            .await
            .unwrap();
        doctors.push(doctor.id);
    }
    for id in doctors.iter().rev() {
        service.add_doctor_to_patient(patient.id, *id).await.unwrap();
    }

    let page = service
        .patient_doctors_page(patient.id, PageRequest::new(2, 2).unwrap())
        .await
        .unwrap();
    assert_eq!(page.total_records, 5);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.data.iter().map(|d| d.id).collect::<Vec<_>>(), doctors[2..4].to_vec());

    let filtered = service
        .doctors_filtered_page(
            DoctorFilters {
                city: Some("ath".to_string()),
                specialty: Some("Pulmonologist".to_string()),
                ..Default::default()
            },
            PageRequest::new(3, 2).unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(filtered.data.iter().map(|d| d.id).collect::<Vec<_>>(), vec![doctors[4]]);
}

#[tokio::test]
async fn test_sqlite_update_persists() {
    let (_, service) = sqlite_service().await;
    let doctor = service
        .signup_doctor(doctor_signup(1, "Georgiou", "Athens", Specialty::Nephrologist))
        .await
        .unwrap();

    let updated = service.update_doctor(doctor.id, update_for(doctor.id, 1)).await.unwrap();
    assert_eq!(updated.city, "Thessaloniki");
    assert_eq!(service.get_doctor(doctor.id).await.unwrap(), updated);
    assert_eq!(service.get_user(doctor.id).await.unwrap().username, "renamed1");
}
