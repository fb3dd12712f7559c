use crate::core::errors::CareLinkError;
use crate::core::models::doctor::Specialty;
use crate::core::pagination::PageRequest;
use crate::core::services::CareLinkService;
use crate::tests::{create_test_service, doctor_signup, patient_signup, update_for};

async fn patient_and_doctors(service: &CareLinkService, doctors: u32) -> (i64, Vec<i64>) {
    let patient = service.signup_patient(patient_signup(1)).await.unwrap();
    let mut ids = Vec::new();
    for n in 1..=doctors {
        let doctor = service
            .signup_doctor(doctor_signup(n, "Georgiou", "Athens", Specialty::Pathologist))
            .await
            .unwrap();
        ids.push(doctor.id);
    }
    (patient.id, ids)
}

#[tokio::test]
async fn test_add_doctor_twice() {
    let service = create_test_service();
    let (patient, doctors) = patient_and_doctors(&service, 1).await;

    service.add_doctor_to_patient(patient, doctors[0]).await.unwrap();
    let result = service.add_doctor_to_patient(patient, doctors[0]).await;
    match result {
        Err(CareLinkError::EntityAlreadyExists { message, .. }) => assert_eq!(
            message,
            format!("Doctor with user id {} already added to my doctors", doctors[0])
        ),
        other => panic!("expected EntityAlreadyExists, got {:?}", other),
    }
}

#[tokio::test]
async fn test_add_unknown_doctor() {
    let service = create_test_service();
    let (patient, _) = patient_and_doctors(&service, 0).await;
    // A patient's user id is not a doctor
    assert!(matches!(
        service.add_doctor_to_patient(patient, patient).await,
        Err(CareLinkError::EntityNotFound { ref entity, .. }) if entity == "Doctor"
    ));
}

#[tokio::test]
async fn test_remove_doctor() {
    let service = create_test_service();
    let (patient, doctors) = patient_and_doctors(&service, 1).await;

    assert!(matches!(
        service.remove_doctor_from_patient(patient, doctors[0]).await,
        Err(CareLinkError::EntityNotFound { ref message, .. }) if message.contains("is not associated")
    ));

    service.add_doctor_to_patient(patient, doctors[0]).await.unwrap();
    service.remove_doctor_from_patient(patient, doctors[0]).await.unwrap();
    assert!(matches!(
        service.patient_doctors_page(patient, PageRequest::default()).await,
        Err(CareLinkError::EntityNotFound { .. })
    ));
}

#[tokio::test]
async fn test_patient_doctors_pages() {
    let service = create_test_service();
    let (patient, doctors) = patient_and_doctors(&service, 3).await;
    // Insert out of order; pages still follow doctor order
    for id in doctors.iter().rev() {
        service.add_doctor_to_patient(patient, *id).await.unwrap();
    }

    let first = service
        .patient_doctors_page(patient, PageRequest::new(1, 2).unwrap())
        .await
        .unwrap();
    assert_eq!(first.total_records, 3);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.data.iter().map(|d| d.id).collect::<Vec<_>>(), doctors[..2].to_vec());

    let second = service
        .patient_doctors_page(patient, PageRequest::new(2, 2).unwrap())
        .await
        .unwrap();
    assert_eq!(second.data.iter().map(|d| d.id).collect::<Vec<_>>(), doctors[2..].to_vec());

    let past_end = service
        .patient_doctors_page(patient, PageRequest::new(3, 2).unwrap())
        .await
        .unwrap();
    assert!(past_end.data.is_empty());
    assert_eq!(past_end.page_number, 3);
}

#[tokio::test]
async fn test_patient_doctors_page_without_doctors() {
    let service = create_test_service();
    let (patient, _) = patient_and_doctors(&service, 1).await;
    match service.patient_doctors_page(patient, PageRequest::default()).await {
        Err(CareLinkError::EntityNotFound { message, .. }) => {
            assert_eq!(message, format!("No doctors found for patient with user id {}", patient))
        }
        other => panic!("expected EntityNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_update_patient() {
    let service = create_test_service();
    let (patient, _) = patient_and_doctors(&service, 0).await;

    let updated = service.update_patient(patient, update_for(patient, 1)).await.unwrap();
    assert_eq!(updated.username, "renamed1");
    assert_eq!(updated.city, "Thessaloniki");
    assert_eq!(updated.amka, "00000000001");

    let fetched = service.get_patient(patient).await.unwrap();
    assert_eq!(fetched, updated);

    // Re-applying the same values conflicts with nobody
    service.update_patient(patient, update_for(patient, 1)).await.unwrap();
}

#[tokio::test]
async fn test_update_patient_id_mismatch() {
    let service = create_test_service();
    let (patient, _) = patient_and_doctors(&service, 0).await;
    assert!(matches!(
        service.update_patient(patient, update_for(patient + 1, 1)).await,
        Err(CareLinkError::InvalidArgument { ref field, .. }) if field == "id"
    ));
}

#[tokio::test]
async fn test_update_patient_username_taken() {
    let service = create_test_service();
    let (patient, _) = patient_and_doctors(&service, 0).await;
    service.signup_patient(patient_signup(2)).await.unwrap();

    let mut update = update_for(patient, 1);
    update.username = "patient2".to_string();
    assert!(matches!(
        service.update_patient(patient, update).await,
        Err(CareLinkError::EntityAlreadyExists { .. })
    ));
}
