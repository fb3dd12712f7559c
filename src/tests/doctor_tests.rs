use crate::core::errors::CareLinkError;
use crate::core::models::doctor::{DoctorFilters, Specialty};
use crate::core::pagination::PageRequest;
use crate::core::services::CareLinkService;
use crate::tests::{create_test_service, doctor_signup, patient_signup, update_for};

async fn seed_doctors(service: &CareLinkService) -> Vec<i64> {
    let doctors = [
        ("Papadopoulos", "Athens", Specialty::Cardiologist),
        ("Papas", "Patra", Specialty::Surgeon),
        ("Georgiou", "athens", Specialty::Cardiologist),
        ("Nikolaou", "Larisa", Specialty::Nephrologist),
        ("Pappas", "Athens", Specialty::Surgeon),
    ];
    let mut ids = Vec::new();
    for (n, (lastname, city, specialty)) in doctors.into_iter().enumerate() {
        let user = service
            .signup_doctor(doctor_signup(n as u32 + 1, lastname, city, specialty))
            .await
            .unwrap();
        ids.push(user.id);
    }
    ids
}

fn filters(lastname: &str, city: &str, specialty: &str) -> DoctorFilters {
    DoctorFilters {
        lastname: Some(lastname.to_string()),
        city: Some(city.to_string()),
        specialty: Some(specialty.to_string()),
    }
}

async fn matching_lastnames(service: &CareLinkService, filters: DoctorFilters) -> Vec<String> {
    service
        .doctors_filtered_page(filters, PageRequest::default())
        .await
        .unwrap()
        .data
        .into_iter()
        .map(|d| d.lastname)
        .collect()
}

#[tokio::test]
async fn test_filter_by_lastname_prefix() {
    let service = create_test_service();
    seed_doctors(&service).await;
    assert_eq!(
        matching_lastnames(&service, filters("pap", "", "")).await,
        vec!["Papadopoulos", "Papas", "Pappas"]
    );
}

#[tokio::test]
async fn test_filters_combine_with_and() {
    let service = create_test_service();
    seed_doctors(&service).await;
    assert_eq!(
        matching_lastnames(&service, filters("", "ATH", "Cardiologist")).await,
        vec!["Papadopoulos", "Georgiou"]
    );
    assert_eq!(
        matching_lastnames(&service, filters("Pap", "Athens", "Surgeon")).await,
        vec!["Pappas"]
    );
}

#[tokio::test]
async fn test_empty_filters_match_everyone() {
    let service = create_test_service();
    seed_doctors(&service).await;
    let page = service
        .doctors_filtered_page(DoctorFilters::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total_records, 5);
    assert_eq!(
        matching_lastnames(&service, filters("", "", "")).await.len(),
        5
    );
}

#[tokio::test]
async fn test_filter_without_matches() {
    let service = create_test_service();
    seed_doctors(&service).await;
    match service
        .doctors_filtered_page(filters("Zed", "", ""), PageRequest::default())
        .await
    {
        Err(CareLinkError::EntityNotFound { message, .. }) => {
            assert_eq!(message, "No doctors found matching the given criteria")
        }
        other => panic!("expected EntityNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_filter_unknown_specialty() {
    let service = create_test_service();
    seed_doctors(&service).await;
    assert!(matches!(
        service
            .doctors_filtered_page(filters("", "", "Dentist"), PageRequest::default())
            .await,
        Err(CareLinkError::InvalidArgument { .. })
    ));
}

#[tokio::test]
async fn test_filtered_pages() {
    let service = create_test_service();
    let ids = seed_doctors(&service).await;

    for (number, expected) in [(1, &ids[0..2]), (2, &ids[2..4]), (3, &ids[4..5])] {
        let page = service
            .doctors_filtered_page(DoctorFilters::default(), PageRequest::new(number, 2).unwrap())
            .await
            .unwrap();
        assert_eq!(page.total_records, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page_size, 2);
        assert_eq!(page.data.iter().map(|d| d.id).collect::<Vec<_>>(), expected.to_vec());
    }
}

#[tokio::test]
async fn test_doctor_patients_and_removal() {
    let service = create_test_service();
    let doctor = seed_doctors(&service).await[0];
    let mut patients = Vec::new();
    for n in 1..=3 {
        let patient = service.signup_patient(patient_signup(n)).await.unwrap();
        service.add_doctor_to_patient(patient.id, doctor).await.unwrap();
        patients.push(patient.id);
    }

    let page = service
        .doctor_patients_page(doctor, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.data.iter().map(|p| p.id).collect::<Vec<_>>(), patients);

    service.remove_patient_from_doctor(doctor, patients[1]).await.unwrap();
    assert!(matches!(
        service.remove_patient_from_doctor(doctor, patients[1]).await,
        Err(CareLinkError::EntityNotFound { .. })
    ));
    let page = service
        .doctor_patients_page(doctor, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total_records, 2);
}

#[tokio::test]
async fn test_doctor_patients_page_unknown_doctor() {
    let service = create_test_service();
    let patient = service.signup_patient(patient_signup(1)).await.unwrap();
    assert!(matches!(
        service.doctor_patients_page(patient.id, PageRequest::default()).await,
        Err(CareLinkError::EntityNotFound { ref entity, .. }) if entity == "Doctor"
    ));
}

#[tokio::test]
async fn test_update_doctor_phone_conflict() {
    let service = create_test_service();
    let ids = seed_doctors(&service).await;

    let mut update = update_for(ids[0], 1);
    update.phone_number = "2100000002".to_string();
    assert!(matches!(
        service.update_doctor(ids[0], update).await,
        Err(CareLinkError::EntityAlreadyExists { ref message, .. }) if message.contains("phone number")
    ));

    let mut keep_own = update_for(ids[0], 1);
    keep_own.phone_number = "2100000001".to_string();
    let updated = service.update_doctor(ids[0], keep_own).await.unwrap();
    assert_eq!(updated.phone_number, "2100000001");
    assert_eq!(updated.lastname, "Kosta");
    assert_eq!(updated.doctor_specialty, Specialty::Cardiologist);
}
