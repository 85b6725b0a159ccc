//! Tests for the exported `ClinicCore` surface in offline mode.

use fisionet_core::{
    appointment_status_label, appointment_status_options, appointment_status_value,
    open_offline, open_offline_in_memory, open_remote, patient_status_options, FfiClientConfig,
    FfiLoadState, FfiPatient, FfiRecordContent, FfiMedicalRecord, FisioNetError,
};

fn draft_patient(name: &str, diagnosis: &str) -> FfiPatient {
    FfiPatient {
        id: None,
        created_at: None,
        name: name.to_string(),
        diagnosis: diagnosis.to_string(),
        occupation: None,
        therapist_id: String::new(),
        phone: None,
        address: None,
        gender: None,
        status: String::new(),
        date_of_birth: None,
    }
}

#[test]
fn test_create_patient_stamps_owner_and_defaults() {
    let core = open_offline_in_memory("therapist-1".into()).unwrap();

    let ana = core
        .create_patient(draft_patient("Ana", "Lower back pain"), Some(30))
        .unwrap();

    assert_eq!(ana.id, Some(1));
    assert_eq!(ana.therapist_id, "therapist-1");
    assert_eq!(ana.status, "Aktif");
    let dob = ana.date_of_birth.unwrap();
    assert!(dob.ends_with("-01-01"));
}

#[test]
fn test_create_patient_rejects_impossible_age() {
    let core = open_offline_in_memory("t-1".into()).unwrap();

    let err = core
        .create_patient(draft_patient("Ana", "LBP"), Some(u32::MAX))
        .unwrap_err();
    assert!(matches!(err, FisioNetError::Validation(_)));
    assert!(matches!(
        core.create_patient(draft_patient("Ana", "LBP"), Some(151)),
        Err(FisioNetError::Validation(_))
    ));
    assert!(core.refresh_patients().unwrap().is_empty());
}

#[test]
fn test_open_remote_starts_signed_out() {
    let core = open_remote(FfiClientConfig {
        base_url: "https://project.example.co".into(),
        anon_key: "anon-key".into(),
        request_timeout_secs: 5,
        database_path: None,
    })
    .unwrap();
    assert!(core.current_user().is_none());
    assert_eq!(core.display_name(), "User");

    assert!(matches!(
        open_remote(FfiClientConfig {
            base_url: "ftp://project.example.co".into(),
            anon_key: "anon-key".into(),
            request_timeout_secs: 5,
            database_path: None,
        }),
        Err(FisioNetError::Validation(_))
    ));
}

#[test]
fn test_blank_principal_rejected() {
    assert!(matches!(
        open_offline_in_memory("  ".into()),
        Err(FisioNetError::Validation(_))
    ));
}

#[test]
fn test_patient_list_and_search() {
    let core = open_offline_in_memory("t-1".into()).unwrap();
    assert_eq!(core.patients_state(), FfiLoadState::Empty);

    core.create_patient(draft_patient("Ana", "Lower back pain"), None).unwrap();
    core.create_patient(draft_patient("Budi", "Frozen shoulder"), None).unwrap();
    let budi = core.get_patient(2).unwrap();
    core.set_patient_status(budi.id.unwrap(), "Selesai".into()).unwrap();

    assert!(core.cached_patients().is_empty());
    assert_eq!(core.refresh_patients().unwrap().len(), 2);
    assert_eq!(core.patients_state(), FfiLoadState::Loaded);

    let hits = core.search_patients("SHOULDER".into(), None);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Budi");

    let active = core.search_patients(String::new(), Some("Aktif".into()));
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].name, "Ana");
}

#[test]
fn test_patient_status_filter_ignores_appointment_labels() {
    let core = open_offline_in_memory("t-1".into()).unwrap();
    let ana = core.create_patient(draft_patient("Ana", "LBP"), None).unwrap();
    core.set_patient_status(ana.id.unwrap(), "Selesai".into()).unwrap();
    core.refresh_patients().unwrap();

    assert!(core.search_patients(String::new(), Some("Hadir".into())).is_empty());
    let finished = core.search_patients(String::new(), Some("Selesai".into()));
    assert_eq!(finished.len(), 1);
}

#[test]
fn test_appointment_flow_with_labels() {
    let core = open_offline_in_memory("t-1".into()).unwrap();
    let ana = core.create_patient(draft_patient("Ana", "LBP"), None).unwrap();

    let booked = core
        .create_appointment(ana.id, None, "2024-06-01".into(), "09:00".into(), None)
        .unwrap();
    assert_eq!(booked.patient_name, "Ana");
    assert_eq!(booked.status, "Terjadwal");
    assert_eq!(booked.status_label, "Menunggu");

    core.create_appointment(None, Some("Pak Joko".into()), "2024-06-01".into(), "10:00".into(), Some("walk-in".into()))
        .unwrap();

    core.set_appointment_status(booked.id.unwrap(), "Hadir".into()).unwrap();

    let on_day = core.appointments_on("2024-06-01".into()).unwrap();
    assert_eq!(on_day.len(), 2);
    let updated = on_day.iter().find(|a| a.id == booked.id).unwrap();
    assert_eq!(updated.status, "Selesai");
    assert_eq!(updated.status_label, "Hadir");

    core.refresh_appointments().unwrap();
    let waiting = core.filter_appointments(None, Some("2024-06-01".into()), Some("Menunggu".into()));
    assert_eq!(waiting.len(), 1);
    assert_eq!(waiting[0].patient_name, "Pak Joko");
    assert_eq!(waiting[0].patient_id, None);
}

#[test]
fn test_walk_in_needs_a_name() {
    let core = open_offline_in_memory("t-1".into()).unwrap();
    let err = core
        .create_appointment(None, None, "2024-06-01".into(), "09:00".into(), None)
        .unwrap_err();
    assert!(matches!(err, FisioNetError::Validation(_)));
}

#[test]
fn test_booking_missing_patient_is_not_found() {
    let core = open_offline_in_memory("t-1".into()).unwrap();
    let err = core
        .create_appointment(Some(42), None, "2024-06-01".into(), "09:00".into(), None)
        .unwrap_err();
    assert!(matches!(err, FisioNetError::NotFound(_)));
}

#[test]
fn test_billing_and_totals() {
    let core = open_offline_in_memory("t-1".into()).unwrap();
    let ana = core.create_patient(draft_patient("Ana", "LBP"), None).unwrap();
    let basic = core.create_package("Basic".into(), 100_000.0, vec!["TENS".into()]).unwrap();
    let full = core.create_package("Lengkap".into(), 250_000.0, vec![]).unwrap();

    core.create_transaction(ana.id, None, basic.id.unwrap(), "2024-06-01".into()).unwrap();
    core.create_transaction(None, Some("Pak Joko".into()), full.id.unwrap(), "2024-06-02".into())
        .unwrap();

    core.refresh_transactions().unwrap();
    assert_eq!(core.transactions_total(None), 350_000.0);
    assert_eq!(core.transactions_total(Some("2024-06-02".into())), 250_000.0);
    assert_eq!(core.filter_transactions(Some("basic".into()), None).len(), 1);
    assert_eq!(core.transactions_for_patient(ana.id.unwrap()).unwrap().len(), 1);
}

#[test]
fn test_delete_patient_cascades() {
    let core = open_offline_in_memory("t-1".into()).unwrap();
    let ana = core.create_patient(draft_patient("Ana", "LBP"), None).unwrap();
    let id = ana.id.unwrap();

    core.create_appointment(Some(id), None, "2024-06-01".into(), "09:00".into(), None).unwrap();
    core.add_progress(id, "2024-06-02".into(), "Better".into()).unwrap();
    core.add_medical_record(FfiMedicalRecord {
        id: None,
        created_at: None,
        patient_id: id,
        date: "2024-06-01".into(),
        content: FfiRecordContent::Notes {
            notes: "Initial".into(),
            treatment: "Massage".into(),
        },
    })
    .unwrap();

    let report = core.delete_patient(id).unwrap();
    assert_eq!(report.completed.last().map(String::as_str), Some("patients"));

    assert!(core.appointments_for_patient(id).unwrap().is_empty());
    assert!(core.progress_for_patient(id).unwrap().is_empty());
    assert!(core.medical_records_for_patient(id).unwrap().is_empty());
    assert!(matches!(core.get_patient(id), Err(FisioNetError::NotFound(_))));
}

#[test]
fn test_dashboard_stats_from_caches() {
    let core = open_offline_in_memory("t-1".into()).unwrap();
    let ana = core.create_patient(draft_patient("Ana", "LBP"), None).unwrap();
    let budi = core.create_patient(draft_patient("Budi", "Knee OA"), None).unwrap();

    for (patient, date) in [(&ana, "2024-06-15"), (&budi, "2024-06-15"), (&ana, "2024-06-02")] {
        core.add_medical_record(FfiMedicalRecord {
            id: None,
            created_at: None,
            patient_id: patient.id.unwrap(),
            date: date.into(),
            content: FfiRecordContent::Notes {
                notes: "Visit".into(),
                treatment: "TENS".into(),
            },
        })
        .unwrap();
    }
    core.create_appointment(ana.id, None, "2024-06-15".into(), "09:00".into(), None).unwrap();

    core.refresh_patients().unwrap();
    core.refresh_medical_records().unwrap();
    core.refresh_appointments().unwrap();

    let stats = core.dashboard_stats(Some("2024-06-15".into())).unwrap();
    assert_eq!(stats.total_patients, 2);
    assert_eq!(stats.total_records, 3);
    assert_eq!(stats.patients_today, 2);
    assert_eq!(stats.patients_this_month, 2);
    assert_eq!(stats.appointment_counts.len(), 1);
    assert_eq!(stats.appointment_counts[0].label, "Menunggu");

    assert!(matches!(
        core.dashboard_stats(Some("15/06/2024".into())),
        Err(FisioNetError::Validation(_))
    ));
}

#[test]
fn test_sign_out_clears_caches() {
    let core = open_offline_in_memory("t-1".into()).unwrap();
    core.create_patient(draft_patient("Ana", "LBP"), None).unwrap();
    core.refresh_patients().unwrap();
    assert_eq!(core.cached_patients().len(), 1);

    core.sign_out().unwrap();
    assert!(core.cached_patients().is_empty());
    assert_eq!(core.patients_state(), FfiLoadState::Empty);
}

#[test]
fn test_offline_file_persists_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clinic.db").to_string_lossy().to_string();

    {
        let core = open_offline(path.clone(), "t-1".into()).unwrap();
        core.create_patient(draft_patient("Ana", "LBP"), None).unwrap();
    }

    let core = open_offline(path, "t-1".into()).unwrap();
    let patients = core.refresh_patients().unwrap();
    assert_eq!(patients.len(), 1);
    assert_eq!(patients[0].name, "Ana");
}

#[test]
fn test_status_functions() {
    assert_eq!(appointment_status_label("Dibatalkan".into()), "Tidak Hadir");
    assert_eq!(appointment_status_value("Tidak Hadir".into()), "Dibatalkan");
    assert_eq!(appointment_status_label("Ditunda".into()), "Ditunda");
    assert_eq!(appointment_status_options().len(), 3);

    let patient_values: Vec<String> = patient_status_options().into_iter().map(|o| o.value).collect();
    assert_eq!(patient_values, vec!["Aktif", "Selesai", "Tidak Aktif"]);
}
