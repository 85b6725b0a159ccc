//! Appointment models.

use chrono::{NaiveDate, NaiveTime};
use fisionet_remote::{Direction, Query};
use serde::{Deserialize, Serialize};

use super::{require_field, Entity, Patient, PatientScoped};
use crate::error::{ClinicError, ClinicResult};
use crate::status::AppointmentStatus;

/// A scheduled therapy session.
///
/// `patient_id` is absent for walk-ins; `patient_name` is always a snapshot
/// taken at booking time and is not kept in sync with the patient row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub patient_id: Option<i64>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub patient_name: String,
    pub therapist_id: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM` or `HH:MM:SS`
    pub time: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Appointment {
    /// Book a registered patient. The patient must already be saved.
    pub fn for_patient(
        patient: &Patient,
        therapist_id: String,
        date: String,
        time: String,
    ) -> ClinicResult<Self> {
        let patient_id = patient.id.ok_or(ClinicError::Unsaved(Patient::TABLE))?;
        Ok(Self {
            id: None,
            created_at: None,
            patient_id: Some(patient_id),
            patient_name: patient.name.clone(),
            therapist_id,
            date,
            time,
            status: AppointmentStatus::Scheduled,
            notes: None,
        })
    }

    /// Book someone who has no patient record.
    pub fn walk_in(name: String, therapist_id: String, date: String, time: String) -> Self {
        Self {
            id: None,
            created_at: None,
            patient_id: None,
            patient_name: name,
            therapist_id,
            date,
            time,
            status: AppointmentStatus::Scheduled,
            notes: None,
        }
    }

    pub fn is_walk_in(&self) -> bool {
        self.patient_id.is_none()
    }

    /// Label shown in lists (attendance wording).
    pub fn status_label(&self) -> String {
        self.status.label()
    }
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

impl Entity for Appointment {
    const TABLE: &'static str = "appointments";

    fn id(&self) -> Option<i64> {
        self.id
    }

    /// Newest day first, earliest slot first within a day.
    fn default_query() -> Query {
        Query::new()
            .order("date", Direction::Desc)
            .order("time", Direction::Asc)
    }

    fn validate(&self) -> ClinicResult<()> {
        require_field(&self.patient_name, "patient_name")?;
        require_field(&self.therapist_id, "therapist_id")?;
        require_field(&self.date, "date")?;
        require_field(&self.time, "time")?;

        if NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").is_err() {
            return Err(ClinicError::Validation(format!(
                "date must be YYYY-MM-DD, got {:?}",
                self.date
            )));
        }
        if parse_time(&self.time).is_none() {
            return Err(ClinicError::Validation(format!(
                "time must be HH:MM, got {:?}",
                self.time
            )));
        }
        Ok(())
    }
}

impl PatientScoped for Appointment {
    fn patient_id(&self) -> Option<i64> {
        self.patient_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved_patient() -> Patient {
        let mut patient = Patient::new("Ana".into(), "LBP".into(), "t-1".into());
        patient.id = Some(7);
        patient
    }

    #[test]
    fn test_for_patient_snapshots_name() {
        let appt = Appointment::for_patient(
            &saved_patient(),
            "t-1".into(),
            "2024-06-01".into(),
            "09:00".into(),
        )
        .unwrap();
        assert_eq!(appt.patient_id, Some(7));
        assert_eq!(appt.patient_name, "Ana");
        assert_eq!(appt.status, AppointmentStatus::Scheduled);
        assert_eq!(appt.status_label(), "Menunggu");
        assert!(!appt.is_walk_in());
    }

    #[test]
    fn test_for_unsaved_patient_fails() {
        let patient = Patient::new("Ana".into(), "LBP".into(), "t-1".into());
        let err = Appointment::for_patient(&patient, "t-1".into(), "2024-06-01".into(), "09:00".into())
            .unwrap_err();
        assert_eq!(err, ClinicError::Unsaved("patients"));
    }

    #[test]
    fn test_walk_in() {
        let appt = Appointment::walk_in("Pak Joko".into(), "t-1".into(), "2024-06-01".into(), "10:30:00".into());
        assert!(appt.is_walk_in());
        assert!(appt.validate().is_ok());
        let row = appt.to_row().unwrap();
        assert_eq!(row["patient_id"], serde_json::Value::Null);
        assert_eq!(row["status"], "Terjadwal");
    }

    #[test]
    fn test_validation() {
        let mut appt = Appointment::walk_in("".into(), "t-1".into(), "2024-06-01".into(), "09:00".into());
        assert!(appt.validate().is_err());

        appt.patient_name = "Ana".into();
        appt.date = "01/06/2024".into();
        assert!(appt.validate().is_err());

        appt.date = "2024-06-01".into();
        appt.time = "9 pagi".into();
        assert!(appt.validate().is_err());
    }

    #[test]
    fn test_decode_without_status_or_name() {
        let json = r#"{"id": 3, "patient_id": 7, "patient_name": null,
                       "therapist_id": "t-1", "date": "2024-06-01", "time": "09:00:00"}"#;
        let appt: Appointment = serde_json::from_str(json).unwrap();
        assert_eq!(appt.status, AppointmentStatus::Scheduled);
        assert_eq!(appt.patient_name, "");
    }

    #[test]
    fn test_null_status_defaults_to_scheduled() {
        let json = r#"{"id": 4, "patient_name": "Ana", "therapist_id": "t-1",
                       "date": "2024-06-01", "time": "09:00", "status": null}"#;
        let appt: Appointment = serde_json::from_str(json).unwrap();
        assert_eq!(appt.status, AppointmentStatus::Scheduled);
    }

    #[test]
    fn test_default_query_order() {
        let params = Appointment::default_query().to_params();
        assert!(params.contains(&("order".into(), "date.desc,time.asc".into())));
    }
}
