//! Dashboard statistics computed from cached lists.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Appointment, MedicalRecord, Patient};

/// Headline numbers for the home screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_patients: u64,
    pub total_records: u64,
    /// Distinct patients with a record dated today
    pub patients_today: u64,
    /// Distinct patients with a record this calendar month
    pub patients_this_month: u64,
    /// Appointment count per persisted status value
    pub appointments_by_status: BTreeMap<String, u64>,
}

impl DashboardStats {
    /// Compute from the current snapshots, relative to `today`.
    pub fn compute(
        patients: &[Patient],
        records: &[MedicalRecord],
        appointments: &[Appointment],
        today: NaiveDate,
    ) -> Self {
        let day = today.format("%Y-%m-%d").to_string();
        let month = today.format("%Y-%m").to_string();

        let patients_today: HashSet<i64> = records
            .iter()
            .filter(|r| r.date == day)
            .map(|r| r.patient_id)
            .collect();
        let patients_this_month: HashSet<i64> = records
            .iter()
            .filter(|r| r.date.starts_with(&month))
            .map(|r| r.patient_id)
            .collect();

        let mut appointments_by_status = BTreeMap::new();
        for appointment in appointments {
            *appointments_by_status
                .entry(appointment.status.as_persisted().to_string())
                .or_insert(0) += 1;
        }

        Self {
            total_patients: patients.len() as u64,
            total_records: records.len() as u64,
            patients_today: patients_today.len() as u64,
            patients_this_month: patients_this_month.len() as u64,
            appointments_by_status,
        }
    }

    pub fn appointments_with_status(&self, persisted: &str) -> u64 {
        self.appointments_by_status.get(persisted).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecordContent, TreatmentNotes};
    use crate::status::AppointmentStatus;

    fn record(patient_id: i64, date: &str) -> MedicalRecord {
        MedicalRecord::new(
            patient_id,
            date.into(),
            RecordContent::Notes(TreatmentNotes {
                notes: "Massage".into(),
                treatment: "TENS".into(),
            }),
        )
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn test_empty_inputs() {
        let stats = DashboardStats::compute(&[], &[], &[], today());
        assert_eq!(stats, DashboardStats::default());
    }

    #[test]
    fn test_distinct_patients_per_period() {
        let records = vec![
            record(1, "2024-06-15"),
            record(1, "2024-06-15"),
            record(2, "2024-06-15"),
            record(3, "2024-06-02"),
            record(4, "2024-05-30"),
        ];
        let patients = vec![Patient::new("Ana".into(), "LBP".into(), "t-1".into())];

        let stats = DashboardStats::compute(&patients, &records, &[], today());
        assert_eq!(stats.total_patients, 1);
        assert_eq!(stats.total_records, 5);
        assert_eq!(stats.patients_today, 2);
        assert_eq!(stats.patients_this_month, 3);
    }

    #[test]
    fn test_appointment_counts() {
        let mut done = Appointment::walk_in("A".into(), "t-1".into(), "2024-06-15".into(), "09:00".into());
        done.status = AppointmentStatus::Completed;
        let waiting = Appointment::walk_in("B".into(), "t-1".into(), "2024-06-15".into(), "10:00".into());
        let mut odd = waiting.clone();
        odd.status = AppointmentStatus::Other("Ditunda".into());

        let stats = DashboardStats::compute(&[], &[], &[done, waiting.clone(), waiting, odd], today());
        assert_eq!(stats.appointments_with_status("Terjadwal"), 2);
        assert_eq!(stats.appointments_with_status("Selesai"), 1);
        assert_eq!(stats.appointments_with_status("Ditunda"), 1);
        assert_eq!(stats.appointments_with_status("Dibatalkan"), 0);
    }
}
