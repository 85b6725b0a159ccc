//! Visit records.
//!
//! Two schema revisions exist for `medical_records`: structured assessment
//! fields, and an older free-text notes/treatment pair. Both decode into
//! [`RecordContent`]. The `diagnosis` table only ever had the structured shape.

use serde::{Deserialize, Serialize};

use super::{require_field, Entity, PatientScoped};
use crate::error::ClinicResult;

/// Structured physiotherapy assessment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assessment {
    #[serde(rename = "diagnosa")]
    pub diagnosis: String,
    pub vital_sign: String,
    pub patient_problem: String,
    pub inspection: String,
    pub planning: String,
}

/// Free-text record from the first schema revision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreatmentNotes {
    pub notes: String,
    pub treatment: String,
}

/// Body of a visit record, in whichever shape the row was written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RecordContent {
    Assessment(Assessment),
    Notes(TreatmentNotes),
}

impl RecordContent {
    /// One-line summary for list rows.
    pub fn summary(&self) -> &str {
        match self {
            RecordContent::Assessment(a) => &a.diagnosis,
            RecordContent::Notes(n) => &n.notes,
        }
    }
}

/// A row of `medical_records`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicalRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub patient_id: i64,
    pub date: String,
    #[serde(flatten)]
    pub content: RecordContent,
}

impl MedicalRecord {
    pub fn new(patient_id: i64, date: String, content: RecordContent) -> Self {
        Self {
            id: None,
            created_at: None,
            patient_id,
            date,
            content,
        }
    }
}

impl Entity for MedicalRecord {
    const TABLE: &'static str = "medical_records";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn validate(&self) -> ClinicResult<()> {
        require_field(&self.date, "date")?;
        match &self.content {
            RecordContent::Assessment(a) => require_field(&a.diagnosis, "diagnosa"),
            RecordContent::Notes(n) => require_field(&n.notes, "notes"),
        }
    }
}

impl PatientScoped for MedicalRecord {
    fn patient_id(&self) -> Option<i64> {
        Some(self.patient_id)
    }
}

/// A row of `diagnosis`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Diagnosis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub patient_id: i64,
    pub date: String,
    #[serde(flatten)]
    pub assessment: Assessment,
}

impl Diagnosis {
    pub fn new(patient_id: i64, date: String, assessment: Assessment) -> Self {
        Self {
            id: None,
            created_at: None,
            patient_id,
            date,
            assessment,
        }
    }
}

impl Entity for Diagnosis {
    const TABLE: &'static str = "diagnosis";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn validate(&self) -> ClinicResult<()> {
        require_field(&self.date, "date")?;
        require_field(&self.assessment.diagnosis, "diagnosa")
    }
}

impl PatientScoped for Diagnosis {
    fn patient_id(&self) -> Option<i64> {
        Some(self.patient_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assessment() -> Assessment {
        Assessment {
            diagnosis: "Frozen shoulder".into(),
            vital_sign: "TD 120/80".into(),
            patient_problem: "Limited abduction".into(),
            inspection: "Guarding".into(),
            planning: "TENS + exercise".into(),
        }
    }

    #[test]
    fn test_decode_structured_revision() {
        let json = r#"{"id": 1, "patient_id": 7, "date": "2024-06-01",
            "diagnosa": "Frozen shoulder", "vital_sign": "TD 120/80",
            "patient_problem": "Limited abduction", "inspection": "Guarding",
            "planning": "TENS + exercise", "therapist_signature": "x"}"#;
        let record: MedicalRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.content, RecordContent::Assessment(assessment()));
        assert_eq!(record.content.summary(), "Frozen shoulder");
    }

    #[test]
    fn test_decode_notes_revision() {
        let json = r#"{"id": 2, "patient_id": 7, "date": "2024-01-10",
            "notes": "Knee pain after fall", "treatment": "Ice, rest"}"#;
        let record: MedicalRecord = serde_json::from_str(json).unwrap();
        assert_eq!(
            record.content,
            RecordContent::Notes(TreatmentNotes {
                notes: "Knee pain after fall".into(),
                treatment: "Ice, rest".into(),
            })
        );
    }

    #[test]
    fn test_decode_neither_shape_fails() {
        let json = r#"{"id": 3, "patient_id": 7, "date": "2024-01-10", "free": "x"}"#;
        assert!(serde_json::from_str::<MedicalRecord>(json).is_err());
    }

    #[test]
    fn test_structured_row_uses_diagnosa_key() {
        let record = MedicalRecord::new(7, "2024-06-01".into(), RecordContent::Assessment(assessment()));
        let row = record.to_row().unwrap();
        assert_eq!(row["diagnosa"], "Frozen shoulder");
        assert_eq!(row["patient_id"], 7);
        assert!(row.get("content").is_none());
    }

    #[test]
    fn test_diagnosis_row() {
        let diagnosis = Diagnosis::new(7, "2024-06-01".into(), assessment());
        assert!(diagnosis.validate().is_ok());
        let row = diagnosis.to_row().unwrap();
        assert_eq!(row["planning"], "TENS + exercise");
    }
}
