//! Patient progress timeline.

use fisionet_remote::{Direction, Query};
use serde::{Deserialize, Serialize};

use super::{require_field, Entity, PatientScoped};
use crate::error::ClinicResult;

/// One dated progress note. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientProgress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub patient_id: i64,
    pub date: String,
    pub progress_note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl PatientProgress {
    pub fn new(patient_id: i64, date: String, progress_note: String) -> Self {
        Self {
            id: None,
            patient_id,
            date,
            progress_note,
            created_at: None,
        }
    }
}

impl Entity for PatientProgress {
    const TABLE: &'static str = "patient_progress";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn default_query() -> Query {
        Query::new().order("date", Direction::Desc)
    }

    fn validate(&self) -> ClinicResult<()> {
        require_field(&self.date, "date")?;
        require_field(&self.progress_note, "progress_note")
    }
}

impl PatientScoped for PatientProgress {
    fn patient_id(&self) -> Option<i64> {
        Some(self.patient_id)
    }
}
