//! Patient models.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{require_field, Entity};
use crate::error::{ClinicError, ClinicResult};
use crate::status::PatientStatus;

/// Largest age accepted when deriving a birth date.
pub const MAX_AGE_YEARS: u32 = 150;

/// A patient row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Server-assigned id - null until inserted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Server timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub name: String,
    /// Working diagnosis
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub diagnosis: String,
    /// Only present in newer schema revisions
    #[serde(default)]
    pub occupation: Option<String>,
    /// Owning therapist (auth principal id)
    pub therapist_id: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub status: PatientStatus,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date_of_birth: Option<String>,
}

impl Patient {
    /// Create an unsaved patient with the required fields.
    pub fn new(name: String, diagnosis: String, therapist_id: String) -> Self {
        Self {
            id: None,
            created_at: None,
            name,
            diagnosis,
            occupation: None,
            therapist_id,
            phone: None,
            address: None,
            gender: None,
            status: PatientStatus::Active,
            date_of_birth: None,
        }
    }

    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }

    /// Age in whole years on `today`, if the birth date parses.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let dob = NaiveDate::parse_from_str(self.date_of_birth.as_deref()?, "%Y-%m-%d").ok()?;
        today.years_since(dob)
    }

    /// Birth date stored when only an age is entered: January 1st of the
    /// birth year. Ages above [`MAX_AGE_YEARS`] are rejected.
    pub fn birth_date_from_age(age_years: u32, today: NaiveDate) -> ClinicResult<String> {
        if age_years > MAX_AGE_YEARS {
            return Err(ClinicError::Validation(format!(
                "age must be at most {} years, got {}",
                MAX_AGE_YEARS, age_years
            )));
        }
        Ok(format!("{:04}-01-01", today.year() - age_years as i32))
    }
}

impl Entity for Patient {
    const TABLE: &'static str = "patients";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn validate(&self) -> ClinicResult<()> {
        require_field(&self.name, "name")?;
        require_field(&self.diagnosis, "diagnosis")?;
        require_field(&self.therapist_id, "therapist_id")
    }
}
