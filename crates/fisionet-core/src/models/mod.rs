//! Domain models for the clinic tables.

mod appointment;
mod billing;
mod medical_record;
mod patient;
mod progress;

pub use appointment::*;
pub use billing::*;
pub use medical_record::*;
pub use patient::*;
pub use progress::*;

use fisionet_remote::Query;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{ClinicError, ClinicResult};

/// A row type stored in one remote table.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Remote table name.
    const TABLE: &'static str;

    /// Server-assigned id; `None` while unsaved.
    fn id(&self) -> Option<i64>;

    /// Ordering used when a screen lists the whole table.
    fn default_query() -> Query {
        Query::new()
    }

    /// Required-field checks run before any remote call.
    fn validate(&self) -> ClinicResult<()> {
        Ok(())
    }

    /// Serialize for insert. `id` and `created_at` are left to the server.
    fn to_row(&self) -> ClinicResult<Value> {
        let mut row = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut row {
            map.remove("id");
            map.remove("created_at");
        }
        Ok(row)
    }
}

/// Rows that reference a patient through `patient_id`.
pub trait PatientScoped: Entity {
    fn patient_id(&self) -> Option<i64>;
}

/// Field name of the patient foreign key in every dependent table.
pub const PATIENT_FK: &str = "patient_id";

/// Decode `null` as the type's default (denormalized names may be null on
/// rows written by older clients).
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Fail with a validation error when `value` is blank.
pub(crate) fn require_field(value: &str, field: &str) -> ClinicResult<()> {
    if value.trim().is_empty() {
        Err(ClinicError::Validation(format!("{} is required", field)))
    } else {
        Ok(())
    }
}
