//! Persisted status values and their display labels.
//!
//! The backend stores Indonesian workflow states; the appointment screens
//! show attendance wording instead. Values outside the known set pass through
//! untouched in both directions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Appointment state as persisted in `appointments.status`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AppointmentStatus {
    /// "Terjadwal", shown as "Menunggu"
    Scheduled,
    /// "Selesai", shown as "Hadir"
    Completed,
    /// "Dibatalkan", shown as "Tidak Hadir"
    Cancelled,
    /// Anything else, kept verbatim
    Other(String),
}

/// Known appointment states: (persisted, display label).
pub const APPOINTMENT_STATUSES: [(&str, &str); 3] = [
    ("Terjadwal", "Menunggu"),
    ("Selesai", "Hadir"),
    ("Dibatalkan", "Tidak Hadir"),
];

impl AppointmentStatus {
    /// Parse a persisted value.
    pub fn from_persisted(value: &str) -> Self {
        match value {
            "Terjadwal" => Self::Scheduled,
            "Selesai" => Self::Completed,
            "Dibatalkan" => Self::Cancelled,
            other => Self::Other(other.to_string()),
        }
    }

    /// Parse a display label (as picked in the status dialog).
    pub fn from_label(label: &str) -> Self {
        Self::from_persisted(&persisted_value(label))
    }

    pub fn as_persisted(&self) -> &str {
        match self {
            Self::Scheduled => "Terjadwal",
            Self::Completed => "Selesai",
            Self::Cancelled => "Dibatalkan",
            Self::Other(value) => value,
        }
    }

    pub fn label(&self) -> String {
        display_label(self.as_persisted())
    }
}

impl Default for AppointmentStatus {
    fn default() -> Self {
        Self::Scheduled
    }
}

impl From<String> for AppointmentStatus {
    fn from(value: String) -> Self {
        Self::from_persisted(&value)
    }
}

impl From<AppointmentStatus> for String {
    fn from(status: AppointmentStatus) -> Self {
        status.as_persisted().to_string()
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_persisted())
    }
}

/// Treatment state as persisted in `patients.status`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PatientStatus {
    Active,
    Finished,
    Inactive,
    Other(String),
}

/// Known patient states. Labels equal the persisted values.
pub const PATIENT_STATUSES: [&str; 3] = ["Aktif", "Selesai", "Tidak Aktif"];

impl PatientStatus {
    pub fn from_persisted(value: &str) -> Self {
        match value {
            "Aktif" => Self::Active,
            "Selesai" => Self::Finished,
            "Tidak Aktif" => Self::Inactive,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_persisted(&self) -> &str {
        match self {
            Self::Active => "Aktif",
            Self::Finished => "Selesai",
            Self::Inactive => "Tidak Aktif",
            Self::Other(value) => value,
        }
    }

    pub fn label(&self) -> String {
        self.as_persisted().to_string()
    }
}

impl Default for PatientStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl From<String> for PatientStatus {
    fn from(value: String) -> Self {
        Self::from_persisted(&value)
    }
}

impl From<PatientStatus> for String {
    fn from(status: PatientStatus) -> Self {
        status.as_persisted().to_string()
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_persisted())
    }
}

/// Persisted appointment value to display label; unknown values pass through.
pub fn display_label(persisted: &str) -> String {
    APPOINTMENT_STATUSES
        .iter()
        .find(|(value, _)| *value == persisted)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| persisted.to_string())
}

/// Display label to persisted appointment value; unknown labels pass through.
pub fn persisted_value(label: &str) -> String {
    APPOINTMENT_STATUSES
        .iter()
        .find(|(_, shown)| *shown == label)
        .map(|(value, _)| value.to_string())
        .unwrap_or_else(|| label.to_string())
}
