//! Billing models: treatment packages and cashier transactions.

use fisionet_remote::{Direction, Query};
use serde::{Deserialize, Serialize};

use super::{require_field, Entity, Patient, PatientScoped};
use crate::error::{ClinicError, ClinicResult};

/// A sellable treatment package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Package {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub price: f64,
    /// Equipment used in the package
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Package {
    pub fn new(name: String, price: f64, tools: Vec<String>) -> Self {
        Self {
            id: None,
            name,
            price,
            tools,
            created_at: None,
        }
    }
}

impl Entity for Package {
    const TABLE: &'static str = "packages";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn validate(&self) -> ClinicResult<()> {
        require_field(&self.name, "name")?;
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ClinicError::Validation(format!(
                "price must be a non-negative amount, got {}",
                self.price
            )));
        }
        Ok(())
    }
}

/// A cashier transaction.
///
/// Patient and package names plus the amount are snapshots taken when the
/// transaction is written; later renames or price changes do not touch it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// `YYYY-MM-DD`
    pub date: String,
    #[serde(default)]
    pub patient_id: Option<i64>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub patient_name: String,
    #[serde(default)]
    pub package_id: Option<i64>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub package_name: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Transaction {
    /// Sell `package` to a registered patient.
    pub fn for_patient(date: String, patient: &Patient, package: &Package) -> Self {
        Self::snapshot(date, patient.id, patient.name.clone(), package)
    }

    /// Sell `package` to someone without a patient record.
    pub fn walk_in(date: String, name: String, package: &Package) -> Self {
        Self::snapshot(date, None, name, package)
    }

    fn snapshot(date: String, patient_id: Option<i64>, patient_name: String, package: &Package) -> Self {
        Self {
            id: None,
            date,
            patient_id,
            patient_name,
            package_id: package.id,
            package_name: package.name.clone(),
            amount: package.price,
            created_at: None,
        }
    }
}

impl Entity for Transaction {
    const TABLE: &'static str = "transactions";

    fn id(&self) -> Option<i64> {
        self.id
    }

    /// Most recent first.
    fn default_query() -> Query {
        Query::new().order("created_at", Direction::Desc)
    }

    fn validate(&self) -> ClinicResult<()> {
        require_field(&self.date, "date")?;
        require_field(&self.patient_name, "patient_name")?;
        require_field(&self.package_name, "package_name")
    }
}

impl PatientScoped for Transaction {
    fn patient_id(&self) -> Option<i64> {
        self.patient_id
    }
}

/// Sum of `amount` over transactions.
pub fn total_amount(transactions: &[Transaction]) -> f64 {
    transactions.iter().map(|t| t.amount).sum()
}
