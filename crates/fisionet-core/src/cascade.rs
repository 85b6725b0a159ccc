//! Cascade-delete coordinator.
//!
//! The backend has no foreign-key cascades, so deleting a patient deletes its
//! dependent rows first, table by table in a fixed order, then the patient row.
//! The sequence is not transactional: it stops at the first failure and
//! reports how far it got. Completed steps are not rolled back.

use std::sync::Arc;

use fisionet_remote::TableBackend;
use thiserror::Error;

use crate::error::ClinicError;
use crate::models::{
    Appointment, Diagnosis, Entity, MedicalRecord, Patient, PatientProgress, Transaction,
    PATIENT_FK,
};
use crate::repository::Repository;
use crate::session::SessionProvider;

/// Dependent tables, in deletion order.
pub const CASCADE_ORDER: [&str; 5] = [
    Appointment::TABLE,
    MedicalRecord::TABLE,
    Diagnosis::TABLE,
    PatientProgress::TABLE,
    Transaction::TABLE,
];

/// Outcome of a completed cascade.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeReport {
    pub patient_id: i64,
    /// Tables cleared, in order, ending with `patients`
    pub completed: Vec<&'static str>,
}

/// A cascade that stopped part-way.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Deleting patient {patient_id} stopped at {failed_table}: {source}")]
pub struct CascadeError {
    pub patient_id: i64,
    /// Tables already cleared before the failure
    pub completed: Vec<&'static str>,
    pub failed_table: &'static str,
    pub source: ClinicError,
}

/// Deletes a patient together with every row that references it.
pub struct CascadeDeleter {
    backend: Arc<dyn TableBackend>,
    session: Arc<SessionProvider>,
}

impl CascadeDeleter {
    pub fn new(backend: Arc<dyn TableBackend>, session: Arc<SessionProvider>) -> Self {
        Self { backend, session }
    }

    fn step<E: Entity>(
        &self,
        patient_id: i64,
        completed: &mut Vec<&'static str>,
        delete: impl FnOnce(&Repository<E>) -> Result<(), ClinicError>,
    ) -> Result<(), CascadeError> {
        let repo = Repository::<E>::new(self.backend.clone(), self.session.clone());
        match delete(&repo) {
            Ok(()) => {
                tracing::debug!(patient_id, table = E::TABLE, "Cascade step done");
                completed.push(E::TABLE);
                Ok(())
            }
            Err(source) => {
                tracing::warn!(
                    patient_id,
                    table = E::TABLE,
                    completed = ?completed,
                    error = %source,
                    "Cascade delete stopped"
                );
                Err(CascadeError {
                    patient_id,
                    completed: completed.clone(),
                    failed_table: E::TABLE,
                    source,
                })
            }
        }
    }

    fn dependents<E: Entity>(
        &self,
        patient_id: i64,
        completed: &mut Vec<&'static str>,
    ) -> Result<(), CascadeError> {
        self.step::<E>(patient_id, completed, |repo| {
            repo.delete_by_foreign_key(PATIENT_FK, patient_id)
        })
    }

    /// Delete the patient and all dependent rows.
    pub fn delete_patient(&self, patient_id: i64) -> Result<CascadeReport, CascadeError> {
        tracing::info!(patient_id, "Cascade delete started");
        let mut completed = Vec::with_capacity(CASCADE_ORDER.len() + 1);

        self.dependents::<Appointment>(patient_id, &mut completed)?;
        self.dependents::<MedicalRecord>(patient_id, &mut completed)?;
        self.dependents::<Diagnosis>(patient_id, &mut completed)?;
        self.dependents::<PatientProgress>(patient_id, &mut completed)?;
        self.dependents::<Transaction>(patient_id, &mut completed)?;
        self.step::<Patient>(patient_id, &mut completed, |repo| repo.delete_by_id(patient_id))?;

        tracing::info!(patient_id, "Cascade delete finished");
        Ok(CascadeReport {
            patient_id,
            completed,
        })
    }
}

impl From<CascadeError> for ClinicError {
    fn from(e: CascadeError) -> Self {
        e.source
    }
}
