//! Entity repository over a [`TableBackend`].
//!
//! One generic implementation serves every table. Calls carry the session's
//! access token explicitly; nothing reads ambient global state.

use std::marker::PhantomData;
use std::sync::Arc;

use fisionet_remote::{Filter, Query, TableBackend};
use serde_json::{Map, Value};

use crate::error::{ClinicError, ClinicResult};
use crate::models::{Entity, PatientScoped, PATIENT_FK};
use crate::session::SessionProvider;

/// CRUD façade for one entity type.
pub struct Repository<E: Entity> {
    backend: Arc<dyn TableBackend>,
    session: Arc<SessionProvider>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            session: self.session.clone(),
            _entity: PhantomData,
        }
    }
}

fn decode_rows<E: Entity>(rows: Vec<Value>) -> ClinicResult<Vec<E>> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row)
                .map_err(|e| ClinicError::Decode(format!("{} row: {}", E::TABLE, e)))
        })
        .collect()
}

impl<E: Entity> Repository<E> {
    pub fn new(backend: Arc<dyn TableBackend>, session: Arc<SessionProvider>) -> Self {
        Self {
            backend,
            session,
            _entity: PhantomData,
        }
    }

    fn token(&self) -> ClinicResult<Option<String>> {
        self.session.access_token()
    }

    fn id_filter(id: i64) -> [Filter; 1] {
        [Filter::eq("id", id)]
    }

    /// Fetch every row matching `query`.
    pub fn list_all(&self, query: &Query) -> ClinicResult<Vec<E>> {
        let token = self.token()?;
        let rows = self
            .backend
            .select(E::TABLE, query, token.as_deref())
            .map_err(|e| {
                tracing::warn!(table = E::TABLE, error = %e, "List failed");
                ClinicError::from(e)
            })?;
        let items = decode_rows::<E>(rows)?;
        tracing::debug!(table = E::TABLE, count = items.len(), "Listed rows");
        Ok(items)
    }

    /// Fetch the whole table in its default order.
    pub fn list_default(&self) -> ClinicResult<Vec<E>> {
        self.list_all(&E::default_query())
    }

    /// Singleton lookup; zero or several matches is `NotFound`.
    pub fn get_by_id(&self, id: i64) -> ClinicResult<E> {
        let mut items = self.list_all(&Query::new().eq("id", id))?;
        match items.len() {
            1 => Ok(items.remove(0)),
            0 => Err(ClinicError::NotFound(format!("{} id={}", E::TABLE, id))),
            n => Err(ClinicError::NotFound(format!(
                "{} id={} matched {} rows",
                E::TABLE,
                id,
                n
            ))),
        }
    }

    /// Validate and insert. Returns the stored row with its server id.
    pub fn insert(&self, entity: &E) -> ClinicResult<E> {
        entity.validate()?;
        let row = entity.to_row()?;
        let token = self.token()?;
        let mut stored = decode_rows::<E>(self.backend.insert(E::TABLE, &row, token.as_deref())?)?;
        if stored.is_empty() {
            return Err(ClinicError::Decode(format!(
                "insert into {} returned no row",
                E::TABLE
            )));
        }
        let stored = stored.remove(0);
        tracing::info!(table = E::TABLE, id = ?stored.id(), "Inserted row");
        Ok(stored)
    }

    /// Full-row update. Last writer wins.
    pub fn update(&self, entity: &E) -> ClinicResult<()> {
        let id = entity.id().ok_or(ClinicError::Unsaved(E::TABLE))?;
        entity.validate()?;
        let row = entity.to_row()?;
        let token = self.token()?;
        self.backend
            .update(E::TABLE, &row, &Self::id_filter(id), token.as_deref())?;
        tracing::info!(table = E::TABLE, id, "Updated row");
        Ok(())
    }

    /// Field-set update. `id` in the patch is ignored.
    pub fn update_fields(&self, id: i64, mut patch: Map<String, Value>) -> ClinicResult<()> {
        patch.remove("id");
        if patch.is_empty() {
            return Ok(());
        }
        let token = self.token()?;
        self.backend.update(
            E::TABLE,
            &Value::Object(patch),
            &Self::id_filter(id),
            token.as_deref(),
        )?;
        tracing::info!(table = E::TABLE, id, "Updated fields");
        Ok(())
    }

    /// Delete a saved entity.
    pub fn delete(&self, entity: &E) -> ClinicResult<()> {
        let id = entity.id().ok_or(ClinicError::Unsaved(E::TABLE))?;
        self.delete_by_id(id)
    }

    /// Delete by id. No matching row is not an error.
    pub fn delete_by_id(&self, id: i64) -> ClinicResult<()> {
        let token = self.token()?;
        self.backend
            .delete(E::TABLE, &Self::id_filter(id), token.as_deref())?;
        tracing::info!(table = E::TABLE, id, "Deleted row");
        Ok(())
    }

    /// Delete every row whose `fk` column equals `value`.
    pub fn delete_by_foreign_key(&self, fk: &str, value: impl Into<Value>) -> ClinicResult<()> {
        let value = value.into();
        let token = self.token()?;
        self.backend
            .delete(E::TABLE, &[Filter::eq(fk, value.clone())], token.as_deref())?;
        tracing::info!(table = E::TABLE, fk, value = %value, "Deleted by foreign key");
        Ok(())
    }
}

impl<E: PatientScoped> Repository<E> {
    /// Rows of one patient, in the table's default order.
    pub fn list_for_patient(&self, patient_id: i64) -> ClinicResult<Vec<E>> {
        self.list_all(&E::default_query().eq(PATIENT_FK, patient_id))
    }
}
