//! FisioNet Core Library
//!
//! Client-side data layer for a physiotherapy clinic app backed by a hosted
//! data API and auth service.
//!
//! # Architecture
//!
//! ```text
//!   Screen ──refresh──▶ ListCache ──list_all──▶ Repository<E> ──▶ TableBackend
//!     │                    │                         │              ├─ RestClient (hosted)
//!     │                 filter::apply                │              └─ LocalStore (SQLite)
//!     │                    ▼                         │
//!     │                 ViewState                    └── access token ◀── SessionProvider
//!     │                                                                      │
//!     └──delete patient──▶ CascadeDeleter                           AuthBackend + SessionStore
//!                          appointments → medical_records → diagnosis
//!                          → patient_progress → transactions → patients
//! ```
//!
//! # Core Principle
//!
//! **The backend is the source of truth.** Lists are snapshots, replaced
//! wholesale on refresh and never patched in place.
//!
//! # Modules
//!
//! - [`models`]: Entity types (Patient, Appointment, MedicalRecord, ...)
//! - [`repository`]: Generic CRUD over a table backend
//! - [`cache`]: Ticket-fenced list snapshots
//! - [`filter`]: Pure search/filter view
//! - [`cascade`]: Patient cascade delete
//! - [`session`]: Session/identity provider
//! - [`status`]: Status value/label mapping
//! - [`stats`]: Dashboard statistics
//! - [`db`]: SQLite store (session blob, offline tables)

pub mod cache;
pub mod cascade;
pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod logging;
pub mod models;
pub mod repository;
pub mod session;
pub mod stats;
pub mod status;

// Re-export commonly used types
pub use cache::{ListCache, LoadState, RefreshTicket};
pub use cascade::{CascadeDeleter, CascadeError, CascadeReport, CASCADE_ORDER};
pub use config::ClientConfig;
pub use db::{Database, LocalStore};
pub use error::{ClinicError, ClinicResult};
pub use filter::{Predicate, Searchable, ViewState};
pub use models::{
    Appointment, Assessment, Diagnosis, Entity, MedicalRecord, Package, Patient, PatientProgress,
    PatientScoped, RecordContent, Transaction, TreatmentNotes,
};
pub use repository::Repository;
pub use session::{SessionProvider, SessionStore};
pub use stats::DashboardStats;
pub use status::{AppointmentStatus, PatientStatus};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::Arc;

use chrono::NaiveDate;
use fisionet_remote::{AuthClient, AuthUser, RemoteError, RestClient, TableBackend};
use serde_json::{Map, Value};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum FisioNetError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Auth error: {0}")]
    Auth(String),

    #[error("Unsaved row: {0}")]
    Unsaved(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Cascade delete failed: {0}")]
    CascadeFailed(String),
}

impl From<ClinicError> for FisioNetError {
    fn from(e: ClinicError) -> Self {
        match e {
            ClinicError::Network(msg) => FisioNetError::Network(msg),
            ClinicError::Decode(msg) => FisioNetError::Decode(msg),
            ClinicError::NotFound(msg) => FisioNetError::NotFound(msg),
            ClinicError::Validation(msg) => FisioNetError::Validation(msg),
            ClinicError::Auth(msg) => FisioNetError::Auth(msg),
            ClinicError::Unsaved(table) => FisioNetError::Unsaved(table.to_string()),
            ClinicError::Storage(msg) => FisioNetError::Storage(msg),
        }
    }
}

impl From<RemoteError> for FisioNetError {
    fn from(e: RemoteError) -> Self {
        ClinicError::from(e).into()
    }
}

impl From<db::DbError> for FisioNetError {
    fn from(e: db::DbError) -> Self {
        ClinicError::from(e).into()
    }
}

impl From<CascadeError> for FisioNetError {
    fn from(e: CascadeError) -> Self {
        FisioNetError::CascadeFailed(e.to_string())
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Connect to the hosted backend. The persisted session, if any, is restored.
#[uniffi::export]
pub fn open_remote(config: FfiClientConfig) -> Result<Arc<ClinicCore>, FisioNetError> {
    let config: ClientConfig = config.into();
    config.validate()?;

    let store = match &config.database_path {
        Some(path) => LocalStore::open(path)?,
        None => LocalStore::open_in_memory()?,
    };
    let client = fisionet_remote::build_client(config.request_timeout_secs)?;
    let rest = RestClient::with_client(client.clone(), &config.base_url, &config.anon_key);
    let auth = AuthClient::with_client(client, &config.base_url, &config.anon_key);

    let session = Arc::new(SessionProvider::new(Arc::new(auth), Arc::new(store)));
    if let Err(e) = session.restore() {
        tracing::warn!(error = %e, "Session restore failed, starting signed out");
    }

    tracing::info!(base_url = %config.base_url, "Opened remote clinic core");
    Ok(Arc::new(ClinicCore::new(Arc::new(rest), session)))
}

/// Open an offline core backed by a SQLite file.
#[uniffi::export]
pub fn open_offline(path: String, principal_id: String) -> Result<Arc<ClinicCore>, FisioNetError> {
    offline_core(LocalStore::open(&path)?, principal_id)
}

/// Open an offline core in memory (for testing).
#[uniffi::export]
pub fn open_offline_in_memory(principal_id: String) -> Result<Arc<ClinicCore>, FisioNetError> {
    offline_core(LocalStore::open_in_memory()?, principal_id)
}

fn offline_core(store: LocalStore, principal_id: String) -> Result<Arc<ClinicCore>, FisioNetError> {
    if principal_id.trim().is_empty() {
        return Err(FisioNetError::Validation("principal id is required".into()));
    }
    let user = AuthUser {
        id: principal_id,
        email: None,
        user_metadata: Map::new(),
    };
    let session = Arc::new(SessionProvider::offline(Arc::new(store.clone()), user));
    tracing::info!("Opened offline clinic core");
    Ok(Arc::new(ClinicCore::new(Arc::new(store), session)))
}

/// Read connection settings from the environment (and `.env`).
#[uniffi::export]
pub fn config_from_env() -> Result<FfiClientConfig, FisioNetError> {
    Ok(ClientConfig::from_env()?.into())
}

/// Install the tracing subscriber. Returns `false` if one was already set.
#[uniffi::export]
pub fn setup_logging(default_filter: Option<String>) -> bool {
    logging::init_logging(default_filter.as_deref().unwrap_or(config::DEFAULT_LOG_FILTER))
}

// =========================================================================
// Status Labels (exported to FFI)
// =========================================================================

/// Display label for a persisted appointment status.
#[uniffi::export]
pub fn appointment_status_label(persisted: String) -> String {
    status::display_label(&persisted)
}

/// Persisted appointment status for a display label.
#[uniffi::export]
pub fn appointment_status_value(label: String) -> String {
    status::persisted_value(&label)
}

/// Known appointment statuses, in dialog order.
#[uniffi::export]
pub fn appointment_status_options() -> Vec<FfiStatusOption> {
    status::APPOINTMENT_STATUSES
        .iter()
        .map(|(value, label)| FfiStatusOption {
            value: value.to_string(),
            label: label.to_string(),
        })
        .collect()
}

/// Known patient statuses.
#[uniffi::export]
pub fn patient_status_options() -> Vec<FfiStatusOption> {
    status::PATIENT_STATUSES
        .iter()
        .map(|value| FfiStatusOption {
            value: value.to_string(),
            label: value.to_string(),
        })
        .collect()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe clinic client for FFI.
#[derive(uniffi::Object)]
pub struct ClinicCore {
    session: Arc<SessionProvider>,
    patients: Repository<Patient>,
    appointments: Repository<Appointment>,
    records: Repository<MedicalRecord>,
    diagnoses: Repository<Diagnosis>,
    progress: Repository<PatientProgress>,
    packages: Repository<Package>,
    transactions: Repository<Transaction>,
    cascade: CascadeDeleter,
    patient_cache: ListCache<Patient>,
    appointment_cache: ListCache<Appointment>,
    record_cache: ListCache<MedicalRecord>,
    transaction_cache: ListCache<Transaction>,
}

impl ClinicCore {
    /// Wire every repository to one backend and session.
    pub fn new(backend: Arc<dyn TableBackend>, session: Arc<SessionProvider>) -> Self {
        Self {
            patients: Repository::new(backend.clone(), session.clone()),
            appointments: Repository::new(backend.clone(), session.clone()),
            records: Repository::new(backend.clone(), session.clone()),
            diagnoses: Repository::new(backend.clone(), session.clone()),
            progress: Repository::new(backend.clone(), session.clone()),
            packages: Repository::new(backend.clone(), session.clone()),
            transactions: Repository::new(backend.clone(), session.clone()),
            cascade: CascadeDeleter::new(backend, session.clone()),
            session,
            patient_cache: ListCache::new(),
            appointment_cache: ListCache::new(),
            record_cache: ListCache::new(),
            transaction_cache: ListCache::new(),
        }
    }

    pub fn session(&self) -> &Arc<SessionProvider> {
        &self.session
    }

    fn clear_caches(&self) {
        self.patient_cache.clear();
        self.appointment_cache.clear();
        self.record_cache.clear();
        self.transaction_cache.clear();
    }
}

fn parse_day(day: Option<String>) -> Result<NaiveDate, FisioNetError> {
    match day {
        None => Ok(chrono::Local::now().date_naive()),
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
            FisioNetError::Validation(format!("date must be YYYY-MM-DD, got {:?}", raw))
        }),
    }
}

/// Predicates from optional UI inputs; blank inputs impose no condition.
fn predicates(text: Option<String>, date: Option<String>, status: Option<String>) -> Vec<Predicate> {
    let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let mut out = Vec::new();
    if let Some(text) = non_blank(text) {
        out.push(Predicate::Text(text));
    }
    if let Some(date) = non_blank(date) {
        out.push(Predicate::Date(date));
    }
    if let Some(status) = non_blank(status) {
        out.push(Predicate::Status(status));
    }
    out
}

fn convert<T, F: From<T>>(items: Vec<T>) -> Vec<F> {
    items.into_iter().map(F::from).collect()
}

fn single_field(column: &str, value: impl Into<Value>) -> Map<String, Value> {
    let mut patch = Map::new();
    patch.insert(column.to_string(), value.into());
    patch
}

#[uniffi::export]
impl ClinicCore {
    // =========================================================================
    // Session Operations
    // =========================================================================

    pub fn sign_in(&self, email: String, password: String) -> Result<FfiUser, FisioNetError> {
        let user = self.session.sign_in(&email, &password)?;
        Ok(FfiUser::from(&user))
    }

    /// Register. `None` when the account awaits email confirmation.
    pub fn sign_up(
        &self,
        name: String,
        email: String,
        password: String,
    ) -> Result<Option<FfiUser>, FisioNetError> {
        let user = self.session.sign_up(&name, &email, &password)?;
        Ok(user.as_ref().map(FfiUser::from))
    }

    /// Sign out and drop every cached list.
    pub fn sign_out(&self) -> Result<(), FisioNetError> {
        self.session.sign_out()?;
        self.clear_caches();
        Ok(())
    }

    pub fn update_profile(
        &self,
        display_name: Option<String>,
        password: Option<String>,
    ) -> Result<FfiUser, FisioNetError> {
        let user = self.session.update_profile(display_name, password)?;
        Ok(FfiUser::from(&user))
    }

    pub fn current_user(&self) -> Option<FfiUser> {
        self.session.current_user().as_ref().map(FfiUser::from)
    }

    pub fn display_name(&self) -> String {
        self.session.display_name()
    }

    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Re-fetch all patients, replacing the cached list.
    pub fn refresh_patients(&self) -> Result<Vec<FfiPatient>, FisioNetError> {
        Ok(convert(self.patient_cache.refresh_default(&self.patients)?))
    }

    pub fn cached_patients(&self) -> Vec<FfiPatient> {
        convert(self.patient_cache.items())
    }

    pub fn patients_state(&self) -> FfiLoadState {
        self.patient_cache.state().into()
    }

    /// Filter the cached patients by name/diagnosis/phone and status.
    pub fn search_patients(&self, text: String, status: Option<String>) -> Vec<FfiPatient> {
        let view = filter::apply(&self.patient_cache.items(), &predicates(Some(text), None, status));
        convert(view.into_items())
    }

    pub fn get_patient(&self, id: i64) -> Result<FfiPatient, FisioNetError> {
        Ok(self.patients.get_by_id(id)?.into())
    }

    /// Create a patient owned by the signed-in therapist. An age in years,
    /// if given, becomes a January 1st birth date.
    pub fn create_patient(
        &self,
        patient: FfiPatient,
        age_years: Option<u32>,
    ) -> Result<FfiPatient, FisioNetError> {
        let therapist_id = self.session.require_principal()?;
        let mut patient: Patient = patient.into();
        patient.id = None;
        patient.created_at = None;
        patient.therapist_id = therapist_id;
        if let Some(age) = age_years {
            patient.date_of_birth = Some(Patient::birth_date_from_age(age, parse_day(None)?)?);
        }
        Ok(self.patients.insert(&patient)?.into())
    }

    pub fn update_patient(&self, patient: FfiPatient) -> Result<(), FisioNetError> {
        Ok(self.patients.update(&patient.into())?)
    }

    pub fn set_patient_status(&self, id: i64, status: String) -> Result<(), FisioNetError> {
        let status = PatientStatus::from_persisted(status.trim());
        Ok(self
            .patients
            .update_fields(id, single_field("status", status.as_persisted()))?)
    }

    /// Delete the patient and all rows referencing it.
    pub fn delete_patient(&self, id: i64) -> Result<FfiCascadeReport, FisioNetError> {
        Ok(self.cascade.delete_patient(id)?.into())
    }

    // =========================================================================
    // Appointment Operations
    // =========================================================================

    pub fn refresh_appointments(&self) -> Result<Vec<FfiAppointment>, FisioNetError> {
        Ok(convert(self.appointment_cache.refresh_default(&self.appointments)?))
    }

    pub fn cached_appointments(&self) -> Vec<FfiAppointment> {
        convert(self.appointment_cache.items())
    }

    pub fn appointments_state(&self) -> FfiLoadState {
        self.appointment_cache.state().into()
    }

    /// Filter cached appointments. `status` accepts a value or a label.
    pub fn filter_appointments(
        &self,
        text: Option<String>,
        date: Option<String>,
        status: Option<String>,
    ) -> Vec<FfiAppointment> {
        let view = filter::apply(&self.appointment_cache.items(), &predicates(text, date, status));
        convert(view.into_items())
    }

    /// Appointments on one date, fetched with a server-side filter.
    pub fn appointments_on(&self, date: String) -> Result<Vec<FfiAppointment>, FisioNetError> {
        let query = Appointment::default_query().eq("date", date);
        Ok(convert(self.appointments.list_all(&query)?))
    }

    pub fn appointments_for_patient(&self, patient_id: i64) -> Result<Vec<FfiAppointment>, FisioNetError> {
        Ok(convert(self.appointments.list_for_patient(patient_id)?))
    }

    /// Book a registered patient (`patient_id`) or a walk-in (`walk_in_name`).
    pub fn create_appointment(
        &self,
        patient_id: Option<i64>,
        walk_in_name: Option<String>,
        date: String,
        time: String,
        notes: Option<String>,
    ) -> Result<FfiAppointment, FisioNetError> {
        let therapist_id = self.session.require_principal()?;
        let mut appointment = match patient_id {
            Some(id) => {
                let patient = self.patients.get_by_id(id)?;
                Appointment::for_patient(&patient, therapist_id, date, time)?
            }
            None => Appointment::walk_in(
                walk_in_name.unwrap_or_default().trim().to_string(),
                therapist_id,
                date,
                time,
            ),
        };
        appointment.notes = notes.filter(|n| !n.trim().is_empty());
        Ok(self.appointments.insert(&appointment)?.into())
    }

    pub fn update_appointment(&self, appointment: FfiAppointment) -> Result<(), FisioNetError> {
        Ok(self.appointments.update(&appointment.into())?)
    }

    /// Set the status from a display label or a persisted value.
    pub fn set_appointment_status(&self, id: i64, status: String) -> Result<(), FisioNetError> {
        let status = AppointmentStatus::from_label(status.trim());
        Ok(self
            .appointments
            .update_fields(id, single_field("status", status.as_persisted()))?)
    }

    pub fn delete_appointment(&self, id: i64) -> Result<(), FisioNetError> {
        Ok(self.appointments.delete_by_id(id)?)
    }

    // =========================================================================
    // Medical Record Operations
    // =========================================================================

    pub fn refresh_medical_records(&self) -> Result<Vec<FfiMedicalRecord>, FisioNetError> {
        Ok(convert(self.record_cache.refresh_default(&self.records)?))
    }

    pub fn medical_records_state(&self) -> FfiLoadState {
        self.record_cache.state().into()
    }

    pub fn medical_records_for_patient(
        &self,
        patient_id: i64,
    ) -> Result<Vec<FfiMedicalRecord>, FisioNetError> {
        Ok(convert(self.records.list_for_patient(patient_id)?))
    }

    pub fn add_medical_record(&self, record: FfiMedicalRecord) -> Result<FfiMedicalRecord, FisioNetError> {
        let mut record: MedicalRecord = record.into();
        record.id = None;
        Ok(self.records.insert(&record)?.into())
    }

    pub fn update_medical_record(&self, record: FfiMedicalRecord) -> Result<(), FisioNetError> {
        Ok(self.records.update(&record.into())?)
    }

    pub fn delete_medical_record(&self, id: i64) -> Result<(), FisioNetError> {
        Ok(self.records.delete_by_id(id)?)
    }

    pub fn diagnoses_for_patient(&self, patient_id: i64) -> Result<Vec<FfiDiagnosis>, FisioNetError> {
        Ok(convert(self.diagnoses.list_for_patient(patient_id)?))
    }

    pub fn add_diagnosis(&self, diagnosis: FfiDiagnosis) -> Result<FfiDiagnosis, FisioNetError> {
        let mut diagnosis: Diagnosis = diagnosis.into();
        diagnosis.id = None;
        Ok(self.diagnoses.insert(&diagnosis)?.into())
    }

    pub fn update_diagnosis(&self, diagnosis: FfiDiagnosis) -> Result<(), FisioNetError> {
        Ok(self.diagnoses.update(&diagnosis.into())?)
    }

    pub fn delete_diagnosis(&self, id: i64) -> Result<(), FisioNetError> {
        Ok(self.diagnoses.delete_by_id(id)?)
    }

    // =========================================================================
    // Progress Operations
    // =========================================================================

    pub fn progress_for_patient(&self, patient_id: i64) -> Result<Vec<FfiProgress>, FisioNetError> {
        Ok(convert(self.progress.list_for_patient(patient_id)?))
    }

    pub fn add_progress(
        &self,
        patient_id: i64,
        date: String,
        note: String,
    ) -> Result<FfiProgress, FisioNetError> {
        let entry = PatientProgress::new(patient_id, date, note);
        Ok(self.progress.insert(&entry)?.into())
    }

    pub fn delete_progress(&self, id: i64) -> Result<(), FisioNetError> {
        Ok(self.progress.delete_by_id(id)?)
    }

    // =========================================================================
    // Billing Operations
    // =========================================================================

    pub fn list_packages(&self) -> Result<Vec<FfiPackage>, FisioNetError> {
        Ok(convert(self.packages.list_default()?))
    }

    pub fn create_package(
        &self,
        name: String,
        price: f64,
        tools: Vec<String>,
    ) -> Result<FfiPackage, FisioNetError> {
        let package = Package::new(name.trim().to_string(), price, tools);
        Ok(self.packages.insert(&package)?.into())
    }

    pub fn update_package(&self, package: FfiPackage) -> Result<(), FisioNetError> {
        Ok(self.packages.update(&package.into())?)
    }

    pub fn delete_package(&self, id: i64) -> Result<(), FisioNetError> {
        Ok(self.packages.delete_by_id(id)?)
    }

    pub fn refresh_transactions(&self) -> Result<Vec<FfiTransaction>, FisioNetError> {
        Ok(convert(self.transaction_cache.refresh_default(&self.transactions)?))
    }

    pub fn cached_transactions(&self) -> Vec<FfiTransaction> {
        convert(self.transaction_cache.items())
    }

    pub fn transactions_state(&self) -> FfiLoadState {
        self.transaction_cache.state().into()
    }

    pub fn filter_transactions(&self, text: Option<String>, date: Option<String>) -> Vec<FfiTransaction> {
        let view = filter::apply(&self.transaction_cache.items(), &predicates(text, date, None));
        convert(view.into_items())
    }

    pub fn transactions_for_patient(&self, patient_id: i64) -> Result<Vec<FfiTransaction>, FisioNetError> {
        Ok(convert(self.transactions.list_for_patient(patient_id)?))
    }

    /// Sell a package to a registered patient or a walk-in. Names and price
    /// are snapshotted at this point.
    pub fn create_transaction(
        &self,
        patient_id: Option<i64>,
        walk_in_name: Option<String>,
        package_id: i64,
        date: String,
    ) -> Result<FfiTransaction, FisioNetError> {
        let package = self.packages.get_by_id(package_id)?;
        let transaction = match patient_id {
            Some(id) => Transaction::for_patient(date, &self.patients.get_by_id(id)?, &package),
            None => Transaction::walk_in(
                date,
                walk_in_name.unwrap_or_default().trim().to_string(),
                &package,
            ),
        };
        Ok(self.transactions.insert(&transaction)?.into())
    }

    pub fn delete_transaction(&self, id: i64) -> Result<(), FisioNetError> {
        Ok(self.transactions.delete_by_id(id)?)
    }

    /// Revenue over the cached transactions, optionally for one date.
    pub fn transactions_total(&self, date: Option<String>) -> f64 {
        let view = filter::apply(&self.transaction_cache.items(), &predicates(None, date, None));
        models::total_amount(view.items())
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Statistics over the cached lists. `today` defaults to the local date.
    pub fn dashboard_stats(&self, today: Option<String>) -> Result<FfiDashboardStats, FisioNetError> {
        let stats = DashboardStats::compute(
            &self.patient_cache.items(),
            &self.record_cache.items(),
            &self.appointment_cache.items(),
            parse_day(today)?,
        );
        Ok(stats.into())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe connection settings.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiClientConfig {
    pub base_url: String,
    pub anon_key: String,
    pub request_timeout_secs: u64,
    pub database_path: Option<String>,
}

impl From<FfiClientConfig> for ClientConfig {
    fn from(config: FfiClientConfig) -> Self {
        ClientConfig {
            base_url: config.base_url,
            anon_key: config.anon_key,
            request_timeout_secs: config.request_timeout_secs,
            database_path: config.database_path,
        }
    }
}

impl From<ClientConfig> for FfiClientConfig {
    fn from(config: ClientConfig) -> Self {
        Self {
            base_url: config.base_url,
            anon_key: config.anon_key,
            request_timeout_secs: config.request_timeout_secs,
            database_path: config.database_path,
        }
    }
}

/// FFI-safe signed-in user.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiUser {
    pub id: String,
    pub email: Option<String>,
    pub display_name: String,
}

impl From<&AuthUser> for FfiUser {
    fn from(user: &AuthUser) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            display_name: session::display_name_for(user),
        }
    }
}

/// FFI-safe list load state.
#[derive(Debug, Clone, PartialEq, uniffi::Enum)]
pub enum FfiLoadState {
    Empty,
    Loading,
    Loaded,
    Failed { message: String },
}

impl From<LoadState> for FfiLoadState {
    fn from(state: LoadState) -> Self {
        match state {
            LoadState::Empty => FfiLoadState::Empty,
            LoadState::Loading => FfiLoadState::Loading,
            LoadState::Loaded => FfiLoadState::Loaded,
            LoadState::Failed(message) => FfiLoadState::Failed { message },
        }
    }
}

/// FFI-safe status choice.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiStatusOption {
    pub value: String,
    pub label: String,
}

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: Option<i64>,
    pub created_at: Option<String>,
    pub name: String,
    pub diagnosis: String,
    pub occupation: Option<String>,
    pub therapist_id: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub status: String,
    pub date_of_birth: Option<String>,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            created_at: patient.created_at,
            name: patient.name,
            diagnosis: patient.diagnosis,
            occupation: patient.occupation,
            therapist_id: patient.therapist_id,
            phone: patient.phone,
            address: patient.address,
            gender: patient.gender,
            status: patient.status.as_persisted().to_string(),
            date_of_birth: patient.date_of_birth,
        }
    }
}

impl From<FfiPatient> for Patient {
    fn from(patient: FfiPatient) -> Self {
        let status = if patient.status.trim().is_empty() {
            PatientStatus::default()
        } else {
            PatientStatus::from_persisted(patient.status.trim())
        };
        Patient {
            id: patient.id,
            created_at: patient.created_at,
            name: patient.name,
            diagnosis: patient.diagnosis,
            occupation: patient.occupation,
            therapist_id: patient.therapist_id,
            phone: patient.phone,
            address: patient.address,
            gender: patient.gender,
            status,
            date_of_birth: patient.date_of_birth,
        }
    }
}

/// FFI-safe appointment.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointment {
    pub id: Option<i64>,
    pub created_at: Option<String>,
    /// `None` for walk-ins
    pub patient_id: Option<i64>,
    pub patient_name: String,
    pub therapist_id: String,
    pub date: String,
    pub time: String,
    /// Persisted value
    pub status: String,
    /// Display label (ignored on input)
    pub status_label: String,
    pub notes: Option<String>,
}

impl From<Appointment> for FfiAppointment {
    fn from(appointment: Appointment) -> Self {
        Self {
            status_label: appointment.status_label(),
            status: appointment.status.as_persisted().to_string(),
            id: appointment.id,
            created_at: appointment.created_at,
            patient_id: appointment.patient_id,
            patient_name: appointment.patient_name,
            therapist_id: appointment.therapist_id,
            date: appointment.date,
            time: appointment.time,
            notes: appointment.notes,
        }
    }
}

impl From<FfiAppointment> for Appointment {
    fn from(appointment: FfiAppointment) -> Self {
        Appointment {
            id: appointment.id,
            created_at: appointment.created_at,
            patient_id: appointment.patient_id,
            patient_name: appointment.patient_name,
            therapist_id: appointment.therapist_id,
            date: appointment.date,
            time: appointment.time,
            status: AppointmentStatus::from_persisted(&appointment.status),
            notes: appointment.notes,
        }
    }
}

/// FFI-safe structured assessment.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAssessment {
    pub diagnosis: String,
    pub vital_sign: String,
    pub patient_problem: String,
    pub inspection: String,
    pub planning: String,
}

impl From<Assessment> for FfiAssessment {
    fn from(a: Assessment) -> Self {
        Self {
            diagnosis: a.diagnosis,
            vital_sign: a.vital_sign,
            patient_problem: a.patient_problem,
            inspection: a.inspection,
            planning: a.planning,
        }
    }
}

impl From<FfiAssessment> for Assessment {
    fn from(a: FfiAssessment) -> Self {
        Assessment {
            diagnosis: a.diagnosis,
            vital_sign: a.vital_sign,
            patient_problem: a.patient_problem,
            inspection: a.inspection,
            planning: a.planning,
        }
    }
}

/// FFI-safe record body (either schema revision).
#[derive(Debug, Clone, uniffi::Enum)]
pub enum FfiRecordContent {
    Assessment { assessment: FfiAssessment },
    Notes { notes: String, treatment: String },
}

impl From<RecordContent> for FfiRecordContent {
    fn from(content: RecordContent) -> Self {
        match content {
            RecordContent::Assessment(a) => FfiRecordContent::Assessment {
                assessment: a.into(),
            },
            RecordContent::Notes(n) => FfiRecordContent::Notes {
                notes: n.notes,
                treatment: n.treatment,
            },
        }
    }
}

impl From<FfiRecordContent> for RecordContent {
    fn from(content: FfiRecordContent) -> Self {
        match content {
            FfiRecordContent::Assessment { assessment } => RecordContent::Assessment(assessment.into()),
            FfiRecordContent::Notes { notes, treatment } => {
                RecordContent::Notes(TreatmentNotes { notes, treatment })
            }
        }
    }
}

/// FFI-safe medical record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicalRecord {
    pub id: Option<i64>,
    pub created_at: Option<String>,
    pub patient_id: i64,
    pub date: String,
    pub content: FfiRecordContent,
}

impl From<MedicalRecord> for FfiMedicalRecord {
    fn from(record: MedicalRecord) -> Self {
        Self {
            id: record.id,
            created_at: record.created_at,
            patient_id: record.patient_id,
            date: record.date,
            content: record.content.into(),
        }
    }
}

impl From<FfiMedicalRecord> for MedicalRecord {
    fn from(record: FfiMedicalRecord) -> Self {
        MedicalRecord {
            id: record.id,
            created_at: record.created_at,
            patient_id: record.patient_id,
            date: record.date,
            content: record.content.into(),
        }
    }
}

/// FFI-safe diagnosis.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDiagnosis {
    pub id: Option<i64>,
    pub created_at: Option<String>,
    pub patient_id: i64,
    pub date: String,
    pub assessment: FfiAssessment,
}

impl From<Diagnosis> for FfiDiagnosis {
    fn from(d: Diagnosis) -> Self {
        Self {
            id: d.id,
            created_at: d.created_at,
            patient_id: d.patient_id,
            date: d.date,
            assessment: d.assessment.into(),
        }
    }
}

impl From<FfiDiagnosis> for Diagnosis {
    fn from(d: FfiDiagnosis) -> Self {
        Diagnosis {
            id: d.id,
            created_at: d.created_at,
            patient_id: d.patient_id,
            date: d.date,
            assessment: d.assessment.into(),
        }
    }
}

/// FFI-safe progress note.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiProgress {
    pub id: Option<i64>,
    pub patient_id: i64,
    pub date: String,
    pub progress_note: String,
    pub created_at: Option<String>,
}

impl From<PatientProgress> for FfiProgress {
    fn from(p: PatientProgress) -> Self {
        Self {
            id: p.id,
            patient_id: p.patient_id,
            date: p.date,
            progress_note: p.progress_note,
            created_at: p.created_at,
        }
    }
}

/// FFI-safe package.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPackage {
    pub id: Option<i64>,
    pub name: String,
    pub price: f64,
    pub tools: Vec<String>,
    pub created_at: Option<String>,
}

impl From<Package> for FfiPackage {
    fn from(p: Package) -> Self {
        Self {
            id: p.id,
            name: p.name,
            price: p.price,
            tools: p.tools,
            created_at: p.created_at,
        }
    }
}

impl From<FfiPackage> for Package {
    fn from(p: FfiPackage) -> Self {
        Package {
            id: p.id,
            name: p.name,
            price: p.price,
            tools: p.tools,
            created_at: p.created_at,
        }
    }
}

/// FFI-safe transaction.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTransaction {
    pub id: Option<i64>,
    pub date: String,
    pub patient_id: Option<i64>,
    pub patient_name: String,
    pub package_id: Option<i64>,
    pub package_name: String,
    pub amount: f64,
    pub created_at: Option<String>,
}

impl From<Transaction> for FfiTransaction {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id,
            date: t.date,
            patient_id: t.patient_id,
            patient_name: t.patient_name,
            package_id: t.package_id,
            package_name: t.package_name,
            amount: t.amount,
            created_at: t.created_at,
        }
    }
}

/// FFI-safe cascade result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCascadeReport {
    pub patient_id: i64,
    pub completed: Vec<String>,
}

impl From<CascadeReport> for FfiCascadeReport {
    fn from(report: CascadeReport) -> Self {
        Self {
            patient_id: report.patient_id,
            completed: report.completed.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// FFI-safe per-status appointment count.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiStatusCount {
    pub status: String,
    pub label: String,
    pub count: u64,
}

/// FFI-safe dashboard statistics.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDashboardStats {
    pub total_patients: u64,
    pub total_records: u64,
    pub patients_today: u64,
    pub patients_this_month: u64,
    pub appointment_counts: Vec<FfiStatusCount>,
}

impl From<DashboardStats> for FfiDashboardStats {
    fn from(stats: DashboardStats) -> Self {
        Self {
            total_patients: stats.total_patients,
            total_records: stats.total_records,
            patients_today: stats.patients_today,
            patients_this_month: stats.patients_this_month,
            appointment_counts: stats
                .appointments_by_status
                .into_iter()
                .map(|(value, count)| FfiStatusCount {
                    label: status::display_label(&value),
                    status: value,
                    count,
                })
                .collect(),
        }
    }
}
