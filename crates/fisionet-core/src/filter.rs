//! Filter/search view over cached lists.
//!
//! Pure functions: a cached sequence plus predicates in, a derived subset
//! out. Predicates are AND-combined, so their order never matters.

use crate::models::{Appointment, MedicalRecord, Patient, PatientProgress, Transaction};
use crate::status::persisted_value;

/// Fields a list row exposes to the search view.
pub trait Searchable {
    /// Free-text fields matched by [`Predicate::Text`].
    fn search_fields(&self) -> Vec<&str>;

    /// `YYYY-MM-DD` date, for rows that have one.
    fn date(&self) -> Option<&str> {
        None
    }

    /// Persisted status value, for rows that have one.
    fn status(&self) -> Option<&str> {
        None
    }

    /// Whether the row's status equals `wanted`. Rows whose status has
    /// display labels override this to accept the label as well.
    fn status_matches(&self, wanted: &str) -> bool {
        self.status() == Some(wanted)
    }
}

/// One filter condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Case-insensitive substring of any search field. Blank matches all.
    Text(String),
    /// Exact date.
    Date(String),
    /// Exact status, compared the way the row type defines it.
    Status(String),
}

impl Predicate {
    pub fn matches<T: Searchable + ?Sized>(&self, item: &T) -> bool {
        match self {
            Predicate::Text(needle) => {
                let needle = needle.trim().to_lowercase();
                needle.is_empty()
                    || item
                        .search_fields()
                        .iter()
                        .any(|field| field.to_lowercase().contains(&needle))
            }
            Predicate::Date(date) => item.date() == Some(date.as_str()),
            Predicate::Status(status) => item.status_matches(status),
        }
    }
}

/// Derived view of a list.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    /// Nothing matches (distinct from an error)
    Empty,
    Items(Vec<T>),
}

impl<T> ViewState<T> {
    pub fn items(&self) -> &[T] {
        match self {
            ViewState::Empty => &[],
            ViewState::Items(items) => items,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            ViewState::Empty => Vec::new(),
            ViewState::Items(items) => items,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ViewState::Empty)
    }
}

/// Whether `item` satisfies every predicate.
pub fn matches_all<T: Searchable + ?Sized>(item: &T, predicates: &[Predicate]) -> bool {
    predicates.iter().all(|p| p.matches(item))
}

/// Items matching every predicate, in cache order.
pub fn apply<T: Searchable + Clone>(items: &[T], predicates: &[Predicate]) -> ViewState<T> {
    let matched: Vec<T> = items
        .iter()
        .filter(|item| matches_all(*item, predicates))
        .cloned()
        .collect();

    if matched.is_empty() {
        ViewState::Empty
    } else {
        ViewState::Items(matched)
    }
}

impl Searchable for Patient {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.diagnosis.as_str()];
        fields.extend(self.phone.as_deref());
        fields
    }

    fn status(&self) -> Option<&str> {
        Some(self.status.as_persisted())
    }
}

impl Searchable for Appointment {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.patient_name.as_str()];
        fields.extend(self.notes.as_deref());
        fields
    }

    fn date(&self) -> Option<&str> {
        Some(&self.date)
    }

    fn status(&self) -> Option<&str> {
        Some(self.status.as_persisted())
    }

    /// Accepts the persisted value or its display label.
    fn status_matches(&self, wanted: &str) -> bool {
        let current = self.status.as_persisted();
        current == wanted || current == persisted_value(wanted)
    }
}

impl Searchable for Transaction {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.patient_name.as_str(), self.package_name.as_str()]
    }

    fn date(&self) -> Option<&str> {
        Some(&self.date)
    }
}

impl Searchable for MedicalRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.content.summary()]
    }

    fn date(&self) -> Option<&str> {
        Some(&self.date)
    }
}

impl Searchable for PatientProgress {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.progress_note.as_str()]
    }

    fn date(&self) -> Option<&str> {
        Some(&self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{AppointmentStatus, PatientStatus};
    use proptest::prelude::*;

    fn patient(name: &str, diagnosis: &str, phone: Option<&str>, status: PatientStatus) -> Patient {
        let mut p = Patient::new(name.into(), diagnosis.into(), "t-1".into());
        p.phone = phone.map(String::from);
        p.status = status;
        p
    }

    fn patients() -> Vec<Patient> {
        vec![
            patient("Ana", "Lower back pain", Some("0812-111"), PatientStatus::Active),
            patient("Budi", "Frozen shoulder", None, PatientStatus::Finished),
            patient("Citra", "Post-stroke", Some("0813-222"), PatientStatus::Active),
            patient("Dani", "Back strain", None, PatientStatus::Inactive),
        ]
    }

    fn names(view: &ViewState<Patient>) -> Vec<&str> {
        view.items().iter().map(|p| p.name.as_str()).collect()
    }

    fn appointment(name: &str, date: &str, status: AppointmentStatus) -> Appointment {
        let mut a = Appointment::walk_in(name.into(), "t-1".into(), date.into(), "09:00".into());
        a.status = status;
        a
    }

    #[test]
    fn test_text_is_case_insensitive_across_fields() {
        let view = apply(&patients(), &[Predicate::Text("BACK".into())]);
        assert_eq!(names(&view), vec!["Ana", "Dani"]);

        let view = apply(&patients(), &[Predicate::Text("0813".into())]);
        assert_eq!(names(&view), vec!["Citra"]);
    }

    #[test]
    fn test_blank_text_matches_everything() {
        let all = patients();
        let view = apply(&all, &[Predicate::Text("   ".into())]);
        assert_eq!(view.items().len(), all.len());
    }

    #[test]
    fn test_predicates_are_anded() {
        let view = apply(
            &patients(),
            &[Predicate::Text("back".into()), Predicate::Status("Aktif".into())],
        );
        assert_eq!(names(&view), vec!["Ana"]);
    }

    #[test]
    fn test_no_match_is_empty_state() {
        let view = apply(&patients(), &[Predicate::Text("zzz".into())]);
        assert_eq!(view, ViewState::Empty);
        assert!(view.is_empty());
    }

    #[test]
    fn test_source_untouched() {
        let all = patients();
        let before = all.clone();
        let _ = apply(&all, &[Predicate::Status("Selesai".into())]);
        assert_eq!(all, before);
    }

    #[test]
    fn test_appointment_status_by_value_or_label() {
        let list = vec![
            appointment("Ana", "2024-06-01", AppointmentStatus::Scheduled),
            appointment("Budi", "2024-06-01", AppointmentStatus::Completed),
            appointment("Citra", "2024-06-02", AppointmentStatus::Scheduled),
        ];

        let by_value = apply(&list, &[Predicate::Status("Terjadwal".into())]);
        let by_label = apply(&list, &[Predicate::Status("Menunggu".into())]);
        assert_eq!(by_value, by_label);
        assert_eq!(by_value.items().len(), 2);

        let view = apply(
            &list,
            &[Predicate::Date("2024-06-01".into()), Predicate::Status("Hadir".into())],
        );
        assert_eq!(view.items().len(), 1);
        assert_eq!(view.items()[0].patient_name, "Budi");
    }

    #[test]
    fn test_patient_status_ignores_appointment_labels() {
        // "Hadir" is the label of the appointment value "Selesai"; Budi is
        // a finished patient and must not match it.
        let view = apply(&patients(), &[Predicate::Status("Hadir".into())]);
        assert_eq!(view, ViewState::Empty);

        let view = apply(&patients(), &[Predicate::Status("Menunggu".into())]);
        assert_eq!(view, ViewState::Empty);

        let view = apply(&patients(), &[Predicate::Status("Selesai".into())]);
        assert_eq!(names(&view), vec!["Budi"]);
    }

    #[test]
    fn test_date_on_undated_rows_never_matches() {
        let view = apply(&patients(), &[Predicate::Date("2024-06-01".into())]);
        assert!(view.is_empty());
    }

    fn predicate_strategy() -> impl Strategy<Value = Predicate> {
        prop_oneof![
            prop::sample::select(vec!["", "a", "BACK", "08", "shoulder", "x"])
                .prop_map(|s| Predicate::Text(s.to_string())),
            prop::sample::select(vec!["Aktif", "Selesai", "Tidak Aktif", "Other"])
                .prop_map(|s| Predicate::Status(s.to_string())),
        ]
    }

    proptest! {
        #[test]
        fn test_filter_order_independent(
            predicates in prop::collection::vec(predicate_strategy(), 0..4)
        ) {
            let all = patients();
            let mut reversed = predicates.clone();
            reversed.reverse();
            prop_assert_eq!(apply(&all, &predicates), apply(&all, &reversed));
        }

        #[test]
        fn test_filter_composes(a in predicate_strategy(), b in predicate_strategy()) {
            let all = patients();
            let stepwise = apply(&apply(&all, &[a.clone()]).into_items(), &[b.clone()]);
            prop_assert_eq!(stepwise, apply(&all, &[a, b]));
        }
    }
}
