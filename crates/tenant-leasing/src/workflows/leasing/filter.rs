//! Compound filtering over leasing records.
//!
//! Every axis is a set of accepted values where the empty set means "no
//! restriction". Axes combine with AND; values inside one axis combine with OR.
//! Filtering is a stable pass over the whole collection.

use std::collections::BTreeSet;

use super::domain::{
    Applicant, ApplicantGroup, ApplicantStatus, FacetKey, GroupStatus, ProgressBand,
};

/// Multi-select filter axis. A single-select control is a one-element axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterAxis<T: Ord> {
    accepted: BTreeSet<T>,
}

impl<T: Ord> Default for FilterAxis<T> {
    fn default() -> Self {
        Self {
            accepted: BTreeSet::new(),
        }
    }
}

impl<T: Ord> FilterAxis<T> {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn only(value: T) -> Self {
        let mut axis = Self::default();
        axis.select(value);
        axis
    }

    /// Build an axis from a comma-separated selection, skipping blank entries.
    pub fn from_csv<E>(raw: Option<&str>, parse: impl Fn(&str) -> Result<T, E>) -> Result<Self, E> {
        let mut axis = Self::default();
        let Some(raw) = raw else {
            return Ok(axis);
        };

        for part in raw.split(',').map(str::trim).filter(|part| !part.is_empty()) {
            axis.select(parse(part)?);
        }
        Ok(axis)
    }

    pub fn select(&mut self, value: T) -> bool {
        self.accepted.insert(value)
    }

    pub fn deselect(&mut self, value: &T) -> bool {
        self.accepted.remove(value)
    }

    pub fn toggle(&mut self, value: T) {
        if !self.accepted.remove(&value) {
            self.accepted.insert(value);
        }
    }

    pub fn clear(&mut self) {
        self.accepted.clear();
    }

    pub fn is_active(&self) -> bool {
        !self.accepted.is_empty()
    }

    pub fn admits(&self, value: &T) -> bool {
        self.accepted.is_empty() || self.accepted.contains(value)
    }

    pub fn selected(&self) -> impl Iterator<Item = &T> {
        self.accepted.iter()
    }
}

impl<T: Ord> FromIterator<T> for FilterAxis<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            accepted: iter.into_iter().collect(),
        }
    }
}

/// Case-insensitive substring search. Blank input disables the axis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchText {
    needle: Option<String>,
}

impl SearchText {
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        Self {
            needle: (!trimmed.is_empty()).then(|| trimmed.to_lowercase()),
        }
    }

    pub fn from_optional(raw: Option<&str>) -> Self {
        raw.map(Self::new).unwrap_or_default()
    }

    pub fn is_active(&self) -> bool {
        self.needle.is_some()
    }

    pub fn clear(&mut self) {
        self.needle = None;
    }

    pub fn matches<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        match &self.needle {
            None => true,
            Some(needle) => fields
                .into_iter()
                .any(|field| field.to_lowercase().contains(needle.as_str())),
        }
    }
}

/// A predicate over one record kind that can be reset in a single call.
pub trait Criteria<R> {
    fn matches(&self, record: &R) -> bool;

    /// Reset every axis to "no restriction".
    fn clear(&mut self);

    fn is_active(&self) -> bool;
}

/// Stable filter: the returned references keep the input order.
pub fn apply<'a, R, C>(records: impl IntoIterator<Item = &'a R>, criteria: &C) -> Vec<&'a R>
where
    R: 'a,
    C: Criteria<R> + ?Sized,
{
    records
        .into_iter()
        .filter(|record| criteria.matches(record))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicantCriteria {
    pub status: FilterAxis<ApplicantStatus>,
    pub stage: FilterAxis<FacetKey>,
    pub property: FilterAxis<FacetKey>,
    pub search: SearchText,
}

impl Criteria<Applicant> for ApplicantCriteria {
    fn matches(&self, record: &Applicant) -> bool {
        self.status.admits(&record.status)
            && self.stage.admits(&record.stage_in_process)
            && self.property.admits(&record.property)
            && self.search.matches([
                record.name.as_str(),
                record.email.as_str(),
                record.phone.as_str(),
                record.property.label(),
            ])
    }

    fn clear(&mut self) {
        self.status.clear();
        self.stage.clear();
        self.property.clear();
        self.search.clear();
    }

    fn is_active(&self) -> bool {
        self.status.is_active()
            || self.stage.is_active()
            || self.property.is_active()
            || self.search.is_active()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupCriteria {
    pub status: FilterAxis<GroupStatus>,
    pub progress: FilterAxis<ProgressBand>,
    pub property: FilterAxis<FacetKey>,
    pub search: SearchText,
}

impl Criteria<ApplicantGroup> for GroupCriteria {
    fn matches(&self, record: &ApplicantGroup) -> bool {
        let fields = [
            record.name.as_str(),
            record.property.label(),
            record.unit.as_str(),
        ];

        self.status.admits(&record.status)
            && self.progress.admits(&record.progress_band())
            && self.property.admits(&record.property)
            && self
                .search
                .matches(fields.into_iter().chain(record.members.iter().map(String::as_str)))
    }

    fn clear(&mut self) {
        self.status.clear();
        self.progress.clear();
        self.property.clear();
        self.search.clear();
    }

    fn is_active(&self) -> bool {
        self.status.is_active()
            || self.progress.is_active()
            || self.property.is_active()
            || self.search.is_active()
    }
}
