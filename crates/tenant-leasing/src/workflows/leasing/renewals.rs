//! Lease renewals and their days-until-expiry buckets.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{normalize_key, FacetKey, LeasingInputError, RenewalId};
use super::filter::{Criteria, FilterAxis, SearchText};

/// Named range of `days_left`. The ranges cover every integer exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayBucket {
    #[serde(rename = "expired")]
    Expired,
    #[serde(rename = "0-30")]
    Within30,
    #[serde(rename = "31-60")]
    Within60,
    #[serde(rename = "61-90")]
    Within90,
    #[serde(rename = "91-120")]
    Within120,
    #[serde(rename = "121-180")]
    Within180,
    #[serde(rename = "181-240")]
    Within240,
    #[serde(rename = "241-300")]
    Within300,
    #[serde(rename = "301-360")]
    Within360,
    #[serde(rename = "360-plus")]
    Beyond360,
}

impl DayBucket {
    pub const fn ordered() -> [Self; 10] {
        [
            Self::Expired,
            Self::Within30,
            Self::Within60,
            Self::Within90,
            Self::Within120,
            Self::Within180,
            Self::Within240,
            Self::Within300,
            Self::Within360,
            Self::Beyond360,
        ]
    }

    pub const fn classify(days_left: i64) -> Self {
        match days_left {
            i64::MIN..=-1 => Self::Expired,
            0..=30 => Self::Within30,
            31..=60 => Self::Within60,
            61..=90 => Self::Within90,
            91..=120 => Self::Within120,
            121..=180 => Self::Within180,
            181..=240 => Self::Within240,
            241..=300 => Self::Within300,
            301..=360 => Self::Within360,
            361..=i64::MAX => Self::Beyond360,
        }
    }

    pub const fn id(self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::Within30 => "0-30",
            Self::Within60 => "31-60",
            Self::Within90 => "61-90",
            Self::Within120 => "91-120",
            Self::Within180 => "121-180",
            Self::Within240 => "181-240",
            Self::Within300 => "241-300",
            Self::Within360 => "301-360",
            Self::Beyond360 => "360-plus",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Expired => "Expired",
            Self::Within30 => "0-30 days",
            Self::Within60 => "31-60 days",
            Self::Within90 => "61-90 days",
            Self::Within120 => "91-120 days",
            Self::Within180 => "121-180 days",
            Self::Within240 => "181-240 days",
            Self::Within300 => "241-300 days",
            Self::Within360 => "301-360 days",
            Self::Beyond360 => "360+ days",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, LeasingInputError> {
        let key = normalize_key(raw);
        let key = if key == "360+" { "360-plus" } else { key.as_str() };
        Self::ordered()
            .into_iter()
            .find(|bucket| bucket.id() == key)
            .ok_or_else(|| LeasingInputError::UnknownBucket(raw.trim().to_string()))
    }
}

/// Whole days from `today` until `lease_end`; negative once the lease has ended.
pub fn days_left_between(lease_end: NaiveDate, today: NaiveDate) -> i64 {
    (lease_end - today).num_days()
}

/// A lease approaching expiry, as supplied by the renewals collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseRenewalRecord {
    pub id: RenewalId,
    #[serde(alias = "tenantName")]
    pub tenant_name: String,
    #[serde(alias = "propertyTitle")]
    pub property_title: String,
    #[serde(alias = "rentalOwners")]
    pub rental_owners: String,
    #[serde(default, alias = "currentTerms")]
    pub current_terms: String,
    #[serde(alias = "daysLeft")]
    pub days_left: i64,
    #[serde(default, alias = "leaseEnd", skip_serializing_if = "Option::is_none")]
    pub lease_end: Option<NaiveDate>,
}

impl LeaseRenewalRecord {
    pub fn owner_key(&self) -> FacetKey {
        FacetKey::new(self.rental_owners.as_str())
    }

    pub const fn bucket(&self) -> DayBucket {
        DayBucket::classify(self.days_left)
    }

    /// Recompute `days_left` from the lease end date when one is known.
    pub fn refresh_days_left(&mut self, today: NaiveDate) {
        if let Some(lease_end) = self.lease_end {
            self.days_left = days_left_between(lease_end, today);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenewalCriteria {
    pub owner: FilterAxis<FacetKey>,
    pub buckets: FilterAxis<DayBucket>,
    pub search: SearchText,
}

impl Criteria<LeaseRenewalRecord> for RenewalCriteria {
    fn matches(&self, record: &LeaseRenewalRecord) -> bool {
        self.owner.admits(&record.owner_key())
            && self.buckets.admits(&record.bucket())
            && self.search.matches([
                record.tenant_name.as_str(),
                record.property_title.as_str(),
                record.rental_owners.as_str(),
            ])
    }

    fn clear(&mut self) {
        self.owner.clear();
        self.buckets.clear();
        self.search.clear();
    }

    fn is_active(&self) -> bool {
        self.owner.is_active() || self.buckets.is_active() || self.search.is_active()
    }
}

/// Record count for one bucket, used to label filter options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketCount {
    pub bucket: DayBucket,
    pub label: &'static str,
    pub count: usize,
}

/// Counts per bucket in table order, zero-count buckets included.
pub fn bucket_counts<'a>(
    records: impl IntoIterator<Item = &'a LeaseRenewalRecord>,
) -> Vec<BucketCount> {
    let mut counts = [0usize; 10];
    for record in records {
        counts[record.bucket() as usize] += 1;
    }

    DayBucket::ordered()
        .into_iter()
        .zip(counts)
        .map(|(bucket, count)| BucketCount {
            bucket,
            label: bucket.label(),
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_ids_and_plus_shorthand() {
        assert_eq!(DayBucket::parse("0-30"), Ok(DayBucket::Within30));
        assert_eq!(DayBucket::parse(" EXPIRED "), Ok(DayBucket::Expired));
        assert_eq!(DayBucket::parse("360+"), Ok(DayBucket::Beyond360));
        assert_eq!(
            DayBucket::parse("400-500"),
            Err(LeasingInputError::UnknownBucket("400-500".to_string()))
        );
    }

    #[test]
    fn days_left_is_negative_after_lease_end() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date");
        let ended = NaiveDate::from_ymd_opt(2025, 6, 10).expect("valid date");
        let upcoming = NaiveDate::from_ymd_opt(2025, 7, 15).expect("valid date");
        assert_eq!(days_left_between(ended, today), -5);
        assert_eq!(days_left_between(upcoming, today), 30);
        assert_eq!(days_left_between(today, today), 0);
    }

    #[test]
    fn bucket_ids_serialize_as_table_ids() {
        let json = serde_json::to_string(&DayBucket::Beyond360).expect("serializes");
        assert_eq!(json, "\"360-plus\"");
    }
}
