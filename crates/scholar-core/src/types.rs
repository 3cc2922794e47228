//! ScholarIQ Data Models

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OpportunityCategory {
    General,
    Stem,
    Arts,
    Athletics,
    Community,
    Business,
    Other(String),
}

impl OpportunityCategory {
    pub fn as_str(&self) -> &str {
        match self {
            OpportunityCategory::General => "general",
            OpportunityCategory::Stem => "stem",
            OpportunityCategory::Arts => "arts",
            OpportunityCategory::Athletics => "athletics",
            OpportunityCategory::Community => "community",
            OpportunityCategory::Business => "business",
            OpportunityCategory::Other(s) => s,
        }
    }
}

impl From<String> for OpportunityCategory {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "general" => OpportunityCategory::General,
            "stem" => OpportunityCategory::Stem,
            "arts" => OpportunityCategory::Arts,
            "athletics" => OpportunityCategory::Athletics,
            "community" => OpportunityCategory::Community,
            "business" => OpportunityCategory::Business,
            _ => OpportunityCategory::Other(s),
        }
    }
}

impl From<OpportunityCategory> for String {
    fn from(category: OpportunityCategory) -> Self {
        category.as_str().to_string()
    }
}

/// A funding or education opportunity in the session catalog.
/// Immutable once loaded; the catalog is replaced wholesale, never patched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    /// Stable identifier from the catalog source.
    pub id: String,
    pub title: String,
    pub category: OpportunityCategory,
    /// Application deadline; `None` means rolling admission.
    pub deadline: Option<DateTime<Utc>>,
    /// Award amount in dollars, when the source specifies one.
    pub amount: Option<f64>,
    /// Eligibility requirements, in source order.
    pub requirements: Vec<String>,
    pub tags: Vec<String>,
    pub description: String,
}

impl Opportunity {
    /// Whether the deadline has passed as of `now`.
    /// Entries without a deadline never expire.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) => deadline <= now,
            None => false,
        }
    }
}

/// The current user's profile. Matching keys off `field_of_study`; the
/// remaining fields feed completeness and alert relevance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub field_of_study: String,
    pub grade_level: String,
    pub gender: String,
    pub ethnicity: String,
}

impl UserProfile {
    /// All five fields present. Whitespace-only counts as missing.
    pub fn is_complete(&self) -> bool {
        [
            &self.name,
            &self.field_of_study,
            &self.grade_level,
            &self.gender,
            &self.ethnicity,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }
}

/// Urgency tier for an alert, derived from deadline proximity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertUrgency {
    High,
    Medium,
    Low,
}

impl AlertUrgency {
    /// Classify by remaining time: within 7 days is High, within 30 days
    /// is Medium, anything further out (or no deadline) is Low.
    pub fn for_deadline(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        let Some(deadline) = deadline else {
            return AlertUrgency::Low;
        };
        let remaining = deadline - now;
        if remaining <= chrono::Duration::days(7) {
            AlertUrgency::High
        } else if remaining <= chrono::Duration::days(30) {
            AlertUrgency::Medium
        } else {
            AlertUrgency::Low
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AlertUrgency::High => "high",
            AlertUrgency::Medium => "medium",
            AlertUrgency::Low => "low",
        }
    }
}

/// An urgency-classified notification referencing an Opportunity,
/// produced by the alert scanner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Monotonic id, unique within a scanner session.
    pub id: u64,
    /// Id of the opportunity this alert points at.
    pub opportunity_id: String,
    /// Headline derived from the source opportunity.
    pub title: String,
    /// Profile relevance, 0-100.
    pub match_percentage: u8,
    pub urgency: AlertUrgency,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

impl Alert {
    /// Deadline-proximity shorthand: only the High tier counts as urgent.
    pub fn is_urgent(&self) -> bool {
        self.urgency == AlertUrgency::High
    }
}

/// How often the alert scanner ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanFrequency {
    /// Every 15 minutes.
    Frequent,
    Hourly,
    Daily,
}

impl ScanFrequency {
    /// Tick period for the scan loop.
    pub fn interval(&self) -> Duration {
        match self {
            ScanFrequency::Frequent => Duration::from_secs(15 * 60),
            ScanFrequency::Hourly => Duration::from_secs(60 * 60),
            ScanFrequency::Daily => Duration::from_secs(24 * 60 * 60),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ScanFrequency::Frequent => "frequent",
            ScanFrequency::Hourly => "hourly",
            ScanFrequency::Daily => "daily",
        }
    }
}

impl Default for ScanFrequency {
    fn default() -> Self {
        ScanFrequency::Hourly
    }
}

/// User-tunable constraints the alert scanner applies on each tick.
///
/// Accepted without validation: `min_amount > max_amount` or an empty
/// `urgency_levels` set simply constrain the tick to zero alerts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSettings {
    pub min_amount: f64,
    pub max_amount: f64,
    /// Categories to alert on; empty means any category.
    pub categories: HashSet<OpportunityCategory>,
    /// Urgency tiers to alert on; alerts outside this set are dropped.
    pub urgency_levels: HashSet<AlertUrgency>,
    /// Surface deadline-driven (urgent) notifications to the consumer.
    pub notify_deadlines: bool,
    /// Surface new-match notifications to the consumer.
    pub notify_new_matches: bool,
    pub scan_frequency: ScanFrequency,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            min_amount: 0.0,
            max_amount: 100_000.0,
            categories: HashSet::new(),
            urgency_levels: [AlertUrgency::High, AlertUrgency::Medium, AlertUrgency::Low]
                .into_iter()
                .collect(),
            notify_deadlines: true,
            notify_new_matches: true,
            scan_frequency: ScanFrequency::Hourly,
        }
    }
}
