pub mod config;
pub mod deadlines;
pub mod error;
pub mod export;
pub mod format;
pub mod guidelines;
pub mod logging;
pub mod notifications;
pub mod store;

pub use config::{AiConfig, ConfigError, NotificationConfig, StorageConfig, WealthConfig};
pub use error::CoreError;
pub use notifications::{
    derive_notifications, Notification, NotificationFeed, NotificationKind, Priority,
};
pub use store::ClientStore;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// --- Deadlines ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineCategory {
    Tax,
    Legal,
    Insurance,
    Trust,
    Investment,
    Other,
}

impl DeadlineCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Tax => "Tax",
            Self::Legal => "Legal",
            Self::Insurance => "Insurance",
            Self::Trust => "Trust",
            Self::Investment => "Investment",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineStatus {
    Upcoming,
    DueSoon,
    Overdue,
    Completed,
}

impl DeadlineStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::DueSoon => "due_soon",
            Self::Overdue => "overdue",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    #[default]
    OneTime,
    Annual,
    Quarterly,
    Monthly,
}

impl Recurrence {
    pub fn label(self) -> &'static str {
        match self {
            Self::OneTime => "One-time",
            Self::Annual => "Annual",
            Self::Quarterly => "Quarterly",
            Self::Monthly => "Monthly",
        }
    }
}

/// A tracked obligation with a due date.
///
/// `due_date` keeps the raw value from the store; see
/// [`deadlines::parse_due_date`] for the accepted forms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Deadline {
    pub id: String,
    pub title: String,
    pub due_date: String,
    pub category: DeadlineCategory,
    pub status: DeadlineStatus,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advisor_id: Option<String>,
    #[serde(default)]
    pub notes: String,
    /// Days before the due date at which the family wants a reminder.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reminders: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

// --- Advisors ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AdvisorSpecialty {
    Cpa,
    EstateAttorney,
    WealthManager,
    Insurance,
    Banker,
    Other,
}

impl AdvisorSpecialty {
    pub fn label(self) -> &'static str {
        match self {
            Self::Cpa => "CPA / Accountant",
            Self::EstateAttorney => "Estate Attorney",
            Self::WealthManager => "Wealth Manager",
            Self::Insurance => "Insurance Advisor",
            Self::Banker => "Private Banker",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Advisor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub firm: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub specialty: AdvisorSpecialty,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_contact_date: Option<NaiveDate>,
}

// --- Entities, assets, liabilities ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Personal,
    Trust,
    Llc,
    Foundation,
    Other,
}

impl EntityType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Personal => "Personal",
            Self::Trust => "Trust",
            Self::Llc => "LLC",
            Self::Foundation => "Foundation",
            Self::Other => "Other",
        }
    }
}

/// A legal or financial holding vehicle (trust, LLC, personal).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    Cash,
    Investments,
    RealEstate,
    Alternatives,
    Other,
}

impl AssetCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Investments => "investments",
            Self::RealEstate => "real_estate",
            Self::Alternatives => "alternatives",
            Self::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Cash => "Cash & Equivalents",
            Self::Investments => "Investments",
            Self::RealEstate => "Real Estate",
            Self::Alternatives => "Alternative Investments",
            Self::Other => "Other Assets",
        }
    }

    /// Cash and investments count as liquid.
    pub fn is_liquid(self) -> bool {
        matches!(self, Self::Cash | Self::Investments)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub category: AssetCategory,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custodian: Option<String>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LiabilityCategory {
    Mortgage,
    Loan,
    Credit,
    Other,
}

impl LiabilityCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mortgage => "mortgage",
            Self::Loan => "loan",
            Self::Credit => "credit",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Liability {
    pub id: String,
    pub name: String,
    pub category: LiabilityCategory,
    pub balance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lender: Option<String>,
}

// --- Meetings ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: String,
    pub date: NaiveDate,
    pub title: String,
    #[serde(default)]
    pub advisor_ids: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub action_items: Vec<ActionItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_date: Option<NaiveDate>,
}

// --- Client profile ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskTolerance {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Moderate => "moderate",
            Self::Aggressive => "aggressive",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dependent {
    pub name: String,
    pub relationship: String,
}

/// Everything known about one client household. This is the subject data
/// handed to report generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfile {
    pub id: String,
    pub client_name: String,
    #[serde(default = "default_client_type")]
    pub client_type: String,
    #[serde(default = "default_client_status")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_tolerance: Option<RiskTolerance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment_horizon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_income: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spouse_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependents: Vec<Dependent>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub liabilities: Vec<Liability>,
    #[serde(default)]
    pub advisors: Vec<Advisor>,
    #[serde(default)]
    pub deadlines: Vec<Deadline>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meetings: Vec<Meeting>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub goals: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concerns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn default_client_type() -> String {
    "family".to_string()
}

fn default_client_status() -> String {
    "active".to_string()
}

/// Net value held by one entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntityBalance {
    pub entity_id: String,
    pub name: String,
    pub entity_type: EntityType,
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub asset_count: usize,
}

impl EntityBalance {
    pub fn net_value(&self) -> f64 {
        self.total_assets - self.total_liabilities
    }
}

impl ClientProfile {
    pub fn total_assets(&self) -> f64 {
        self.assets.iter().map(|a| a.value).sum()
    }

    pub fn total_liabilities(&self) -> f64 {
        self.liabilities.iter().map(|l| l.balance).sum()
    }

    pub fn net_worth(&self) -> f64 {
        self.total_assets() - self.total_liabilities()
    }

    pub fn liquid_assets(&self) -> f64 {
        self.assets
            .iter()
            .filter(|a| a.category.is_liquid())
            .map(|a| a.value)
            .sum()
    }

    pub fn assets_by_category(&self) -> BTreeMap<AssetCategory, f64> {
        let mut out = BTreeMap::new();
        for asset in &self.assets {
            *out.entry(asset.category).or_insert(0.0) += asset.value;
        }
        out
    }

    pub fn entity_balances(&self) -> Vec<EntityBalance> {
        self.entities
            .iter()
            .map(|entity| {
                let held = |id: &Option<String>| id.as_deref() == Some(entity.id.as_str());
                let assets: Vec<&Asset> =
                    self.assets.iter().filter(|a| held(&a.entity_id)).collect();
                EntityBalance {
                    entity_id: entity.id.clone(),
                    name: entity.name.clone(),
                    entity_type: entity.entity_type,
                    total_assets: assets.iter().map(|a| a.value).sum(),
                    total_liabilities: self
                        .liabilities
                        .iter()
                        .filter(|l| held(&l.entity_id))
                        .map(|l| l.balance)
                        .sum(),
                    asset_count: assets.len(),
                }
            })
            .collect()
    }

    pub fn entity_name(&self, id: &str) -> Option<&str> {
        self.entities
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.name.as_str())
    }

    pub fn deadline(&self, id: &str) -> Option<&Deadline> {
        self.deadlines.iter().find(|d| d.id == id)
    }

    /// Point-in-time net worth rollup, keyed by entity name and asset category.
    pub fn snapshot(&self, now: DateTime<Utc>) -> NetWorthSnapshot {
        let by_entity = self
            .entity_balances()
            .into_iter()
            .map(|b| (b.name.clone(), b.net_value()))
            .collect();
        let by_category = self
            .assets_by_category()
            .into_iter()
            .map(|(cat, value)| (cat.as_str().to_string(), value))
            .collect();
        NetWorthSnapshot {
            id: uuid::Uuid::new_v4().to_string(),
            date: now,
            total_net_worth: self.net_worth(),
            by_entity,
            by_category,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetWorthSnapshot {
    pub id: String,
    pub date: DateTime<Utc>,
    pub total_net_worth: f64,
    #[serde(default)]
    pub by_entity: BTreeMap<String, f64>,
    #[serde(default)]
    pub by_category: BTreeMap<String, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn profile() -> ClientProfile {
        serde_json::from_value(serde_json::json!({
            "id": "c-1",
            "clientName": "Hartwell Family",
            "entities": [
                {"id": "e-1", "name": "Hartwell Trust", "type": "trust"},
                {"id": "e-2", "name": "Personal", "type": "personal"}
            ],
            "assets": [
                {"id": "a-1", "name": "Brokerage", "category": "investments", "value": 600000.0, "entityId": "e-1"},
                {"id": "a-2", "name": "Checking", "category": "cash", "value": 100000.0, "entityId": "e-2"},
                {"id": "a-3", "name": "Lake House", "category": "real_estate", "value": 300000.0, "entityId": "e-2"}
            ],
            "liabilities": [
                {"id": "l-1", "name": "Mortgage", "category": "mortgage", "balance": 200000.0, "entityId": "e-2"}
            ]
        }))
        .expect("profile json")
    }

    #[test]
    fn totals_and_liquidity() {
        let p = profile();
        assert_eq!(p.total_assets(), 1_000_000.0);
        assert_eq!(p.total_liabilities(), 200_000.0);
        assert_eq!(p.net_worth(), 800_000.0);
        assert_eq!(p.liquid_assets(), 700_000.0);
        assert_eq!(p.client_type, "family");
        assert_eq!(p.status, "active");
    }

    #[test]
    fn entity_balances_follow_entity_ids() {
        let balances = profile().entity_balances();
        assert_eq!(balances.len(), 2);
        assert_eq!(balances[0].net_value(), 600_000.0);
        assert_eq!(balances[1].net_value(), 200_000.0);
        assert_eq!(balances[1].asset_count, 2);
    }

    #[test]
    fn snapshot_rolls_up_by_entity_and_category() {
        let snap = profile().snapshot(Utc::now());
        assert_eq!(snap.total_net_worth, 800_000.0);
        assert_eq!(snap.by_entity.get("Hartwell Trust"), Some(&600_000.0));
        assert_eq!(snap.by_category.get("real_estate"), Some(&300_000.0));
    }

    #[test]
    fn entity_type_serializes_as_type_field() {
        let json = serde_json::to_value(Entity {
            id: "e-9".into(),
            name: "Holdings".into(),
            entity_type: EntityType::Llc,
        })
        .unwrap();
        assert_eq!(json["type"], "llc");
    }
}
