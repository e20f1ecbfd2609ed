//! Snapshot model
//!
//! One immutable tick of simulation state as delivered over the stream.
//! Each snapshot carries:
//! - Scalar market indicators (GDP, unemployment, price level, ...)
//! - The policy action currently applied by the remote agent
//! - Per-entity tables for firms and households
//!
//! A snapshot is received as one atomic unit per network frame and is never
//! partially applied: either the whole frame decodes or it is dropped.
//!
//! # Critical Invariants
//!
//! 1. All scalar indicator fields are required on the wire; a frame missing
//!    one fails to decode and is discarded upstream
//! 2. Entity collections may be empty but decode to empty when absent
//! 3. Unknown inbound fields are ignored (the peer may send more than we read)

use serde::{Deserialize, Serialize};

/// The three-field fiscal policy vector applied to the simulation.
///
/// Two instances exist conceptually: the agent-reported action embedded in
/// each [`Snapshot`], and the operator's manual action held in settings.
/// They must never be conflated; the manual action is authoritative only
/// while manual mode is active.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PolicyAction {
    /// Income tax rate, expected in `[0, 1]`
    pub income_tax: f64,

    /// Corporate tax rate, expected in `[0, 1]`
    pub corp_tax: f64,

    /// Universal basic income per household per tick, `>= 0`
    pub ubi: f64,
}

/// Identifies a single field of a [`PolicyAction`].
///
/// Used when the operator edits one slider at a time; the edit is merged
/// into the existing action rather than replacing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionField {
    IncomeTax,
    CorpTax,
    Ubi,
}

impl PolicyAction {
    /// Return a copy of this action with a single field replaced.
    pub fn with_field(mut self, field: ActionField, value: f64) -> Self {
        match field {
            ActionField::IncomeTax => self.income_tax = value,
            ActionField::CorpTax => self.corp_tax = value,
            ActionField::Ubi => self.ubi = value,
        }
        self
    }
}

/// One firm's state within a snapshot.
///
/// Entities are replaced wholesale each snapshot; the id is stable across
/// ticks only for table keying, never for cross-snapshot tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Firm {
    pub id: u64,

    /// Cash on hand
    #[serde(default)]
    pub cash: f64,

    /// Unsold goods in stock
    #[serde(default)]
    pub inventory: f64,

    /// Current asking price per unit
    #[serde(default)]
    pub price: f64,

    /// Wage offered on the labor market
    #[serde(default)]
    pub wage_offer: f64,

    /// Profit realized over the last tick
    #[serde(default)]
    pub last_profit: f64,

    #[serde(default)]
    pub employees_count: u32,

    #[serde(default)]
    pub max_employees: u32,

    /// Production tier classification
    #[serde(default)]
    pub tier: u32,

    /// Cumulative bankruptcy counter
    #[serde(default)]
    pub bankruptcies: u32,
}

/// One household's state within a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Household {
    pub id: u64,

    #[serde(default)]
    pub cash: f64,

    /// Labor skill factor
    #[serde(default)]
    pub skill: f64,

    #[serde(default)]
    pub employed: bool,

    /// Current wage, zero when unemployed
    #[serde(default)]
    pub wage: f64,

    /// Lowest wage this household will accept
    #[serde(default)]
    pub reservation_wage: f64,

    /// Ticks left on the current labor contract
    #[serde(default)]
    pub contract_remaining: u32,

    /// Whether the household failed to afford subsistence this tick
    #[serde(default)]
    pub subsistence_failed: bool,
}

/// Complete simulation state for one tick.
///
/// # Example
///
/// ```rust
/// use ecosim_monitor_core::Snapshot;
///
/// let frame = r#"{
///     "step": 12, "gdp": 10500.0, "real_gdp": 9800.0,
///     "unemployment": 0.08, "avg_price": 10.7, "avg_wage": 5.2,
///     "inflation_rate": 0.02, "tax_revenue": 830.0, "govt_cash": 4100.0,
///     "subsistence_failures": 3, "gini": 0.41,
///     "action": {"income_tax": 0.2, "corp_tax": 0.15, "ubi": 50.0},
///     "firms": [], "households": []
/// }"#;
///
/// let snapshot: Snapshot = serde_json::from_str(frame).unwrap();
/// assert_eq!(snapshot.step, 12);
/// assert!(snapshot.firms.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Discrete simulation time index
    pub step: u64,

    /// Nominal GDP at current market prices
    pub gdp: f64,

    /// Inflation-adjusted GDP
    pub real_gdp: f64,

    /// Unemployment rate in `[0, 1]`
    pub unemployment: f64,

    /// Average goods price across firms
    pub avg_price: f64,

    /// Average wage across employed households
    pub avg_wage: f64,

    pub inflation_rate: f64,

    /// Tax collected over the last tick
    pub tax_revenue: f64,

    /// Government treasury balance (may be negative)
    pub govt_cash: f64,

    /// Households that failed subsistence this tick
    pub subsistence_failures: u32,

    /// Gini coefficient of household wealth
    pub gini: f64,

    /// Policy action the remote agent applied this tick
    pub action: PolicyAction,

    /// Firm table, replaced wholesale each tick
    #[serde(default)]
    pub firms: Vec<Firm>,

    /// Household table, replaced wholesale each tick
    #[serde(default)]
    pub households: Vec<Household>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_frame() -> serde_json::Value {
        json!({
            "step": 42,
            "gdp": 12000.0,
            "real_gdp": 11000.0,
            "unemployment": 0.12,
            "avg_price": 10.9,
            "avg_wage": 5.5,
            "inflation_rate": 0.03,
            "tax_revenue": 950.0,
            "govt_cash": -250.0,
            "subsistence_failures": 7,
            "gini": 0.38,
            "action": {"income_tax": 0.25, "corp_tax": 0.1, "ubi": 120.0},
            "firms": [{
                "id": 3,
                "cash": 5000.0,
                "inventory": 40.0,
                "price": 11.2,
                "wage_offer": 5.8,
                "employees_count": 9,
                "bankruptcies": 1,
                "last_profit": 230.0,
                "tier": 2,
                "max_employees": 12
            }],
            "households": [{
                "id": 17,
                "cash": 800.0,
                "skill": 1.4,
                "employed": true,
                "wage": 6.1,
                "reservation_wage": 4.9,
                "subsistence_failed": false,
                "contract_remaining": 5
            }]
        })
    }

    #[test]
    fn test_decode_full_frame() {
        let snapshot: Snapshot = serde_json::from_value(full_frame()).unwrap();

        assert_eq!(snapshot.step, 42);
        assert_eq!(snapshot.govt_cash, -250.0);
        assert_eq!(snapshot.firms.len(), 1);
        assert_eq!(snapshot.firms[0].id, 3);
        assert_eq!(snapshot.firms[0].max_employees, 12);
        assert_eq!(snapshot.households.len(), 1);
        assert!(snapshot.households[0].employed);
        assert_eq!(snapshot.action.ubi, 120.0);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let mut frame = full_frame();
        frame["households"][0]["inventory"] = json!(3.5);
        frame["debug_marker"] = json!("ignored");

        let snapshot: Snapshot = serde_json::from_value(frame).unwrap();
        assert_eq!(snapshot.households[0].id, 17);
    }

    #[test]
    fn test_absent_collections_decode_empty() {
        let mut frame = full_frame();
        frame.as_object_mut().unwrap().remove("firms");
        frame.as_object_mut().unwrap().remove("households");

        let snapshot: Snapshot = serde_json::from_value(frame).unwrap();
        assert!(snapshot.firms.is_empty());
        assert!(snapshot.households.is_empty());
    }

    #[test]
    fn test_missing_scalar_fails_decode() {
        let mut frame = full_frame();
        frame.as_object_mut().unwrap().remove("real_gdp");

        assert!(serde_json::from_value::<Snapshot>(frame).is_err());
    }

    #[test]
    fn test_partial_entity_fields_default_to_zero() {
        let mut frame = full_frame();
        frame["firms"] = json!([{"id": 9}]);

        let snapshot: Snapshot = serde_json::from_value(frame).unwrap();
        assert_eq!(snapshot.firms[0].cash, 0.0);
        assert_eq!(snapshot.firms[0].employees_count, 0);
    }

    #[test]
    fn test_with_field_replaces_one_field() {
        let action = PolicyAction {
            income_tax: 0.2,
            corp_tax: 0.2,
            ubi: 0.0,
        };

        let edited = action.with_field(ActionField::Ubi, 250.0);

        assert_eq!(edited.income_tax, 0.2);
        assert_eq!(edited.corp_tax, 0.2);
        assert_eq!(edited.ubi, 250.0);
    }
}
