//! Request record for one automation scenario.
//!
//! Form widgets send numbers as strings, leave fields blank, or omit them. Every
//! numeric field therefore deserializes leniently: numbers and numeric strings are
//! accepted, anything else (including NaN and infinities) falls back to the field
//! default. Deserialization never fails on field content.
//!
//! Coercion starts once the body has parsed as JSON. A numeric literal outside
//! the `f64` range (`1e400`) is a JSON parse error and rejects the whole body;
//! the same value sent as a string (`"1e400"`) parses to infinity and becomes
//! the field default.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const DEFAULT_LABOR_REDUCTION_PCT: f64 = 70.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    EveryMinute,
    Hourly,
    #[default]
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
}

impl Frequency {
    /// Ordered from most to least frequent.
    pub const ALL: [Frequency; 7] = [
        Frequency::EveryMinute,
        Frequency::Hourly,
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Biweekly,
        Frequency::Monthly,
        Frequency::Quarterly,
    ];

    /// Unknown labels resolve to `Daily`.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "every_minute" => Frequency::EveryMinute,
            "hourly" => Frequency::Hourly,
            "daily" => Frequency::Daily,
            "weekly" => Frequency::Weekly,
            "biweekly" => Frequency::Biweekly,
            "monthly" => Frequency::Monthly,
            "quarterly" => Frequency::Quarterly,
            _ => Frequency::default(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::EveryMinute => "every_minute",
            Frequency::Hourly => "hourly",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
        }
    }
}

impl<'de> Deserialize<'de> for Frequency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Frequency::parse(&s),
            _ => Frequency::default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiInput {
    #[serde(default, deserialize_with = "lenient_string")]
    pub process_name: String,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub runs_per_period: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub hours_per_run: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub staff_count: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub hourly_rate: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub implementation_cost: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub software_license_cost: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub annual_maintenance_cost: f64,
    #[serde(
        default = "default_labor_reduction",
        deserialize_with = "lenient_labor_reduction"
    )]
    pub expected_labor_reduction: f64,

    // Collected by the advanced settings form; no evaluation path reads them.
    #[serde(
        default,
        deserialize_with = "lenient_opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub error_rate: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub error_fix_cost: Option<f64>,
}

impl Default for RoiInput {
    fn default() -> Self {
        Self {
            process_name: String::new(),
            frequency: Frequency::default(),
            runs_per_period: 0.0,
            hours_per_run: 0.0,
            staff_count: 0.0,
            hourly_rate: 0.0,
            implementation_cost: 0.0,
            software_license_cost: 0.0,
            annual_maintenance_cost: 0.0,
            expected_labor_reduction: DEFAULT_LABOR_REDUCTION_PCT,
            error_rate: None,
            error_fix_cost: None,
        }
    }
}

/// Finite number carried by a JSON value, if any.
pub(crate) fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn default_labor_reduction() -> f64 {
    DEFAULT_LABOR_REDUCTION_PCT
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(coerce_number(&Value::deserialize(deserializer)?).unwrap_or(0.0))
}

fn lenient_labor_reduction<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(coerce_number(&Value::deserialize(deserializer)?).unwrap_or(DEFAULT_LABOR_REDUCTION_PCT))
}

pub(crate) fn lenient_opt_f64<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    Ok(coerce_number(&Value::deserialize(deserializer)?))
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}
