use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier wrapper for a registered citizen (the national id number).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CitizenId(pub String);

impl fmt::Display for CitizenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Numeric attribute exactly as the citizen declared it. Registration forms
/// accept free text, so the value may be absent or unparseable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeclaredNumber {
    #[default]
    Missing,
    Value(i64),
    Unparsed(String),
}

impl DeclaredNumber {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Missing,
            Value::Number(number) => match number.as_i64() {
                Some(whole) => Self::Value(whole),
                None => number
                    .as_f64()
                    .filter(|float| float.is_finite())
                    .map(|float| Self::Value(float.trunc() as i64))
                    .unwrap_or_else(|| Self::Unparsed(number.to_string())),
            },
            Value::String(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    Self::Missing
                } else {
                    trimmed
                        .parse::<i64>()
                        .map(Self::Value)
                        .unwrap_or_else(|_| Self::Unparsed(raw.clone()))
                }
            }
            other => Self::Unparsed(other.to_string()),
        }
    }

    /// Value used by eligibility comparisons; anything that is not a number
    /// compares as zero.
    pub fn or_zero(&self) -> i64 {
        match self {
            Self::Value(value) => *value,
            Self::Missing | Self::Unparsed(_) => 0,
        }
    }

    pub fn is_coerced(&self) -> bool {
        !matches!(self, Self::Value(_))
    }
}

impl From<i64> for DeclaredNumber {
    fn from(value: i64) -> Self {
        Self::Value(value)
    }
}

impl Serialize for DeclaredNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Missing => serializer.serialize_none(),
            Self::Value(value) => serializer.serialize_i64(*value),
            Self::Unparsed(raw) => serializer.serialize_str(raw),
        }
    }
}

impl<'de> Deserialize<'de> for DeclaredNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// Stored profiles always belong to citizens; administrators are resolved by
/// the identity provider and never persisted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileRole {
    #[default]
    #[serde(alias = "user")]
    Citizen,
}

/// Demographic record for one citizen, owned by the profile store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub citizen_id: CitizenId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub age: DeclaredNumber,
    #[serde(default)]
    pub income: DeclaredNumber,
    #[serde(default)]
    pub caste: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default = "frozen_at_registration")]
    pub frozen: bool,
    #[serde(default)]
    pub role: ProfileRole,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Additional registration attributes without a dedicated field.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

fn frozen_at_registration() -> bool {
    true
}

impl ApplicantProfile {
    /// Blank profile as created at registration: frozen, citizen role.
    pub fn register(citizen_id: CitizenId, created_at: DateTime<Utc>) -> Self {
        Self {
            citizen_id,
            name: None,
            email: None,
            phone: None,
            age: DeclaredNumber::Missing,
            income: DeclaredNumber::Missing,
            caste: None,
            gender: None,
            state: None,
            district: None,
            frozen: frozen_at_registration(),
            role: ProfileRole::Citizen,
            created_at,
            updated_at: None,
            attributes: BTreeMap::new(),
        }
    }
}
