use std::collections::BTreeSet;

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// One supported eligibility constraint. Anything a scheme declares outside
/// this set is ignored rather than guessed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    MaxIncome(i64),
    MinIncome(i64),
    MinAge(i64),
    MaxAge(i64),
    /// Upper-cased caste names.
    AllowedCaste(BTreeSet<String>),
    /// Lower-cased gender.
    Gender(String),
}

impl Criterion {
    pub fn allowed_caste<I, S>(castes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::AllowedCaste(
            castes
                .into_iter()
                .map(|caste| caste.as_ref().trim().to_ascii_uppercase())
                .collect(),
        )
    }

    pub fn gender(gender: &str) -> Self {
        Self::Gender(gender.trim().to_ascii_lowercase())
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::MaxIncome(_) => "max_income",
            Self::MinIncome(_) => "min_income",
            Self::MinAge(_) => "min_age",
            Self::MaxAge(_) => "max_age",
            Self::AllowedCaste(_) => "allowed_caste",
            Self::Gender(_) => "gender",
        }
    }

    /// Evaluation order: income, age, caste, gender.
    pub(crate) fn rank(&self) -> u8 {
        match self {
            Self::MaxIncome(_) => 0,
            Self::MinIncome(_) => 1,
            Self::MinAge(_) => 2,
            Self::MaxAge(_) => 3,
            Self::AllowedCaste(_) => 4,
            Self::Gender(_) => 5,
        }
    }

    /// `None` when the key is not a supported criterion or its value is
    /// malformed.
    fn parse(key: &str, value: &Value) -> Option<Self> {
        match key {
            "max_income" => bound(value).map(Self::MaxIncome),
            "min_income" => bound(value).map(Self::MinIncome),
            "min_age" => bound(value).map(Self::MinAge),
            "max_age" => bound(value).map(Self::MaxAge),
            "caste" | "allowed_caste" => match value {
                Value::String(caste) => Some(Self::allowed_caste([caste])),
                Value::Array(items) => {
                    let castes: Option<Vec<&str>> = items.iter().map(Value::as_str).collect();
                    castes.map(Self::allowed_caste)
                }
                _ => None,
            },
            "gender" => value.as_str().map(Self::gender),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Self::MaxIncome(limit)
            | Self::MinIncome(limit)
            | Self::MinAge(limit)
            | Self::MaxAge(limit) => Value::Number(Number::from(*limit)),
            Self::AllowedCaste(castes) => {
                Value::Array(castes.iter().cloned().map(Value::String).collect())
            }
            Self::Gender(gender) => Value::String(gender.clone()),
        }
    }
}

fn bound(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float.trunc() as i64)),
        Value::String(raw) => raw.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// A scheme's constraints as an ordered list of supported criteria, plus the
/// raw entries that were not understood.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EligibilityCriteria {
    rules: Vec<Criterion>,
    ignored: Map<String, Value>,
}

impl EligibilityCriteria {
    pub fn new<I>(rules: I) -> Self
    where
        I: IntoIterator<Item = Criterion>,
    {
        let mut rules: Vec<Criterion> = rules.into_iter().collect();
        rules.sort_by_key(Criterion::rank);
        Self {
            rules,
            ignored: Map::new(),
        }
    }

    pub fn from_map(raw: &Map<String, Value>) -> Self {
        let mut rules = Vec::new();
        let mut ignored = Map::new();
        for (key, value) in raw {
            match Criterion::parse(key, value) {
                Some(criterion) => rules.push(criterion),
                None => {
                    tracing::debug!(criterion = %key, "ignoring unrecognized eligibility criterion");
                    ignored.insert(key.clone(), value.clone());
                }
            }
        }
        rules.sort_by_key(Criterion::rank);
        Self { rules, ignored }
    }

    /// Supported criteria in evaluation order.
    pub fn rules(&self) -> &[Criterion] {
        &self.rules
    }

    pub fn ignored_keys(&self) -> impl Iterator<Item = &str> {
        self.ignored.keys().map(String::as_str)
    }

    pub fn is_unconstrained(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Serialize for EligibilityCriteria {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rules.len() + self.ignored.len()))?;
        for rule in &self.rules {
            map.serialize_entry(rule.key(), &rule.to_value())?;
        }
        for (key, value) in &self.ignored {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EligibilityCriteria {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<Map<String, Value>>::deserialize(deserializer)?;
        Ok(raw.map(|raw| Self::from_map(&raw)).unwrap_or_default())
    }
}
