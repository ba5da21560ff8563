use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::domain::{ApplicantProfile, DeclaredNumber};

/// Keys that identify the profile or its authority and can never be edited.
const IMMUTABLE_KEYS: &[&str] = &["citizen_id", "aadhaar", "role", "created_at", "updated_at"];

const FROZEN_KEY: &str = "frozen";

/// Profile attributes with a dedicated, typed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProfileField {
    Name,
    Email,
    Phone,
    Age,
    Income,
    Caste,
    Gender,
    State,
    District,
}

impl ProfileField {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "phone" => Some(Self::Phone),
            "age" => Some(Self::Age),
            "income" => Some(Self::Income),
            "caste" => Some(Self::Caste),
            "gender" => Some(Self::Gender),
            "state" => Some(Self::State),
            "district" => Some(Self::District),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Age => "age",
            Self::Income => "income",
            Self::Caste => "caste",
            Self::Gender => "gender",
            Self::State => "state",
            Self::District => "district",
        }
    }

    fn is_numeric(self) -> bool {
        matches!(self, Self::Age | Self::Income)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum FieldValue {
    Text(Option<String>),
    Number(DeclaredNumber),
}

/// Validation failures for a citizen-proposed change set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChangeSetError {
    #[error("requested changes must be a non-empty object")]
    Empty,
    #[error("field '{0}' cannot be changed through an edit request")]
    Immutable(String),
    #[error("field '{field}' expects {expected}")]
    InvalidValue {
        field: String,
        expected: &'static str,
    },
    #[error("an edit request can unfreeze a profile but never freeze it")]
    FreezeNotAllowed,
}

/// Parsed, validated form of an edit request's `requested_changes` map.
///
/// Ordinary fields merge into the profile; `frozen` is tracked separately
/// because it is a protected flag rather than profile data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileChanges {
    fields: BTreeMap<ProfileField, FieldValue>,
    attributes: BTreeMap<String, Value>,
    unfreeze: bool,
}

impl ProfileChanges {
    pub fn parse(raw: &Map<String, Value>) -> Result<Self, ChangeSetError> {
        if raw.is_empty() {
            return Err(ChangeSetError::Empty);
        }

        let mut changes = Self::default();
        for (key, value) in raw {
            let key = key.trim();
            if IMMUTABLE_KEYS.contains(&key) {
                return Err(ChangeSetError::Immutable(key.to_string()));
            }

            if key == FROZEN_KEY {
                match value {
                    Value::Bool(false) => changes.unfreeze = true,
                    Value::Bool(true) => return Err(ChangeSetError::FreezeNotAllowed),
                    _ => {
                        return Err(ChangeSetError::InvalidValue {
                            field: FROZEN_KEY.to_string(),
                            expected: "false",
                        })
                    }
                }
                continue;
            }

            match ProfileField::from_key(key) {
                Some(field) if field.is_numeric() => {
                    let number = DeclaredNumber::from_value(value);
                    if let DeclaredNumber::Unparsed(_) = number {
                        return Err(ChangeSetError::InvalidValue {
                            field: key.to_string(),
                            expected: "a whole number or null",
                        });
                    }
                    changes.fields.insert(field, FieldValue::Number(number));
                }
                Some(field) => {
                    let text = text_value(field, value)?;
                    changes.fields.insert(field, FieldValue::Text(text));
                }
                None => {
                    changes.attributes.insert(key.to_string(), value.clone());
                }
            }
        }

        Ok(changes)
    }

    pub fn unfreezes(&self) -> bool {
        self.unfreeze
    }

    /// Names of the profile entries this change set writes.
    pub fn touched_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.fields.keys().map(|field| field.key()).collect();
        keys.extend(self.attributes.keys().map(String::as_str));
        if self.unfreeze {
            keys.push(FROZEN_KEY);
        }
        keys
    }

    /// Merge the change set field-wise into `profile`.
    pub fn apply_to(&self, profile: &mut ApplicantProfile, at: DateTime<Utc>) {
        for (field, value) in &self.fields {
            match (field, value) {
                (ProfileField::Age, FieldValue::Number(number)) => profile.age = number.clone(),
                (ProfileField::Income, FieldValue::Number(number)) => {
                    profile.income = number.clone()
                }
                (field, FieldValue::Text(text)) => {
                    let slot = match field {
                        ProfileField::Name => &mut profile.name,
                        ProfileField::Email => &mut profile.email,
                        ProfileField::Phone => &mut profile.phone,
                        ProfileField::Caste => &mut profile.caste,
                        ProfileField::Gender => &mut profile.gender,
                        ProfileField::State => &mut profile.state,
                        ProfileField::District => &mut profile.district,
                        ProfileField::Age | ProfileField::Income => continue,
                    };
                    *slot = text.clone();
                }
                (_, FieldValue::Number(_)) => {}
            }
        }

        for (key, value) in &self.attributes {
            profile.attributes.insert(key.clone(), value.clone());
        }

        if self.unfreeze {
            profile.frozen = false;
        }

        profile.updated_at = Some(at);
    }
}

fn text_value(field: ProfileField, value: &Value) -> Result<Option<String>, ChangeSetError> {
    let text = match value {
        Value::Null => return Ok(None),
        Value::String(text) => text.trim().to_string(),
        _ => {
            return Err(ChangeSetError::InvalidValue {
                field: field.key().to_string(),
                expected: "a string or null",
            })
        }
    };

    if field == ProfileField::Email && !text.is_empty() && !looks_like_email(&text) {
        return Err(ChangeSetError::InvalidValue {
            field: field.key().to_string(),
            expected: "an email address",
        });
    }

    Ok(if text.is_empty() { None } else { Some(text) })
}

fn looks_like_email(text: &str) -> bool {
    match text.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    }
}
