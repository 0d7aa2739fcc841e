//! Customer records.

use crate::config::Normalization;
use crate::model::patch_field;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;

/// Customer gender. Serialized lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALLOWED: [&'static str; 2] = ["male", "female"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(format!(
                "'{}' is not one of {}",
                other,
                Gender::ALLOWED.join(", ")
            )),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A committed customer.
///
/// `phone` is unique across the directory, and so is `email` when present.
/// `created_at` and `updated_at` are owned by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: u64,
    pub name: String,
    #[serde(default, rename = "country_code")]
    pub country_code: Option<String>,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(rename = "createdAt", serialize_with = "serialize_stamp")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt", serialize_with = "serialize_stamp")]
    pub updated_at: DateTime<Utc>,
}

/// RFC 3339 with a fixed nine fractional digits, so stored stamps order as text.
fn stamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn serialize_stamp<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&stamp(at))
}

impl Customer {
    /// The dial code embedded in the phone number, if it carries one.
    pub fn dial_code(&self) -> Option<&str> {
        crate::patterns::CodecPatterns::global().dial_code(&self.phone)
    }
}

/// Write shape for customers: a full record on add, a sparse patch on update.
///
/// Timestamps and id are not part of the payload; any such fields in
/// client input are ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "country_code")]
    pub country_code: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

impl CustomerPayload {
    /// A payload carrying the two required fields.
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            phone: Some(phone.into()),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_country_code(mut self, code: impl Into<String>) -> Self {
        self.country_code = Some(code.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    /// Apply this payload as a sparse patch over a stored customer.
    pub fn merged_onto(&self, stored: &Customer) -> CustomerPayload {
        CustomerPayload {
            name: patch_field(&self.name, Some(&stored.name)),
            country_code: patch_field(&self.country_code, stored.country_code.as_deref()),
            phone: patch_field(&self.phone, Some(&stored.phone)),
            email: patch_field(&self.email, stored.email.as_deref()),
            gender: patch_field(&self.gender, stored.gender.as_ref().map(Gender::as_str)),
        }
    }

    pub(crate) fn normalized(self, policy: Normalization) -> Self {
        Self {
            name: policy.apply(self.name),
            country_code: policy.apply(self.country_code),
            phone: policy.apply(self.phone),
            email: policy.apply(self.email),
            gender: policy.apply(self.gender),
        }
    }

    /// The storable form of a validated payload.
    ///
    /// Empty optional fields are stored as null so they stay out of the
    /// unique indexes.
    pub(crate) fn to_record(
        &self,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Value {
        fn non_empty(v: &Option<String>) -> Option<String> {
            v.as_deref().filter(|s| !s.is_empty()).map(str::to_string)
        }
        json!({
            "name": self.name,
            "country_code": non_empty(&self.country_code),
            "phone": self.phone,
            "email": non_empty(&self.email),
            "gender": non_empty(&self.gender),
            "createdAt": stamp(&created_at),
            "updatedAt": stamp(&updated_at),
        })
    }
}
