//! Country records.

use crate::config::Normalization;
use crate::model::patch_field;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

/// A committed country.
///
/// `alpha2_code`, `alpha3_code` and `isd` are each unique across the
/// registry. Serialized field names follow the persisted form
/// (`alpha_2_code`, `alpha_3_code`, `isd_code`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: u64,
    pub name: String,
    #[serde(rename = "alpha_2_code")]
    pub alpha2_code: String,
    #[serde(rename = "alpha_3_code")]
    pub alpha3_code: String,
    #[serde(rename = "isd_code")]
    pub isd: String,
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}/{}, +{})",
            self.name, self.alpha2_code, self.alpha3_code, self.isd
        )
    }
}

/// Write shape for countries: a full record on add, a sparse patch on update.
///
/// ```rust
/// use phone_directory::model::CountryPayload;
///
/// let egypt = CountryPayload::new("Egypt", "EG", "EGY", "20");
/// let rename = CountryPayload::default().with_name("Arab Republic of Egypt");
/// assert!(rename.alpha2_code.is_none());
/// # let _ = egypt;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "alpha_2_code")]
    pub alpha2_code: Option<String>,
    #[serde(default, rename = "alpha_3_code")]
    pub alpha3_code: Option<String>,
    #[serde(default, rename = "isd_code")]
    pub isd: Option<String>,
}

impl CountryPayload {
    /// A payload with every field set.
    pub fn new(
        name: impl Into<String>,
        alpha2_code: impl Into<String>,
        alpha3_code: impl Into<String>,
        isd: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            alpha2_code: Some(alpha2_code.into()),
            alpha3_code: Some(alpha3_code.into()),
            isd: Some(isd.into()),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_alpha2_code(mut self, code: impl Into<String>) -> Self {
        self.alpha2_code = Some(code.into());
        self
    }

    pub fn with_alpha3_code(mut self, code: impl Into<String>) -> Self {
        self.alpha3_code = Some(code.into());
        self
    }

    pub fn with_isd(mut self, isd: impl Into<String>) -> Self {
        self.isd = Some(isd.into());
        self
    }

    /// Apply this payload as a sparse patch over a stored country.
    pub fn merged_onto(&self, stored: &Country) -> CountryPayload {
        CountryPayload {
            name: patch_field(&self.name, Some(&stored.name)),
            alpha2_code: patch_field(&self.alpha2_code, Some(&stored.alpha2_code)),
            alpha3_code: patch_field(&self.alpha3_code, Some(&stored.alpha3_code)),
            isd: patch_field(&self.isd, Some(&stored.isd)),
        }
    }

    pub(crate) fn normalized(self, policy: Normalization) -> Self {
        Self {
            name: policy.apply(self.name),
            alpha2_code: policy.apply(self.alpha2_code),
            alpha3_code: policy.apply(self.alpha3_code),
            isd: policy.apply(self.isd),
        }
    }

    /// The storable form of a validated payload (no id; the store assigns it).
    pub(crate) fn to_record(&self) -> Value {
        json!({
            "name": self.name,
            "alpha_2_code": self.alpha2_code,
            "alpha_3_code": self.alpha3_code,
            "isd_code": self.isd,
        })
    }
}
