//! Lookup results captured before a rule set runs.
//!
//! The registries fill these in from the store right before validating a
//! write. A snapshot can be stale by the time the write commits; the store's
//! unique indexes catch that case and the write fails with a conflict.

/// Current holders of a candidate country's unique values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountrySnapshot {
    /// Id of the record being updated, `None` on add.
    pub self_id: Option<u64>,
    pub alpha2_holder: Option<u64>,
    pub alpha3_holder: Option<u64>,
    pub isd_holder: Option<u64>,
}

impl CountrySnapshot {
    pub fn alpha2_free(&self) -> bool {
        is_free(self.alpha2_holder, self.self_id)
    }

    pub fn alpha3_free(&self) -> bool {
        is_free(self.alpha3_holder, self.self_id)
    }

    pub fn isd_free(&self) -> bool {
        is_free(self.isd_holder, self.self_id)
    }
}

/// Current holders of a candidate customer's unique values, plus the
/// outcome of its cross-entity lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CustomerSnapshot {
    /// Id of the record being updated, `None` on add.
    pub self_id: Option<u64>,
    pub phone_holder: Option<u64>,
    pub email_holder: Option<u64>,
    /// Whether a country's ISD code equals the phone's dial code.
    /// `None` when the phone carries no parenthesized dial code.
    pub dial_code_known: Option<bool>,
    /// Whether the country code names a registered country.
    /// `None` when the customer has no country code.
    pub country_code_known: Option<bool>,
}

impl CustomerSnapshot {
    pub fn phone_free(&self) -> bool {
        is_free(self.phone_holder, self.self_id)
    }

    pub fn email_free(&self) -> bool {
        is_free(self.email_holder, self.self_id)
    }

    pub fn dial_code_ok(&self) -> bool {
        self.dial_code_known.unwrap_or(true)
    }

    pub fn country_code_ok(&self) -> bool {
        self.country_code_known.unwrap_or(true)
    }
}

/// A value is free when nobody holds it, or when the record being updated does.
fn is_free(holder: Option<u64>, self_id: Option<u64>) -> bool {
    match holder {
        None => true,
        Some(holder) => Some(holder) == self_id,
    }
}
