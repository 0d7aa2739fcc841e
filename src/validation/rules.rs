//! The country and customer rule sets.
//!
//! Field names in violations follow the persisted form of each record.
//! Per field, shape rules (length, pattern, allowed values) come first, then
//! uniqueness, then cross-entity checks.

use super::checks;
use super::{CountrySnapshot, CustomerSnapshot, FieldPipeline, Rule, RuleSet};
use crate::model::{CountryPayload, CustomerPayload, Gender};

pub const NAME_MIN: usize = 3;
pub const NAME_MAX: usize = 50;
pub const ISD_MAX: usize = 5;
pub const PHONE_MIN: usize = 3;
pub const PHONE_MAX: usize = 50;
pub const EMAIL_MAX: usize = 50;

pub fn country_rules() -> RuleSet<CountryPayload, CountrySnapshot> {
    RuleSet::new()
        .field(
            FieldPipeline::required("name", |c: &CountryPayload| c.name.as_deref()).check(
                Rule::Length,
                format!("size must be between {} and {}", NAME_MIN, NAME_MAX),
                checks::length(NAME_MIN, NAME_MAX),
            ),
        )
        .field(
            FieldPipeline::required("alpha_2_code", |c: &CountryPayload| c.alpha2_code.as_deref())
                .check(Rule::Length, "size must be exactly 2", checks::length(2, 2))
                .check(Rule::Pattern, "must contain only letters", checks::ascii_letters)
                .check_with(
                    Rule::Unique,
                    "Country with same alpha 2 code already exists",
                    |_, s: &CountrySnapshot| s.alpha2_free(),
                ),
        )
        .field(
            FieldPipeline::required("alpha_3_code", |c: &CountryPayload| c.alpha3_code.as_deref())
                .check(Rule::Length, "size must be exactly 3", checks::length(3, 3))
                .check(Rule::Pattern, "must contain only letters", checks::ascii_letters)
                .check_with(
                    Rule::Unique,
                    "Country with same alpha 3 code already exists",
                    |_, s: &CountrySnapshot| s.alpha3_free(),
                ),
        )
        .field(
            FieldPipeline::required("isd_code", |c: &CountryPayload| c.isd.as_deref())
                .check(
                    Rule::Length,
                    format!("size must be between 1 and {}", ISD_MAX),
                    checks::length(1, ISD_MAX),
                )
                .check(Rule::Pattern, "must contain only digits", checks::ascii_digits)
                .check_with(
                    Rule::Unique,
                    "Country with same ISD code already exists",
                    |_, s: &CountrySnapshot| s.isd_free(),
                ),
        )
}

pub fn customer_rules() -> RuleSet<CustomerPayload, CustomerSnapshot> {
    RuleSet::new()
        .field(
            FieldPipeline::required("name", |c: &CustomerPayload| c.name.as_deref()).check(
                Rule::Length,
                format!("size must be between {} and {}", NAME_MIN, NAME_MAX),
                checks::length(NAME_MIN, NAME_MAX),
            ),
        )
        .field(
            FieldPipeline::optional("country_code", |c: &CustomerPayload| {
                c.country_code.as_deref()
            })
            .check_with(
                Rule::CrossReference,
                "Country code does not exist",
                |_, s: &CustomerSnapshot| s.country_code_ok(),
            ),
        )
        .field(
            FieldPipeline::required("phone", |c: &CustomerPayload| c.phone.as_deref())
                .check(
                    Rule::Length,
                    format!("size must be between {} and {}", PHONE_MIN, PHONE_MAX),
                    checks::length(PHONE_MIN, PHONE_MAX),
                )
                .check(Rule::Pattern, "Invalid phone number", checks::phone)
                .check_with(
                    Rule::Unique,
                    "Customer with same phone number already exists",
                    |_, s: &CustomerSnapshot| s.phone_free(),
                )
                .check_with(
                    Rule::CrossReference,
                    "Phone number country code does not exist",
                    |_, s: &CustomerSnapshot| s.dial_code_ok(),
                ),
        )
        .field(
            FieldPipeline::optional("email", |c: &CustomerPayload| c.email.as_deref())
                .check(
                    Rule::Length,
                    format!("size must be between 0 and {}", EMAIL_MAX),
                    checks::length(0, EMAIL_MAX),
                )
                .check(Rule::Pattern, "must be a well-formed email address", checks::email)
                .check_with(
                    Rule::Unique,
                    "Customer with same email already exists",
                    |_, s: &CustomerSnapshot| s.email_free(),
                ),
        )
        .field(
            FieldPipeline::optional("gender", |c: &CustomerPayload| c.gender.as_deref()).check(
                Rule::AllowedValues,
                format!("must be one of: {}", Gender::ALLOWED.join(", ")),
                checks::one_of(&Gender::ALLOWED),
            ),
        )
}
