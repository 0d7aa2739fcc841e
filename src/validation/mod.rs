//! Field-level, uniqueness and cross-entity validation.
//!
//! A [`RuleSet`] is an ordered list of [`FieldPipeline`]s, one per field.
//! Each pipeline is an ordered list of pure predicate/message pairs evaluated
//! against the candidate record and an explicit context value (a snapshot of
//! the lookups the rules need). Evaluation is synchronous and side-effect
//! free; gathering the snapshot is the caller's job.
//!
//! Within a pipeline the first failing rule stops that field. Every pipeline
//! runs, so one rejected write reports all of its invalid fields at once.
//!
//! Presence semantics:
//! * an empty string is absent
//! * a required field that is absent or only whitespace fails [`Rule::Required`]
//! * an optional field that is absent skips its pipeline
//!
//! ```rust
//! use phone_directory::validation::{FieldPipeline, Rule, RuleSet, checks};
//!
//! struct Signup { handle: Option<String> }
//!
//! let rules: RuleSet<Signup, ()> = RuleSet::new().field(
//!     FieldPipeline::required("handle", |s: &Signup| s.handle.as_deref())
//!         .check(Rule::Length, "size must be between 3 and 8", checks::length(3, 8)),
//! );
//!
//! let report = rules.validate(&Signup { handle: Some("ab".into()) }, &());
//! assert_eq!(report.violations()[0].rule, Rule::Length);
//! ```

pub mod checks;
pub mod rules;
pub mod snapshot;

pub use snapshot::{CountrySnapshot, CustomerSnapshot};

use crate::error::ValidationErrors;
use crate::model::{CountryPayload, CustomerPayload};
use serde::Serialize;
use std::fmt;

/// The category of a validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Required,
    Length,
    Pattern,
    AllowedValues,
    Unique,
    CrossReference,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Rule::Required => "required",
            Rule::Length => "length",
            Rule::Pattern => "pattern",
            Rule::AllowedValues => "allowed_values",
            Rule::Unique => "unique",
            Rule::CrossReference => "cross_reference",
        })
    }
}

/// One failed rule on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub rule: Rule,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, rule: Rule, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.field, self.message, self.rule)
    }
}

/// Outcome of evaluating a rule set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors::new(self.violations))
        }
    }
}

type Check<C> = Box<dyn Fn(&str, &C) -> bool + Send + Sync>;

struct FieldRule<C> {
    rule: Rule,
    message: String,
    check: Check<C>,
}

/// The ordered rules for one field.
pub struct FieldPipeline<T, C> {
    field: &'static str,
    required: bool,
    accessor: fn(&T) -> Option<&str>,
    rules: Vec<FieldRule<C>>,
}

impl<T, C> FieldPipeline<T, C> {
    /// A field that must be present and not blank.
    pub fn required(field: &'static str, accessor: fn(&T) -> Option<&str>) -> Self {
        Self {
            field,
            required: true,
            accessor,
            rules: Vec::new(),
        }
    }

    /// A field whose rules only run when it is present.
    pub fn optional(field: &'static str, accessor: fn(&T) -> Option<&str>) -> Self {
        Self {
            field,
            required: false,
            accessor,
            rules: Vec::new(),
        }
    }

    /// Append a rule on the field value alone.
    pub fn check<F>(self, rule: Rule, message: impl Into<String>, check: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.check_with(rule, message, move |value, _| check(value))
    }

    /// Append a rule that also reads the validation context.
    ///
    /// Rules run in the order they are added, whichever method added them.
    pub fn check_with<F>(mut self, rule: Rule, message: impl Into<String>, check: F) -> Self
    where
        F: Fn(&str, &C) -> bool + Send + Sync + 'static,
    {
        self.rules.push(FieldRule {
            rule,
            message: message.into(),
            check: Box::new(check),
        });
        self
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Evaluate this field, returning its first violation if any.
    fn evaluate(&self, record: &T, context: &C) -> Option<Violation> {
        let value = (self.accessor)(record).filter(|v| !v.is_empty());

        let Some(value) = value else {
            return self
                .required
                .then(|| Violation::new(self.field, Rule::Required, "must not be blank"));
        };

        if self.required && value.trim().is_empty() {
            return Some(Violation::new(self.field, Rule::Required, "must not be blank"));
        }

        self.rules
            .iter()
            .find(|rule| !(rule.check)(value, context))
            .map(|rule| Violation::new(self.field, rule.rule, rule.message.clone()))
    }
}

/// All field pipelines for one record kind.
pub struct RuleSet<T, C> {
    pipelines: Vec<FieldPipeline<T, C>>,
}

impl<T, C> Default for RuleSet<T, C> {
    fn default() -> Self {
        Self {
            pipelines: Vec::new(),
        }
    }
}

impl<T, C> RuleSet<T, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, pipeline: FieldPipeline<T, C>) -> Self {
        self.pipelines.push(pipeline);
        self
    }

    /// Names of the validated fields, in evaluation order.
    pub fn fields(&self) -> Vec<&'static str> {
        self.pipelines.iter().map(FieldPipeline::field).collect()
    }

    /// Evaluate every field against `record` and `context`.
    pub fn validate(&self, record: &T, context: &C) -> ValidationReport {
        ValidationReport {
            violations: self
                .pipelines
                .iter()
                .filter_map(|pipeline| pipeline.evaluate(record, context))
                .collect(),
        }
    }
}

/// The rule sets for both record kinds.
///
/// Registries hand it the candidate record together with a snapshot of the
/// uniqueness and cross-reference lookups taken just before validation. The
/// engine itself performs no I/O and provides no atomicity.
pub struct ValidationEngine {
    countries: RuleSet<CountryPayload, CountrySnapshot>,
    customers: RuleSet<CustomerPayload, CustomerSnapshot>,
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationEngine {
    pub fn new() -> Self {
        Self {
            countries: rules::country_rules(),
            customers: rules::customer_rules(),
        }
    }

    pub fn validate_country(
        &self,
        payload: &CountryPayload,
        snapshot: &CountrySnapshot,
    ) -> ValidationReport {
        self.countries.validate(payload, snapshot)
    }

    pub fn validate_customer(
        &self,
        payload: &CustomerPayload,
        snapshot: &CustomerSnapshot,
    ) -> ValidationReport {
        self.customers.validate(payload, snapshot)
    }
}
