//! Compiled validation patterns for phone numbers and emails.
//!
//! Phone grammar: a dial-code prefix of 1-6 digits, optionally wrapped in
//! parentheses, then two 3-digit groups and a final 1-4 digit group. Groups
//! may be separated by a single space, dot or hyphen:
//!
//! ```text
//! (20) 123-547-8915
//! (212) 6007989253
//! 20.123.547.8915
//! ```
//!
//! Only the parenthesized form carries a dial code that is cross-checked
//! against the country registry.

use regex::Regex;
use std::sync::OnceLock;

const PHONE_PATTERN: &str = r"^((\(\d{1,6}\))|\d{1,6})[- .]?(\d{3}[- .]?){2}\d{1,4}$";
const DIALED_PHONE_PATTERN: &str = r"^\((\d{1,6})\)[- .]?(?:\d{3}[- .]?){2}\d{1,4}$";
// local@domain with dot-separated domain labels of at most 63 characters.
const EMAIL_PATTERN: &str = concat!(
    r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+",
    r"@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?",
    r"(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
);

static GLOBAL: OnceLock<CodecPatterns> = OnceLock::new();

/// The compiled phone, dial-code and email patterns.
#[derive(Debug, Clone)]
pub struct CodecPatterns {
    phone: Regex,
    dialed_phone: Regex,
    email: Regex,
}

impl CodecPatterns {
    /// Compile the patterns.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            phone: Regex::new(PHONE_PATTERN)?,
            dialed_phone: Regex::new(DIALED_PHONE_PATTERN)?,
            email: Regex::new(EMAIL_PATTERN)?,
        })
    }

    /// Shared instance, compiled on first use.
    pub fn global() -> &'static CodecPatterns {
        GLOBAL.get_or_init(|| CodecPatterns::new().expect("built-in validation patterns compile"))
    }

    /// Whether `value` follows the international phone grammar.
    pub fn is_phone(&self, value: &str) -> bool {
        self.phone.is_match(value)
    }

    /// Whether `value` has the local@domain email shape.
    pub fn is_email(&self, value: &str) -> bool {
        self.email.is_match(value)
    }

    /// The digits between the first `(` and `)` of a well-formed, parenthesized phone number.
    ///
    /// Returns `None` for numbers without a parenthesized prefix and for
    /// anything that does not match the phone grammar.
    pub fn dial_code<'a>(&self, phone: &'a str) -> Option<&'a str> {
        self.dialed_phone
            .captures(phone)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}
