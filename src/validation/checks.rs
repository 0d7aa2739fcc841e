//! Reusable field predicates.

use crate::patterns::CodecPatterns;

/// Character count within `min..=max`.
pub fn length(min: usize, max: usize) -> impl Fn(&str) -> bool + Send + Sync + 'static {
    move |value| (min..=max).contains(&value.chars().count())
}

pub fn ascii_letters(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_alphabetic())
}

pub fn ascii_digits(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_digit())
}

pub fn phone(value: &str) -> bool {
    CodecPatterns::global().is_phone(value)
}

pub fn email(value: &str) -> bool {
    CodecPatterns::global().is_email(value)
}

/// Exact, case-sensitive membership.
pub fn one_of(allowed: &'static [&'static str]) -> impl Fn(&str) -> bool + Send + Sync + 'static {
    move |value| allowed.contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_counts_characters() {
        let check = length(3, 5);
        // Three characters, six bytes.
        assert!(check("Äåö"));
        assert!(check("abcde"));
        assert!(!check("ab"));
        assert!(!check("abcdef"));
    }

    #[test]
    fn test_character_classes() {
        assert!(ascii_letters("EG"));
        assert!(!ascii_letters("E1"));
        assert!(!ascii_letters("ÉG"));
        assert!(ascii_digits("212"));
        assert!(!ascii_digits("+20"));
    }

    #[test]
    fn test_one_of_is_case_sensitive() {
        let check = one_of(&["male", "female"]);
        assert!(check("female"));
        assert!(!check("Female"));
        assert!(!check("other"));
    }
}
