//! Directory records, write payloads and paging types.
//!
//! * [`Country`] / [`CountryPayload`] - committed country and its write shape
//! * [`Customer`] / [`CustomerPayload`] - committed customer and its write shape
//! * [`PageRequest`] / [`Page`] - zero-based pagination with optional sort
//!
//! Committed records are what the registries return; payloads are what
//! callers submit. Every payload field is optional so that one type serves
//! both creation (missing required fields are violations) and sparse
//! partial updates (missing fields keep their stored value).

pub mod country;
pub mod customer;
pub mod page;

pub use country::{Country, CountryPayload};
pub use customer::{Customer, CustomerPayload, Gender};
pub use page::{CountryCodeCount, Page, PageRequest, Sort, SortDirection};

/// Pick the patch value when it is present and non-empty, else keep the stored one.
pub(crate) fn patch_field(patch: &Option<String>, stored: Option<&str>) -> Option<String> {
    match patch.as_deref() {
        Some(value) if !value.is_empty() => Some(value.to_string()),
        _ => stored.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_field() {
        assert_eq!(
            patch_field(&Some("new".to_string()), Some("old")),
            Some("new".to_string())
        );
        assert_eq!(patch_field(&Some(String::new()), Some("old")), Some("old".to_string()));
        assert_eq!(patch_field(&None, Some("old")), Some("old".to_string()));
        assert_eq!(patch_field(&None, None), None);
    }
}
