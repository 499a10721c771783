//! # Field Validation
//!
//! Bounds for every user-supplied record field. Checks run in upload order
//! (title, size, summary, categories) and the first failure wins. Lengths
//! are counted in characters, not bytes.

use super::errors::{RegistryError, RegistryResult};
use super::types::RecordFields;

/// Longest accepted title
pub const MAX_TITLE_CHARS: usize = 63;

/// Longest accepted summary
pub const MAX_SUMMARY_CHARS: usize = 255;

/// Longest accepted category token
pub const MAX_CATEGORY_CHARS: usize = 31;

/// Most categories per record
pub const MAX_CATEGORIES: usize = 8;

/// Exclusive upper bound on `size`
pub const SIZE_LIMIT: u64 = 1_000_000_000;

fn within(text: &str, max_chars: usize) -> bool {
    let len = text.chars().count();
    len > 0 && len <= max_chars
}

pub fn validate_title(title: &str) -> RegistryResult<()> {
    if within(title, MAX_TITLE_CHARS) {
        Ok(())
    } else {
        Err(RegistryError::InvalidTitle)
    }
}

pub fn validate_size(size: u64) -> RegistryResult<()> {
    if size > 0 && size < SIZE_LIMIT {
        Ok(())
    } else {
        Err(RegistryError::InvalidSize)
    }
}

/// Summary violations share the title error kind.
pub fn validate_summary(summary: &str) -> RegistryResult<()> {
    if within(summary, MAX_SUMMARY_CHARS) {
        Ok(())
    } else {
        Err(RegistryError::InvalidTitle)
    }
}

/// Category violations share the title error kind.
pub fn validate_categories(categories: &[String]) -> RegistryResult<()> {
    if categories.is_empty() || categories.len() > MAX_CATEGORIES {
        return Err(RegistryError::InvalidTitle);
    }
    if categories.iter().all(|c| within(c, MAX_CATEGORY_CHARS)) {
        Ok(())
    } else {
        Err(RegistryError::InvalidTitle)
    }
}

/// Zero is the only rejected upload time.
pub fn validate_upload_time(height: u64) -> RegistryResult<()> {
    if height == 0 {
        Err(RegistryError::InvalidTitle)
    } else {
        Ok(())
    }
}

/// Validate all record fields in order
pub fn validate_fields(fields: &RecordFields) -> RegistryResult<()> {
    validate_title(&fields.title)?;
    validate_size(fields.size)?;
    validate_summary(&fields.summary)?;
    validate_categories(&fields.categories)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cats(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_title_bounds() {
        assert!(validate_title(&"a".repeat(63)).is_ok());
        assert_eq!(validate_title(&"a".repeat(64)), Err(RegistryError::InvalidTitle));
        assert_eq!(validate_title(""), Err(RegistryError::InvalidTitle));
    }

    #[test]
    fn test_title_counts_characters() {
        // 63 two-byte characters still fit
        assert!(validate_title(&"é".repeat(63)).is_ok());
    }

    #[test]
    fn test_size_bounds() {
        assert!(validate_size(1).is_ok());
        assert!(validate_size(999_999_999).is_ok());
        assert_eq!(validate_size(1_000_000_000), Err(RegistryError::InvalidSize));
        assert_eq!(validate_size(0), Err(RegistryError::InvalidSize));
    }

    #[test]
    fn test_summary_bounds() {
        assert!(validate_summary(&"s".repeat(255)).is_ok());
        assert_eq!(validate_summary(&"s".repeat(256)), Err(RegistryError::InvalidTitle));
        assert_eq!(validate_summary(""), Err(RegistryError::InvalidTitle));
    }

    #[test]
    fn test_category_bounds() {
        assert!(validate_categories(&cats(&["fiction"])).is_ok());
        assert!(validate_categories(&vec!["c".repeat(31); 8]).is_ok());
        assert!(validate_categories(&[]).is_err());
        assert!(validate_categories(&vec!["c".to_string(); 9]).is_err());
        assert!(validate_categories(&cats(&["ok", ""])).is_err());
        assert!(validate_categories(&["c".repeat(32)]).is_err());
    }

    #[test]
    fn test_first_failure_wins() {
        // Bad title and bad size: title reported
        let fields = RecordFields::new("", 0, "", vec![]);
        assert_eq!(validate_fields(&fields), Err(RegistryError::InvalidTitle));

        // Good title, bad size and summary: size reported
        let fields = RecordFields::new("Dune", 0, "", vec![]);
        assert_eq!(validate_fields(&fields), Err(RegistryError::InvalidSize));
    }

    #[test]
    fn test_upload_time() {
        assert!(validate_upload_time(1).is_ok());
        assert_eq!(validate_upload_time(0), Err(RegistryError::InvalidTitle));
    }
}
