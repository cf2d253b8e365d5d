//! String cleanup.

/// Cell contents that mean "no value".
pub const NULL_TOKENS: [&str; 3] = ["null", "N/A", "NA"];

/// Trims a raw cell; empty cells and null tokens become `None`.
pub fn clean_string(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() || NULL_TOKENS.contains(&trimmed) {
        return None;
    }
    Some(trimmed.to_string())
}

/// Cleans a hospital name.
///
/// On top of [`clean_string`], strips trailing commas and collapses runs
/// of whitespace to a single space.
pub fn clean_hospital_name(value: Option<&str>) -> Option<String> {
    let cleaned = clean_string(value)?;
    let without_commas = cleaned.trim_end_matches(|c: char| c == ',' || c.is_whitespace());
    let collapsed = without_commas.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_string_trims() {
        assert_eq!(clean_string(Some("  Male ")), Some("Male".to_string()));
    }

    #[test]
    fn test_clean_string_null_tokens() {
        assert_eq!(clean_string(None), None);
        assert_eq!(clean_string(Some("")), None);
        assert_eq!(clean_string(Some("   ")), None);
        assert_eq!(clean_string(Some("null")), None);
        assert_eq!(clean_string(Some(" N/A ")), None);
        assert_eq!(clean_string(Some("NA")), None);
        // Only the listed spellings count
        assert_eq!(clean_string(Some("Null")), Some("Null".to_string()));
        assert_eq!(clean_string(Some("NAN")), Some("NAN".to_string()));
    }

    #[test]
    fn test_hospital_name_cleanup() {
        assert_eq!(
            clean_hospital_name(Some("Sons and Miller,")),
            Some("Sons and Miller".to_string())
        );
        assert_eq!(
            clean_hospital_name(Some("  Smith,   Jones \t and  Co,,")),
            Some("Smith, Jones and Co".to_string())
        );
        assert_eq!(clean_hospital_name(Some("Kim Inc, ,")), Some("Kim Inc".to_string()));
        assert_eq!(clean_hospital_name(Some(",,,")), None);
        assert_eq!(clean_hospital_name(Some("N/A")), None);
    }
}
