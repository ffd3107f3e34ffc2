//! Phone identity normalization.
//!
//! A phone string's identity key is its digit-only projection. Two phone
//! strings belong to the same owner iff their projections are equal. The key
//! is derived at comparison time and never stored as the display value.

/// Minimum digit count for a phone number to be accepted by any flow.
pub const MIN_IDENTITY_DIGITS: usize = 6;

/// Projects a phone string onto its digit-only identity key.
///
/// Strips every non-digit character and nothing else. Leading country-code
/// digits are kept, so "+1 9873312399" and "9873312399" map to different
/// identity keys. That fragmentation across formats is intentional behavior;
/// callers must not pre-strip country codes to compensate.
///
/// ```
/// use listing_desk::domain::phone::normalize;
///
/// assert_eq!(normalize("98733 12399"), "9873312399");
/// assert_eq!(normalize("+1 (987) 331-2399"), "19873312399");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Whether a normalized phone has enough digits to be worth looking up.
pub fn is_plausible(normalized: &str) -> bool {
    normalized.len() >= MIN_IDENTITY_DIGITS
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn normalize_strips_spaces_and_symbols() {
        assert_eq!(normalize("98733 12399"), "9873312399");
        assert_eq!(normalize("(987) 331-2399"), "9873312399");
    }

    #[test]
    fn normalize_keeps_country_code_digits() {
        // Distinct identities on purpose.
        assert_ne!(normalize("+1 9873312399"), normalize("9873312399"));
    }

    #[test]
    fn normalize_of_empty_is_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("---"), "");
    }

    #[test]
    fn plausibility_needs_six_digits() {
        assert!(!is_plausible("12345"));
        assert!(is_plausible("123456"));
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(s in ".*") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once.clone());
        }

        #[test]
        fn normalize_output_is_all_digits(s in ".*") {
            prop_assert!(normalize(&s).chars().all(|c| c.is_ascii_digit()));
        }
    }
}
