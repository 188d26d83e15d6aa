//! # Text Normalization
//!
//! Slug-style normalization shared by place slugs and region keys.

/// Normalize free text into a URL-safe token.
///
/// Lowercases, maps every character outside `[a-z0-9]` to `-`, collapses
/// runs of `-`, and strips leading/trailing `-`. Returns an empty string
/// when nothing survives.
///
/// ```
/// use atlas_core::normalize_slug;
/// assert_eq!(normalize_slug("  Antalya Merkez "), "antalya-merkez");
/// assert_eq!(normalize_slug("TR / Aegean -- Region"), "tr-aegean-region");
/// ```
pub fn normalize_slug(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.trim().to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn collapses_whitespace_and_punctuation() {
        assert_eq!(normalize_slug("Kaleiçi  Old Town!"), "kalei-i-old-town");
        assert_eq!(normalize_slug("--a__b--"), "a-b");
        assert_eq!(normalize_slug("Mugla"), "mugla");
    }

    #[test]
    fn empty_when_nothing_survives() {
        assert_eq!(normalize_slug(""), "");
        assert_eq!(normalize_slug("   "), "");
        assert_eq!(normalize_slug("---"), "");
        assert_eq!(normalize_slug("çş"), "");
    }

    #[test]
    fn digits_are_kept() {
        assert_eq!(normalize_slug("Route 66"), "route-66");
    }

    proptest! {
        /// Normalizing twice equals normalizing once.
        #[test]
        fn normalization_is_idempotent(s in "\\PC{0,40}") {
            let once = normalize_slug(&s);
            prop_assert_eq!(normalize_slug(&once), once.clone());
        }

        /// Output only contains `[a-z0-9-]`, never starts/ends with `-`,
        /// and never contains `--`.
        #[test]
        fn output_alphabet_is_url_safe(s in "\\PC{0,40}") {
            let out = normalize_slug(&s);
            prop_assert!(out.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!out.starts_with('-') && !out.ends_with('-'));
            prop_assert!(!out.contains("--"));
        }
    }
}
