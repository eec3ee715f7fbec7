use unicode_normalization::UnicodeNormalization;
use unicode_properties::{GeneralCategory, UnicodeGeneralCategory};

/// Turns an arbitrary display string into an identifier fragment.
///
/// Lower-cases, strips diacritics (nonspacing marks only) and maps
/// everything outside `[a-zA-Z0-9_]` to `_`.
pub fn sanitize_text(input: &str) -> String {
    input
        .to_lowercase()
        .nfd()
        .filter(|c| c.general_category() != GeneralCategory::NonspacingMark)
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
