//! OCR label cleanup applied before any token comparison.

use unicode_normalization::UnicodeNormalization;

/// NFKC-fold, unify dash variants to `-`, and trim.
///
/// NFKC turns full-width digits and colons (`０８：３０`) into ASCII, which
/// scanned Asian-locale timetables produce often.
pub fn normalize_label(text: &str) -> String {
    text.nfkc()
        .map(|c| match c {
            '\u{2010}'..='\u{2015}' | '\u{2212}' => '-',
            other => other,
        })
        .collect::<String>()
        .trim()
        .to_string()
}
