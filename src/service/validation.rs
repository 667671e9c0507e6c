//! Post content validation

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::FieldErrors;

/// Minimum post length in UTF-16 code units
pub const MIN_CONTENT_CHARS: usize = 1;
/// Maximum post length in UTF-16 code units
pub const MAX_CONTENT_CHARS: usize = 280;

lazy_static! {
    static ref EMOJI_ONLY: Regex =
        Regex::new(r"^(\p{Extended_Pictographic}|\p{Emoji_Component})+$")
            .expect("emoji pattern compiles");
}

/// True when `content` consists solely of emoji characters
///
/// Emoji components (ZWJ, variation selectors, skin tones, keycap bases,
/// regional indicators) are accepted so composed sequences pass.
pub fn is_emoji_only(content: &str) -> bool {
    EMOJI_ONLY.is_match(content)
}

/// Validate post content, collecting every failed rule under `content`
pub fn validate_content(content: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    // Lengths are UTF-16 code units; most emoji take two.
    let length = content.encode_utf16().count();

    if !is_emoji_only(content) {
        errors.add("content", "Invalid emoji");
    }
    if length < MIN_CONTENT_CHARS {
        errors.add(
            "content",
            format!("String must contain at least {MIN_CONTENT_CHARS} character(s)"),
        );
    }
    if length > MAX_CONTENT_CHARS {
        errors.add(
            "content",
            format!("String must contain at most {MAX_CONTENT_CHARS} character(s)"),
        );
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_emoji() {
        for content in ["😀", "🦀🦀🦀", "👍🏽", "👨‍👩‍👧", "🇯🇵", "❤️", "✨🔥💯"] {
            assert!(validate_content(content).is_ok(), "{content} should pass");
        }
    }

    #[test]
    fn accepts_bounds() {
        assert!(validate_content("😀").is_ok());
        assert!(validate_content(&"😀".repeat(MAX_CONTENT_CHARS / 2)).is_ok());
        // U+2728 is a single code unit
        assert!(validate_content(&"✨".repeat(MAX_CONTENT_CHARS)).is_ok());
    }

    #[test]
    fn rejects_text() {
        for content in ["hello", "hi 😀", "😀 ", "😀a", "<p>😀</p>"] {
            let errors = validate_content(content).expect_err(content);
            assert_eq!(errors.field("content"), ["Invalid emoji".to_string()]);
        }
    }

    #[test]
    fn rejects_empty_with_every_failed_rule() {
        let errors = validate_content("").unwrap_err();
        assert_eq!(
            errors.field("content"),
            [
                "Invalid emoji".to_string(),
                "String must contain at least 1 character(s)".to_string(),
            ]
        );
    }

    #[test]
    fn rejects_too_long() {
        let errors = validate_content(&"✨".repeat(MAX_CONTENT_CHARS + 1)).unwrap_err();
        assert_eq!(
            errors.field("content"),
            ["String must contain at most 280 character(s)".to_string()]
        );
    }

    #[test]
    fn astral_emoji_count_twice() {
        // 141 × 2 code units = 282
        let errors = validate_content(&"🔥".repeat(141)).unwrap_err();
        assert_eq!(
            errors.field("content"),
            ["String must contain at most 280 character(s)".to_string()]
        );
        assert!(validate_content(&"🔥".repeat(280)).is_err());
    }

    #[test]
    fn long_text_reports_both_rules() {
        let errors = validate_content(&"a".repeat(300)).unwrap_err();
        assert_eq!(errors.field("content").len(), 2);
    }
}
