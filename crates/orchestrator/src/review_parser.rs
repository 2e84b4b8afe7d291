use regex::Regex;
use studio_core::Review;
use tracing::debug;

/// Rating used when the response has no readable rating.
pub const DEFAULT_RATING: u8 = 7;

/// Critique used when the response has no feedback section.
pub const DEFAULT_FEEDBACK: &str =
    "Script needs stronger character development and more compelling plot twists.";

const RATING_MARKER: &str = "RATING";
const FEEDBACK_MARKER: &str = "FEEDBACK:";

pub struct ReviewParser;

impl ReviewParser {
    /// Extract a rating and feedback from a free-text review.
    ///
    /// Never fails: missing pieces fall back to [`DEFAULT_RATING`] and
    /// [`DEFAULT_FEEDBACK`] and are flagged on the returned [`Review`].
    pub fn parse(content: &str) -> Review {
        let rating = Self::extract_rating(content);
        let feedback = Self::extract_feedback(content);

        debug!(
            rating = ?rating,
            has_feedback = feedback.is_some(),
            "Parsed review response"
        );

        Review {
            rating: rating.unwrap_or(DEFAULT_RATING),
            rating_defaulted: rating.is_none(),
            feedback_defaulted: feedback.is_none(),
            feedback: feedback.unwrap_or_else(|| DEFAULT_FEEDBACK.to_string()),
        }
    }

    /// Leading digit run (at most two digits) of the first line mentioning
    /// the rating marker, clamped to 1..=10.
    pub fn extract_rating(content: &str) -> Option<u8> {
        let line = content
            .lines()
            .find(|line| line.to_uppercase().contains(RATING_MARKER))?;

        let digits = Regex::new(r"\d{1,2}").ok()?.find(line)?;
        let value: u8 = digits.as_str().parse().ok()?;
        Some(value.clamp(1, 10))
    }

    /// Text after the first feedback marker, trimmed. `None` only when the
    /// marker is absent; an empty section yields an empty string.
    pub fn extract_feedback(content: &str) -> Option<String> {
        let (_, rest) = content.split_once(FEEDBACK_MARKER)?;
        Some(rest.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed_review() {
        let review = ReviewParser::parse("RATING: 8\nFEEDBACK: Strong hook, weak ending.");
        assert_eq!(review, Review::parsed(8, "Strong hook, weak ending."));
    }

    #[test]
    fn test_rating_clamped_high() {
        assert_eq!(ReviewParser::extract_rating("RATING: 15"), Some(10));
        assert_eq!(ReviewParser::extract_rating("RATING: 100"), Some(10));
    }

    #[test]
    fn test_rating_out_of_ten_uses_leading_run() {
        assert_eq!(ReviewParser::extract_rating("RATING: 8/10"), Some(8));
        assert_eq!(ReviewParser::extract_rating("Rating: 10/10"), Some(10));
    }

    #[test]
    fn test_rating_clamped_low() {
        assert_eq!(ReviewParser::extract_rating("RATING: 0"), Some(1));
    }

    #[test]
    fn test_rating_without_digits_defaults() {
        let review = ReviewParser::parse("RATING: abc\nFEEDBACK: Fine.");
        assert_eq!(review.rating, 7);
        assert!(review.rating_defaulted);
        assert!(!review.feedback_defaulted);
    }

    #[test]
    fn test_rating_line_is_case_insensitive() {
        assert_eq!(ReviewParser::extract_rating("Overall rating - 6/10"), Some(6));
        assert_eq!(ReviewParser::extract_rating("**Rating:** 9"), Some(9));
    }

    #[test]
    fn test_first_rating_line_wins() {
        let content = "Intro\nRATING: 4\nRevised RATING: 9";
        assert_eq!(ReviewParser::extract_rating(content), Some(4));
    }

    #[test]
    fn test_missing_rating_line_defaults() {
        let review = ReviewParser::parse("Looks good to me.");
        assert_eq!(review.rating, DEFAULT_RATING);
        assert!(review.rating_defaulted);
    }

    #[test]
    fn test_feedback_extraction_trims() {
        let content = "RATING: 5\nFEEDBACK: Needs better pacing.   \n";
        assert_eq!(
            ReviewParser::extract_feedback(content),
            Some("Needs better pacing.".to_string())
        );
    }

    #[test]
    fn test_feedback_splits_on_first_marker() {
        let content = "FEEDBACK: first part FEEDBACK: second part";
        assert_eq!(
            ReviewParser::extract_feedback(content),
            Some("first part FEEDBACK: second part".to_string())
        );
    }

    #[test]
    fn test_missing_feedback_uses_generic_critique() {
        let review = ReviewParser::parse("RATING: 6");
        assert_eq!(review.feedback, DEFAULT_FEEDBACK);
        assert!(review.feedback_defaulted);
        assert!(!review.rating_defaulted);
    }

    #[test]
    fn test_empty_feedback_section_is_kept_empty() {
        let review = ReviewParser::parse("RATING: 8/10\nFEEDBACK:   ");
        assert_eq!(review.rating, 8);
        assert_eq!(review.feedback, "");
        assert!(!review.feedback_defaulted);
    }
}
