//! Chirp body validation and profanity masking

use crate::{ChirpyError, Result};

/// Maximum chirp body length in bytes
pub const MAX_CHIRP_LENGTH: usize = 140;

const PROFANE_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

const MASK: &str = "****";

/// Replace profane words with `****`
///
/// Words are split on single spaces and compared case-insensitively, so a
/// word with attached punctuation (`"Sharbert!"`) is left untouched.
pub fn clean_body(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            let lower = word.to_lowercase();
            if PROFANE_WORDS.contains(&lower.as_str()) {
                MASK
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Check the length limit and return the cleaned body
pub fn validate_chirp_body(body: &str) -> Result<String> {
    if body.len() > MAX_CHIRP_LENGTH {
        return Err(ChirpyError::ValidationError(
            "Chirp is too long".to_string(),
        ));
    }

    Ok(clean_body(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_body_masks_profanity() {
        assert_eq!(
            clean_body("I had something interesting for breakfast"),
            "I had something interesting for breakfast"
        );
        assert_eq!(
            clean_body("I hear Mastodon is better than Chirpy. sharbert I need to migrate"),
            "I hear Mastodon is better than Chirpy. **** I need to migrate"
        );
        assert_eq!(
            clean_body("I really need a kerfuffle to go to bed sooner, Fornax !"),
            "I really need a **** to go to bed sooner, **** !"
        );
    }

    #[test]
    fn test_clean_body_ignores_punctuated_words() {
        assert_eq!(clean_body("Sharbert!"), "Sharbert!");
    }

    #[test]
    fn test_clean_body_preserves_spacing() {
        assert_eq!(clean_body("a  fornax"), "a  ****");
    }

    #[test]
    fn test_validate_length_limit() {
        let at_limit = "a".repeat(MAX_CHIRP_LENGTH);
        assert_eq!(validate_chirp_body(&at_limit).unwrap(), at_limit);

        let too_long = "a".repeat(MAX_CHIRP_LENGTH + 1);
        let result = validate_chirp_body(&too_long);
        assert!(matches!(result, Err(ChirpyError::ValidationError(msg)) if msg == "Chirp is too long"));
    }
}
