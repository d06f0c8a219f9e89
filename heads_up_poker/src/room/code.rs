//! Room code generation and canonicalization.

use rand::Rng;

use crate::game::constants::{ROOM_CODE_ALPHABET, ROOM_CODE_LENGTH};

/// Generate a random room code. The alphabet drops the lookalike characters
/// `0`, `O`, `1` and `I` so codes survive being read out loud.
#[must_use]
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    (0..ROOM_CODE_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..ROOM_CODE_ALPHABET.len());
            ROOM_CODE_ALPHABET[idx] as char
        })
        .collect()
}

/// Uppercase is canonical; lookups accept any casing.
#[must_use]
pub fn normalize(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

#[must_use]
pub fn is_valid(code: &str) -> bool {
    code.len() == ROOM_CODE_LENGTH
        && code.bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_codes_are_valid() {
        for _ in 0..64 {
            let code = generate();
            assert_eq!(code.len(), ROOM_CODE_LENGTH);
            assert!(is_valid(&code), "bad code {code}");
        }
    }

    #[test]
    fn test_normalize_uppercases() {
        assert_eq!(normalize("abc23"), "ABC23");
        assert_eq!(normalize(" xYz45 "), "XYZ45");
    }

    #[test]
    fn test_lookalike_characters_rejected() {
        assert!(!is_valid("ABC0D"));
        assert!(!is_valid("ABCO1"));
        assert!(!is_valid("ABCDI"));
        assert!(!is_valid("AB23"));
        assert!(is_valid("AB234"));
    }
}
