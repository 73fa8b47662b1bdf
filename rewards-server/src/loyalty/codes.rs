//! Voucher and presentation code generation

use rand::Rng;

/// Unambiguous alphabet: no `0/O`, no `1/I`
pub const CODE_ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of each half of a voucher code (`XXXX-XXXX`)
const VOUCHER_CODE_GROUP: usize = 4;

pub const PRESENTATION_CODE_LEN: usize = 6;

/// Bounded retries when a generated code collides
pub const MAX_CODE_ATTEMPTS: usize = 8;

fn random_symbols(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Long-lived voucher code, `XXXX-XXXX`
pub fn generate_voucher_code() -> String {
    format!(
        "{}-{}",
        random_symbols(VOUCHER_CODE_GROUP),
        random_symbols(VOUCHER_CODE_GROUP)
    )
}

/// Short-lived code shown at the point of sale
pub fn generate_presentation_code() -> String {
    random_symbols(PRESENTATION_CODE_LEN)
}

/// Uppercase and strip whitespace from staff-typed codes
pub fn normalize_code(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

pub fn is_presentation_code(code: &str) -> bool {
    code.len() == PRESENTATION_CODE_LEN && code.bytes().all(|b| CODE_ALPHABET.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_voucher_code_format() {
        for _ in 0..100 {
            let code = generate_voucher_code();
            assert_eq!(code.len(), 9);
            let (left, right) = code.split_once('-').unwrap();
            assert_eq!(left.len(), 4);
            assert_eq!(right.len(), 4);
            assert!(
                left.bytes()
                    .chain(right.bytes())
                    .all(|b| CODE_ALPHABET.contains(&b))
            );
        }
    }

    #[test]
    fn test_alphabet_has_no_ambiguous_symbols() {
        let set: HashSet<u8> = CODE_ALPHABET.iter().copied().collect();
        assert_eq!(set.len(), 32);
        for ambiguous in [b'0', b'O', b'1', b'I'] {
            assert!(!set.contains(&ambiguous));
        }
    }

    #[test]
    fn test_presentation_code() {
        let code = generate_presentation_code();
        assert!(is_presentation_code(&code));
        assert!(!is_presentation_code("ABC"));
        assert!(!is_presentation_code("ABCDE0"));
    }

    #[test]
    fn test_codes_rarely_collide() {
        let codes: HashSet<String> = (0..1000).map(|_| generate_voucher_code()).collect();
        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code(" k7q x2m "), "K7QX2M");
        assert_eq!(normalize_code("abcd-efgh"), "ABCD-EFGH");
    }
}
