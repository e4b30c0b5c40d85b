use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{self, RngCore};

/// Random opaque session token made of `length` bytes, URL-safe encoded.
pub fn generate_token(length: usize) -> String {
    let mut buf = vec![0u8; length];
    rand::rng().fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn token_length_follows_byte_count() {
        // 4 output chars per 3 input bytes, no padding
        assert_eq!(generate_token(32).len(), 43);
        assert_eq!(generate_token(48).len(), 64);
    }

    #[test]
    fn tokens_are_url_safe_and_distinct() {
        let a = generate_token(32);
        let b = generate_token(32);
        assert_ne!(a, b);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }
}
