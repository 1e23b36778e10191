use chrono::Utc;
use sha2::{Digest, Sha256};

const API_SECRET: &str = "Stockhub";

// Recomputed per request so a session running across UTC midnight
// picks up the rotated value.
pub fn auth_token() -> String {
    token_for_day(&Utc::now().format("%Y%m%d").to_string())
}

fn token_for_day(day: &str) -> String {
    hex::encode(Sha256::digest(format!("{API_SECRET}_{day}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_for_known_day() {
        assert_eq!(
            token_for_day("20240101"),
            "2cfd34a3e64bc2849dc0463d414affef3e9073833e79657f075b975fa45ba695"
        );
    }

    #[test]
    fn test_token_rotates_with_day() {
        assert_ne!(token_for_day("20240101"), token_for_day("20240102"));
    }

    #[test]
    fn test_token_shape() {
        let token = auth_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
