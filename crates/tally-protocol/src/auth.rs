use serde::{Deserialize, Serialize};

/// Header carrying the static service token on every request.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// A pre-shared service token. Caller identity beyond this is opaque and
/// validated upstream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceToken(String);

impl ServiceToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn matches(&self, presented: &str) -> bool {
        // Constant-time comparison; token lengths are not secret.
        let expected = self.0.as_bytes();
        let presented = presented.as_bytes();
        if expected.len() != presented.len() {
            return false;
        }
        expected
            .iter()
            .zip(presented)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_token_passes() {
        let token = ServiceToken::new("s3cr3t");
        assert!(token.matches("s3cr3t"));
    }

    #[test]
    fn wrong_token_fails() {
        let token = ServiceToken::new("s3cr3t");
        assert!(!token.matches("s3cr3u"));
        assert!(!token.matches("s3cr3t-long"));
        assert!(!token.matches(""));
    }
}
