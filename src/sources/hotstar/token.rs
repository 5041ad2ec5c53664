use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Akamai edge-auth key shared by the hotstar web clients.
pub const AKAMAI_ENCRYPTION_KEY: [u8; 16] = [
    0x05, 0xfc, 0x1a, 0x01, 0xca, 0xc9, 0x4b, 0xc4, 0x12, 0xfc, 0x53, 0x12, 0x07, 0x75, 0xf9, 0xee,
];

/// Seconds a token stays valid after issuance.
pub const TOKEN_WINDOW_SECS: u64 = 6000;

const ACL_WILDCARD: &str = "/*";

/// A signed `hotstarauth` value. Built fresh for every API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub issued_at: u64,
    pub expires_at: u64,
    pub acl: &'static str,
    pub hmac: String,
}

impl AuthToken {
    /// The signed part: everything before `~hmac=`.
    pub fn unsigned(&self) -> String {
        format!("st={}~exp={}~acl={}", self.issued_at, self.expires_at, self.acl)
    }
}

impl std::fmt::Display for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}~hmac={}", self.unsigned(), self.hmac)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TokenSigner {
    key: &'static [u8],
}

impl Default for TokenSigner {
    fn default() -> Self {
        Self::new(&AKAMAI_ENCRYPTION_KEY)
    }
}

impl TokenSigner {
    pub const fn new(key: &'static [u8]) -> Self {
        Self { key }
    }

    pub fn sign(&self, now: u64) -> AuthToken {
        let mut token = AuthToken {
            issued_at: now,
            expires_at: now.saturating_add(TOKEN_WINDOW_SECS),
            acl: ACL_WILDCARD,
            hmac: String::new(),
        };

        let mut mac =
            HmacSha256::new_from_slice(self.key).expect("HMAC can take key of any size");
        mac.update(token.unsigned().as_bytes());
        token.hmac = hex::encode(mac.finalize().into_bytes());
        token
    }

    pub fn sign_now(&self) -> AuthToken {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        self.sign(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_layout_and_window() {
        let token = TokenSigner::default().sign(1_600_000_000);
        assert_eq!(token.expires_at, 1_600_006_000);
        let rendered = token.to_string();
        assert!(rendered.starts_with("st=1600000000~exp=1600006000~acl=/*~hmac="));
        assert_eq!(token.hmac.len(), 64);
        assert!(token.hmac.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn signature_verifies_independently() {
        for now in [0u64, 1, 1_447_248_600, 1_700_000_123] {
            let token = TokenSigner::default().sign(now);
            assert_eq!(token.expires_at, now + TOKEN_WINDOW_SECS);

            let mut mac = HmacSha256::new_from_slice(&AKAMAI_ENCRYPTION_KEY).unwrap();
            mac.update(format!("st={}~exp={}~acl=/*", now, now + 6000).as_bytes());
            let expected = hex::decode(&token.hmac).unwrap();
            assert!(mac.verify_slice(&expected).is_ok());
        }
    }

    #[test]
    fn expiry_saturates_at_the_end_of_time() {
        let token = TokenSigner::default().sign(u64::MAX - 10);
        assert_eq!(token.expires_at, u64::MAX);
        assert!(token.to_string().contains(&format!("~exp={}~", u64::MAX)));
    }

    #[test]
    fn different_keys_give_different_signatures() {
        static OTHER: [u8; 4] = [1, 2, 3, 4];
        let a = TokenSigner::default().sign(42);
        let b = TokenSigner::new(&OTHER).sign(42);
        assert_eq!(a.unsigned(), b.unsigned());
        assert_ne!(a.hmac, b.hmac);
    }
}
