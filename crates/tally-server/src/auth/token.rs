//! One-time login tokens and the credentials they unlock.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tally_cache::ExpiringCache;
use uuid::Uuid;

/// Opaque, unguessable single-use login key.
///
/// Rendered as a lowercase hyphenated UUID. Parsing accepts any textual
/// UUID form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OneTimeToken(Uuid);

impl OneTimeToken {
    /// Generate a fresh random token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for OneTimeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

/// The `key` parameter was not a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("malformed login token")]
pub struct MalformedToken;

impl FromStr for OneTimeToken {
    type Err = MalformedToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::try_parse(s).map(Self).map_err(|_| MalformedToken)
    }
}

/// Username and secret for the external tracker, parked under a token
/// until it is redeemed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub secret: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Store
// ─────────────────────────────────────────────────────────────────────────────

/// Backing store for parked credentials.
///
/// `redeem` must be an atomic get-and-remove: for one token, at most one
/// caller ever receives the credential.
pub trait CredentialStore: Send + Sync {
    /// Park `credential` under `token` for `ttl`.
    fn stash(
        &self,
        token: OneTimeToken,
        credential: Credential,
        ttl: Duration,
    ) -> tally_cache::Result<()>;

    /// Take the credential for `token` if it is still redeemable.
    fn redeem(&self, token: &OneTimeToken) -> tally_cache::Result<Option<Credential>>;
}

impl CredentialStore for ExpiringCache<OneTimeToken, Credential> {
    fn stash(
        &self,
        token: OneTimeToken,
        credential: Credential,
        ttl: Duration,
    ) -> tally_cache::Result<()> {
        self.set(token, credential, ttl);
        Ok(())
    }

    fn redeem(&self, token: &OneTimeToken) -> tally_cache::Result<Option<Credential>> {
        Ok(self.take(token))
    }
}

/// Handle used by the minting side and the exchange to reach the store.
#[derive(Clone)]
pub struct LoginTokens {
    store: Arc<dyn CredentialStore>,
    ttl: Duration,
}

impl LoginTokens {
    /// Wrap a store; `ttl` applies to tokens created with [`mint`](Self::mint).
    pub fn new(store: Arc<dyn CredentialStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Lifetime of minted tokens.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Generate a fresh token and park `credential` under it.
    pub fn mint(&self, credential: Credential) -> tally_cache::Result<OneTimeToken> {
        let token = OneTimeToken::generate();
        let username = credential.username.clone();
        self.store.stash(token, credential, self.ttl)?;
        tracing::debug!(username = %username, ttl_secs = self.ttl.as_secs(), "Login token minted");
        Ok(token)
    }

    /// Park `credential` under a caller-chosen token.
    pub fn stash(
        &self,
        token: OneTimeToken,
        credential: Credential,
        ttl: Duration,
    ) -> tally_cache::Result<()> {
        self.store.stash(token, credential, ttl)
    }

    /// Redeem `token`. Unknown, expired and already used tokens all yield
    /// `Ok(None)`.
    pub fn redeem(&self, token: &OneTimeToken) -> tally_cache::Result<Option<Credential>> {
        self.store.redeem(token)
    }
}

impl fmt::Debug for LoginTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginTokens").field("ttl", &self.ttl).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_cache::CacheConfig;

    fn tokens(ttl: Duration) -> LoginTokens {
        let cache = ExpiringCache::new(CacheConfig::new().with_sweeper(false));
        LoginTokens::new(Arc::new(cache), ttl)
    }

    #[test]
    fn test_token_roundtrips_through_display() {
        let token = OneTimeToken::generate();
        let rendered = token.to_string();

        assert_eq!(rendered.len(), 36);
        assert_eq!(rendered, rendered.to_lowercase());
        assert_eq!(rendered.parse::<OneTimeToken>(), Ok(token));
    }

    #[test]
    fn test_tokens_are_distinct() {
        assert_ne!(OneTimeToken::generate(), OneTimeToken::generate());
    }

    #[test]
    fn test_parse_accepts_other_uuid_forms() {
        let token = OneTimeToken::generate();
        let simple = token.as_uuid().simple().to_string();
        let upper = token.to_string().to_uppercase();

        assert_eq!(simple.parse::<OneTimeToken>(), Ok(token));
        assert_eq!(upper.parse::<OneTimeToken>(), Ok(token));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "not-a-valid-token-format", "1234", "zzzzzzzz-zzzz-zzzz-zzzz-zzzzzzzzzzzz"] {
            assert_eq!(input.parse::<OneTimeToken>(), Err(MalformedToken), "{input:?}");
        }
    }

    #[test]
    fn test_credential_debug_redacts_secret() {
        let credential = Credential::new("alice", "s3cr3t");
        let debug = format!("{:?}", credential);

        assert!(debug.contains("alice"));
        assert!(!debug.contains("s3cr3t"));
    }

    #[test]
    fn test_mint_then_redeem_once() {
        let tokens = tokens(Duration::from_secs(300));
        let token = tokens.mint(Credential::new("alice", "s3cr3t")).unwrap();

        let credential = tokens.redeem(&token).unwrap().unwrap();
        assert_eq!(credential.username, "alice");
        assert_eq!(credential.secret, "s3cr3t");

        assert!(tokens.redeem(&token).unwrap().is_none());
    }

    #[test]
    fn test_unknown_token_not_redeemable() {
        let tokens = tokens(Duration::from_secs(300));
        assert!(tokens.redeem(&OneTimeToken::generate()).unwrap().is_none());
    }

    #[test]
    fn test_stash_with_zero_ttl_not_redeemable() {
        let tokens = tokens(Duration::from_secs(300));
        let token = OneTimeToken::generate();
        tokens
            .stash(token, Credential::new("alice", "s3cr3t"), Duration::ZERO)
            .unwrap();

        assert!(tokens.redeem(&token).unwrap().is_none());
    }
}
