use crate::{
    error::{Error, Result},
    tools::build_http_client,
};
use jsonwebtoken::{DecodingKey, jwk::JwkSet};
use std::time::Duration;
use tokio::{sync::RwLock, time::Instant};
use tracing::{debug, info};

/// How long a fetched key set is trusted before it is fetched again.
pub const JWKS_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);
/// Minimum gap between two fetches, whatever the tokens ask for.
pub const JWKS_REFETCH_COOLDOWN: Duration = Duration::from_secs(30);

struct CachedJwks {
    jwks:       JwkSet,
    fetched_at: Instant,
}

#[derive(Default)]
struct JwksState {
    cached:             Option<CachedJwks>,
    last_fetch_attempt: Option<Instant>,
}

impl JwksState {
    fn fresh(&self, ttl: Duration) -> Option<&JwkSet> {
        self.cached
            .as_ref()
            .filter(|c| c.fetched_at.elapsed() < ttl)
            .map(|c| &c.jwks)
    }

    fn cooling_down(&self, cooldown: Duration) -> bool {
        self.last_fetch_attempt
            .is_some_and(|at| at.elapsed() < cooldown)
    }
}

/// Fetches the identity provider's signing keys and keeps them for
/// [`JWKS_REFRESH_INTERVAL`].
pub struct JwksProvider {
    jwks_url: String,
    client:   reqwest::Client,
    ttl:      Duration,
    cooldown: Duration,
    state:    RwLock<JwksState>,
}

impl JwksProvider {
    pub fn new(jwks_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            jwks_url: jwks_url.into(),
            client:   build_http_client()?,
            ttl:      JWKS_REFRESH_INTERVAL,
            cooldown: JWKS_REFETCH_COOLDOWN,
            state:    RwLock::new(JwksState::default()),
        })
    }

    /// Provider for `https://{domain}/.well-known/jwks.json`.
    pub fn for_domain(domain: &str) -> Result<Self> {
        Self::new(format!("https://{domain}/.well-known/jwks.json"))
    }

    /// Decoding key for `kid`, or the first key when the token names none.
    ///
    /// An unknown `kid` triggers a refetch in case the provider rotated keys,
    /// at most once per [`JWKS_REFETCH_COOLDOWN`]. Concurrent callers share a
    /// single fetch.
    pub async fn key(&self, kid: Option<&str>) -> Result<DecodingKey> {
        {
            let state = self.state.read().await;
            if let Some(jwks) = state.fresh(self.ttl) {
                if let Some(key) = find_key(jwks, kid)? {
                    return Ok(key);
                }
                if state.cooling_down(self.cooldown) {
                    return Err(unknown_key());
                }
            }
        }

        let mut state = self.state.write().await;
        // someone else may have fetched while we waited for the lock
        if let Some(jwks) = state.fresh(self.ttl) {
            if let Some(key) = find_key(jwks, kid)? {
                return Ok(key);
            }
        }
        if state.cooling_down(self.cooldown) {
            let stale = match state.cached.as_ref() {
                Some(c) => find_key(&c.jwks, kid)?,
                None => None,
            };
            return stale.ok_or_else(unknown_key);
        }

        state.last_fetch_attempt = Some(Instant::now());
        let jwks = self.fetch().await?;
        let key = find_key(&jwks, kid)?;
        state.cached = Some(CachedJwks {
            jwks,
            fetched_at: Instant::now(),
        });
        key.ok_or_else(unknown_key)
    }

    async fn fetch(&self) -> Result<JwkSet> {
        debug!(url = %self.jwks_url, "fetching signing keys");
        let jwks: JwkSet = self
            .client
            .get(&self.jwks_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        info!(keys = jwks.keys.len(), "signing keys refreshed");
        Ok(jwks)
    }
}

fn unknown_key() -> Error {
    Error::Unauthorized("unknown signing key".into())
}

fn find_key(jwks: &JwkSet, kid: Option<&str>) -> Result<Option<DecodingKey>> {
    let jwk = match kid {
        Some(kid) => jwks.find(kid),
        None => jwks.keys.first(),
    };
    jwk.map(DecodingKey::from_jwk).transpose().map_err(Error::from)
}
