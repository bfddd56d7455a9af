mod jwks;

pub use jwks::{JWKS_REFETCH_COOLDOWN, JWKS_REFRESH_INTERVAL, JwksProvider};

use crate::{
    error::{Error, Result},
    tools::bearer_token,
};
use faststr::FastStr;
use http::{Method, header::AUTHORIZATION};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};
use volo_http::{
    context::ServerContext,
    request::Request,
    response::Response,
    server::{IntoResponse, middleware::Next},
    utils::Extension,
};

/// Where token signatures are checked against.
#[derive(Debug, Clone)]
pub enum AuthConfig {
    /// RS256 keys from `https://{domain}/.well-known/jwks.json`, with issuer
    /// `https://{domain}/`.
    Jwks { domain: FastStr, audience: FastStr },
    /// HS256 with a shared secret, for local runs.
    SharedSecret { secret: FastStr, audience: Option<FastStr> },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub sub:   FastStr,
    #[serde(default)]
    pub scope: Option<FastStr>,
}

enum KeySource {
    Jwks(JwksProvider),
    Static(DecodingKey),
}

pub struct Authenticator {
    keys:       KeySource,
    validation: Validation,
}

impl Authenticator {
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        match config {
            AuthConfig::Jwks { domain, audience } => Self::jwks(domain, audience),
            AuthConfig::SharedSecret { secret, audience } => {
                Ok(Self::shared_secret(secret.as_bytes(), audience.as_deref()))
            }
        }
    }

    pub fn jwks(domain: &str, audience: &str) -> Result<Self> {
        let issuer = format!("https://{domain}/");
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_audience(&[audience]);

        info!(%issuer, audience, "validating tokens against identity provider keys");
        Ok(Self {
            keys: KeySource::Jwks(JwksProvider::for_domain(domain)?),
            validation,
        })
    }

    pub fn shared_secret(secret: &[u8], audience: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }
        Self {
            keys: KeySource::Static(DecodingKey::from_secret(secret)),
            validation,
        }
    }

    /// Validates the `Authorization` header value and returns the token claims.
    pub async fn authorize(&self, header: Option<&str>) -> Result<Claims> {
        let token = header
            .and_then(bearer_token)
            .ok_or(Error::Unauthorized("missing bearer token".into()))?;

        let key = match &self.keys {
            KeySource::Static(key) => key.clone(),
            KeySource::Jwks(provider) => {
                let header = decode_header(token)?;
                provider.key(header.kid.as_deref()).await?
            }
        };
        Ok(decode::<Claims>(token, &key, &self.validation)?.claims)
    }
}

#[inline]
fn needs_auth(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::DELETE)
}

/// Rejects mutating requests that do not carry a valid bearer token.
pub async fn require_auth(
    Extension(auth): Extension<Arc<Authenticator>>,
    cx: &mut ServerContext,
    req: Request,
    next: Next,
) -> Response {
    if !needs_auth(req.method()) {
        return next.run(cx, req).await.into_response();
    }

    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let authorized = auth.authorize(header).await;
    match authorized {
        Ok(claims) => {
            debug!(sub = %claims.sub, method = %req.method(), "request authorized");
            next.run(cx, req).await.into_response()
        }
        Err(e) => e.into_response(),
    }
}
