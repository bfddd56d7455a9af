use anyhow::{Result, bail};
use api_server::{AuthConfig, CorsConfig};
use faststr::FastStr;
use std::{env, net::SocketAddr};

const DEFAULT_API_ADDR: &str = "0.0.0.0:8080";

/// Process configuration, read from the environment after `.env` is loaded.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_addr:     SocketAddr,
    pub database_url: Option<String>,
    pub redis_url:    Option<String>,
    pub auth:         AuthConfig,
    pub cors:         CorsConfig,
    pub seed_file:    Option<String>,
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(var)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_addr = lookup("API_ADDR")
            .unwrap_or_else(|| DEFAULT_API_ADDR.to_owned())
            .parse()?;

        let auth = match (lookup("AUTH0_DOMAIN"), lookup("JWT_SECRET")) {
            (Some(domain), _) => {
                let Some(audience) = lookup("AUTH0_AUDIENCE") else {
                    bail!("AUTH0_AUDIENCE must be set together with AUTH0_DOMAIN");
                };
                AuthConfig::Jwks {
                    domain:   domain.into(),
                    audience: audience.into(),
                }
            }
            (None, Some(secret)) => AuthConfig::SharedSecret {
                secret:   secret.into(),
                audience: lookup("AUTH0_AUDIENCE").map(FastStr::from),
            },
            (None, None) => bail!("set AUTH0_DOMAIN/AUTH0_AUDIENCE or JWT_SECRET"),
        };

        let cors = lookup("CORS_ALLOW_ORIGIN")
            .map(|origins| CorsConfig::from_origins(&origins))
            .unwrap_or_default();

        Ok(Self {
            api_addr,
            database_url: lookup("DATABASE_URL"),
            redis_url: lookup("REDIS_URL"),
            auth,
            cors,
            seed_file: lookup("SEED_FILE"),
        })
    }
}
