//! Caller identity. Authentication itself is delegated to the identity
//! provider; this module only answers "who is calling, if anyone".

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderName};
use anyhow::{Context, Result};

/// Stable id of an authenticated caller as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerId(pub String);

impl CallerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Resolves the current caller for a request, or `None` when unauthenticated.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_caller(&self, headers: &HeaderMap) -> Option<CallerId>;
}

/// Trusts a header set by the authenticating gateway in front of the API.
pub struct HeaderIdentityProvider {
    header: HeaderName,
}

impl HeaderIdentityProvider {
    pub fn new(header: &str) -> Result<Self> {
        let header = HeaderName::try_from(header.to_ascii_lowercase())
            .with_context(|| format!("'{header}' is not a valid header name"))?;
        Ok(Self { header })
    }
}

#[async_trait]
impl IdentityProvider for HeaderIdentityProvider {
    async fn current_caller(&self, headers: &HeaderMap) -> Option<CallerId> {
        let value = headers.get(&self.header)?.to_str().ok()?.trim();
        if value.is_empty() {
            return None;
        }
        Some(CallerId(value.to_string()))
    }
}
