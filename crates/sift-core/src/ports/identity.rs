//! IdentityProvider port - リクエストから (role, identity) を解決
//!
//! Authentication happens outside the engine. Whatever the provider returns
//! is trusted as-is.

use async_trait::async_trait;

use crate::domain::Identity;

/// What the outer layer knows about an incoming request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub session_token: Option<String>,
}

impl RequestContext {
    pub fn with_session(token: impl Into<String>) -> Self {
        Self {
            session_token: Some(token.into()),
        }
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `None` for anonymous or unknown requests.
    async fn resolve(&self, ctx: &RequestContext) -> Option<Identity>;
}
