//! StaticIdentityProvider - session token → identity の固定テーブル
//!
//! Development stand-in for a real login system.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::Identity;
use crate::ports::{IdentityProvider, RequestContext};

#[derive(Default)]
pub struct StaticIdentityProvider {
    sessions: RwLock<HashMap<String, Identity>>,
}

impl StaticIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, token: impl Into<String>, identity: Identity) {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions.insert(token.into(), identity);
    }

    pub fn sign_out(&self, token: &str) {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions.remove(token);
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn resolve(&self, ctx: &RequestContext) -> Option<Identity> {
        let token = ctx.session_token.as_deref()?;
        let sessions = self.sessions.read().unwrap_or_else(|e| e.into_inner());
        sessions.get(token).copied()
    }
}
