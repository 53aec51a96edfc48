use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::cache::token::Token;

/// Page-lifetime holder of the CSRF token.
///
/// Clones share the same slot, so the bootstrapper writes into the same
/// state every collaborator reads from. The slot moves `Unset -> Absent|Value`
/// at most once and never back.
#[derive(Debug, Clone, Default)]
pub struct TokenState {
    inner: Arc<RwLock<Token>>,
}

impl TokenState {
    pub fn new() -> Self {
        Self { inner: Arc::new(RwLock::new(Token::Unset)) }
    }

    /// Token value if one was stored
    pub async fn get(&self) -> Option<String> {
        self.inner.read().await.value().map(str::to_owned)
    }

    pub async fn snapshot(&self) -> Token {
        self.inner.read().await.clone()
    }

    /// True once the state left `Unset`
    pub async fn is_set(&self) -> bool {
        !self.inner.read().await.is_unset()
    }

    /// Single `Unset -> Set` transition
    pub async fn set(&self, token: Token) -> Result<()> {
        if token.is_unset() {
            return Err(anyhow!("refusing to store an unset token"));
        }
        let mut slot = self.inner.write().await;
        if !slot.is_unset() {
            return Err(anyhow!("csrf token already stored"));
        }
        *slot = token;
        Ok(())
    }
}
