use std::sync::Mutex;

use async_trait::async_trait;

use super::TokenStoreTrait;
use crate::errors::{DatabaseError, Error, Result};

/// In-memory token store.
///
/// Keeps tokens in insertion order and records every removal request, which
/// makes it the store of choice for tests and local dry runs.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Vec<String>>,
    removed: Mutex<Vec<String>>,
    fail_reads: bool,
}

impl MemoryTokenStore {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: Mutex::new(tokens.into_iter().map(Into::into).collect()),
            removed: Mutex::new(Vec::new()),
            fail_reads: false,
        }
    }

    /// A store whose `list_tokens` always fails.
    pub fn unavailable() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    /// Tokens still on file.
    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }

    /// Every token passed to `remove_token`, in call order.
    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenStoreTrait for MemoryTokenStore {
    async fn list_tokens(&self) -> Result<Vec<String>> {
        if self.fail_reads {
            return Err(Error::Database(DatabaseError::QueryFailed(
                "token store unavailable".to_string(),
            )));
        }
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .filter(|t| !t.is_empty())
            .cloned()
            .collect())
    }

    async fn remove_token(&self, token: &str) -> Result<u64> {
        self.removed.lock().unwrap().push(token.to_string());
        let mut tokens = self.tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|t| t != token);
        Ok((before - tokens.len()) as u64)
    }
}
