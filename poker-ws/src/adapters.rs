//! External collaborators the session coordinator consults but never
//! embeds (spec.md §1, §4.8): identity and the player's wallet. The
//! teacher's `main.rs` has no real auth layer and instead hands every
//! session a synthetic id derived from its `client_msg_id`; these stub
//! implementations follow that same "runnable with zero configuration"
//! shape while the traits give a real implementation somewhere to plug in.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub player_id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("no identity for token")]
    Unknown,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum WalletError {
    #[error("insufficient balance")]
    InsufficientBalance,
}

pub trait IdentityResolver: Send + Sync {
    fn resolve(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<Identity, AuthError>> + Send;
}

pub trait WalletAdapter: Send + Sync {
    fn reserve(
        &self,
        player_id: &str,
        amount: u64,
    ) -> impl std::future::Future<Output = Result<(), WalletError>> + Send;

    fn credit(
        &self,
        player_id: &str,
        amount: u64,
    ) -> impl std::future::Future<Output = Result<(), WalletError>> + Send;

    fn rake_contribution(
        &self,
        hand_id: u64,
        per_seat_shares: &[(String, u64)],
    ) -> impl std::future::Future<Output = Result<(), WalletError>> + Send;
}

/// Treats the token itself as the player id, and the first 32 bytes as a
/// readable display name — enough to run the server standalone, same as
/// the teacher's "no real accounts yet" posture.
#[derive(Debug, Default)]
pub struct StubIdentityResolver;

impl IdentityResolver for StubIdentityResolver {
    async fn resolve(&self, token: &str) -> Result<Identity, AuthError> {
        if token.is_empty() {
            return Err(AuthError::Unknown);
        }
        Ok(Identity {
            player_id: token.to_string(),
            display_name: token.chars().take(32).collect(),
        })
    }
}

/// In-memory balances, unlimited by default so the demo server never
/// rejects a buy-in; real deployments swap this for a persistent adapter.
#[derive(Debug, Default)]
pub struct StubWalletAdapter {
    balances: Mutex<HashMap<String, u64>>,
}

impl StubWalletAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WalletAdapter for StubWalletAdapter {
    async fn reserve(&self, player_id: &str, amount: u64) -> Result<(), WalletError> {
        let mut balances = self.balances.lock().unwrap();
        let entry = balances.entry(player_id.to_string()).or_insert(u64::MAX / 2);
        *entry = entry.checked_sub(amount).ok_or(WalletError::InsufficientBalance)?;
        Ok(())
    }

    async fn credit(&self, player_id: &str, amount: u64) -> Result<(), WalletError> {
        let mut balances = self.balances.lock().unwrap();
        let entry = balances.entry(player_id.to_string()).or_insert(0);
        *entry = entry.saturating_add(amount);
        Ok(())
    }

    async fn rake_contribution(
        &self,
        _hand_id: u64,
        _per_seat_shares: &[(String, u64)],
    ) -> Result<(), WalletError> {
        Ok(())
    }
}
