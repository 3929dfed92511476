//! Session credit ledger for the speech-synthesis quota
//!
//! The provider is authoritative; this ledger is an optimistic local cache,
//! debited eagerly on success and corrected reactively from the provider's
//! own error text when a call is rejected for quota reasons.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::core::errors::{Result, StudioError};
use crate::core::models::QuotaState;

/// Characters of input text covered by one credit
const CHARS_PER_CREDIT: u64 = 10;

/// Quota-exhaustion errors embed the authoritative balance in this phrasing.
/// Extraction is best-effort; the upstream format is not a stable contract.
fn credits_remaining_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"You have (\d+) credits remaining").expect("valid credits pattern")
    })
}

/// Subscription status returned by the provider's quota endpoint
#[derive(Debug, Deserialize)]
struct SubscriptionStatus {
    character_limit: u64,
    character_count: u64,
}

/// Credit ledger shared by every component that spends speech quota
#[derive(Debug, Clone)]
pub struct QuotaLedger {
    state: Arc<RwLock<QuotaState>>,
}

impl QuotaLedger {
    /// Create a ledger with a full local budget
    pub fn new(max_credits: u64) -> Self {
        Self {
            state: Arc::new(RwLock::new(QuotaState::new(max_credits))),
        }
    }

    /// Local cost approximation: one credit per ten characters, minimum one.
    ///
    /// Conservative pre-check only; the provider does not expose exact
    /// per-call pricing ahead of time.
    pub fn estimate_cost(text: &str) -> u64 {
        (text.chars().count() as u64 / CHARS_PER_CREDIT).max(1)
    }

    /// Overwrite local state from the provider's subscription endpoint
    ///
    /// On a non-success response the ledger is left unchanged and
    /// `RemoteUnavailable` is returned; callers fall back to the default
    /// local budget rather than aborting the session.
    pub async fn refresh_from_remote(
        &self,
        client: &reqwest::Client,
        speech_endpoint: &str,
        api_key: &str,
    ) -> Result<QuotaState> {
        let url = format!("{}/v1/user/subscription", speech_endpoint);
        let response = client
            .get(&url)
            .header("xi-api-key", api_key)
            .send()
            .await
            .map_err(|e| StudioError::RemoteUnavailable {
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StudioError::RemoteUnavailable { message });
        }

        let status: SubscriptionStatus =
            response
                .json()
                .await
                .map_err(|e| StudioError::RemoteUnavailable {
                    message: e.to_string(),
                })?;

        let mut state = self.state.write().await;
        state.credits_used = status.character_count;
        state.credits_remaining = status.character_limit.saturating_sub(status.character_count);
        info!(
            used = state.credits_used,
            remaining = state.credits_remaining,
            "Refreshed quota from provider"
        );
        Ok(state.clone())
    }

    /// Check that `cost` fits in the remaining balance
    ///
    /// Must be consulted before any remote synthesis call; a refusal means
    /// the provider is never contacted for that request.
    pub async fn reserve(&self, cost: u64) -> bool {
        let state = self.state.read().await;
        let ok = state.can_reserve(cost);
        if !ok {
            debug!(
                required = cost,
                remaining = state.credits_remaining,
                "Credit reservation refused"
            );
        }
        ok
    }

    /// Record a confirmed successful synthesis spend
    pub async fn commit(&self, cost: u64) {
        let mut state = self.state.write().await;
        state.debit(cost);
        debug!(
            charged = cost,
            remaining = state.credits_remaining,
            "Committed credits"
        );
    }

    /// Resynchronize from a quota-exhaustion error message
    ///
    /// Returns true when an authoritative balance was recovered and applied;
    /// on no match the ledger is left untouched and the caller surfaces the
    /// message verbatim.
    pub async fn reconcile_from_error(&self, error_text: &str) -> bool {
        let recovered = credits_remaining_pattern()
            .captures(error_text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u64>().ok());

        match recovered {
            Some(remaining) => {
                let mut state = self.state.write().await;
                state.credits_remaining = remaining;
                warn!(remaining, "Reconciled ledger from provider error");
                true
            }
            None => {
                warn!("Provider error carried no parseable credit count");
                false
            }
        }
    }

    /// Copy of the current state for display surfaces
    pub async fn snapshot(&self) -> QuotaState {
        self.state.read().await.clone()
    }

    /// Current remaining balance
    pub async fn remaining(&self) -> u64 {
        self.state.read().await.credits_remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_cost_formula() {
        assert_eq!(QuotaLedger::estimate_cost(""), 1);
        assert_eq!(QuotaLedger::estimate_cost("short"), 1);
        assert_eq!(QuotaLedger::estimate_cost(&"x".repeat(10)), 1);
        assert_eq!(QuotaLedger::estimate_cost(&"x".repeat(19)), 1);
        assert_eq!(QuotaLedger::estimate_cost(&"x".repeat(100)), 10);
        assert_eq!(QuotaLedger::estimate_cost(&"x".repeat(105)), 10);
    }

    #[test]
    fn test_estimate_cost_counts_characters_not_bytes() {
        // Devanagari is multi-byte; pricing follows characters
        let hindi = "नमस्ते दुनिया, आज का दिन अच्छा है";
        assert_eq!(
            QuotaLedger::estimate_cost(hindi),
            (hindi.chars().count() as u64 / 10).max(1)
        );
    }

    #[tokio::test]
    async fn test_reserve_and_commit() {
        let ledger = QuotaLedger::new(100);

        assert!(ledger.reserve(100).await);
        ledger.commit(30).await;

        let state = ledger.snapshot().await;
        assert_eq!(state.credits_used, 30);
        assert_eq!(state.credits_remaining, 70);

        assert!(!ledger.reserve(71).await);
        assert!(ledger.reserve(70).await);
        ledger.commit(70).await;
        assert_eq!(ledger.remaining().await, 0);
    }

    #[tokio::test]
    async fn test_remaining_never_negative() {
        let ledger = QuotaLedger::new(5);
        assert!(!ledger.reserve(10).await);
        // A stray commit larger than the balance still saturates at zero
        ledger.commit(10).await;
        assert_eq!(ledger.remaining().await, 0);
    }

    #[tokio::test]
    async fn test_reconcile_overwrites_remaining() {
        let ledger = QuotaLedger::new(10_000);
        let message = "quota_exceeded: You have 437 credits remaining.";

        assert!(ledger.reconcile_from_error(message).await);
        assert_eq!(ledger.remaining().await, 437);
    }

    #[tokio::test]
    async fn test_reconcile_to_zero() {
        let ledger = QuotaLedger::new(10_000);
        assert!(
            ledger
                .reconcile_from_error("You have 0 credits remaining")
                .await
        );
        assert_eq!(ledger.remaining().await, 0);
    }

    #[tokio::test]
    async fn test_reconcile_leaves_state_on_unparseable_message() {
        let ledger = QuotaLedger::new(10_000);
        ledger.commit(100).await;

        assert!(!ledger.reconcile_from_error("quota_exceeded: upgrade your plan").await);

        let state = ledger.snapshot().await;
        assert_eq!(state.credits_remaining, 9_900);
        assert_eq!(state.credits_used, 100);
    }

    #[tokio::test]
    async fn test_refresh_failure_leaves_state() {
        let ledger = QuotaLedger::new(10_000);
        let client = reqwest::Client::new();

        // Unroutable endpoint: the refresh fails, the local budget stands
        let result = ledger
            .refresh_from_remote(&client, "http://127.0.0.1:9", "key")
            .await;

        assert!(matches!(result, Err(StudioError::RemoteUnavailable { .. })));
        assert_eq!(ledger.remaining().await, 10_000);
    }
}
