use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::DomainResult;

/// Default minimum time a device must wait between status-change actions.
pub const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(10);

/// Per (device, action) throttle deciding whether an action may proceed now.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActionRateLimiter: Send + Sync {
    /// Whether the action may proceed. A `true` result also records now as
    /// the last allowed instant for the key; check-and-record is one atomic
    /// step, so two concurrent calls for the same key cannot both pass.
    async fn is_allowed(&self, device_id: &str, action_key: &str) -> DomainResult<bool>;
}

/// In-memory implementation keyed by (device_id, action_key).
///
/// Only allowed actions are recorded; a denial neither resets nor extends
/// the window. Entries are never removed (bounded by device cardinality).
pub struct InMemoryRateLimiter {
    window: Duration,
    last_allowed: Mutex<HashMap<(String, String), Instant>>,
}

impl InMemoryRateLimiter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_allowed: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_LIMIT_WINDOW)
    }
}

#[async_trait]
impl ActionRateLimiter for InMemoryRateLimiter {
    async fn is_allowed(&self, device_id: &str, action_key: &str) -> DomainResult<bool> {
        let key = (device_id.to_string(), action_key.to_string());

        let mut last_allowed = self.last_allowed.lock().await;

        if let Some(last) = last_allowed.get(&key) {
            if last.elapsed() < self.window {
                return Ok(false);
            }
        }

        last_allowed.insert(key, Instant::now());
        Ok(true)
    }
}
