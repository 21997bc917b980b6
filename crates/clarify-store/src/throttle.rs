//! Write throttling for quota-limited backing stores.
//!
//! The synced store behind a real deployment enforces a sustained write
//! quota; some pages generate bursts of state changes far above it. This
//! decorator lets a configurable burst through unchanged and coalesces the
//! rest: intermediate records are overwritten in place and a trailing write
//! always lands, so the store converges to the final state without the
//! caller ever waiting on quota.

use async_trait::async_trait;
use clarify_core::config::WriteThrottle;
use clarify_core::types::AccessibilityState;
use clarify_core::ClarifyResult;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::StateStore;

/// Token bucket over the store's write quota.
struct TokenBucket {
    capacity: u32,
    tokens: f64,
    refill_rate: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(throttle: &WriteThrottle) -> Self {
        Self {
            capacity: throttle.burst,
            tokens: throttle.burst as f64,
            refill_rate: throttle.per_second,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity as f64);
        self.last_refill = now;
    }

    /// Consume one token, or report how long until one is available.
    fn try_consume(&mut self) -> Option<Duration> {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            None
        } else {
            let needed = 1.0 - self.tokens;
            Some(Duration::from_secs_f64(needed / self.refill_rate))
        }
    }
}

struct Shared {
    bucket: Mutex<TokenBucket>,
    pending: Mutex<Option<AccessibilityState>>,
    flushing: AtomicBool,
}

/// Rate-limited decorator over any [`StateStore`].
pub struct ThrottledStore<S> {
    inner: Arc<S>,
    shared: Arc<Shared>,
}

impl<S: StateStore + 'static> ThrottledStore<S> {
    pub fn new(inner: S, throttle: WriteThrottle) -> Self {
        Self {
            inner: Arc::new(inner),
            shared: Arc::new(Shared {
                bucket: Mutex::new(TokenBucket::new(&throttle)),
                pending: Mutex::new(None),
                flushing: AtomicBool::new(false),
            }),
        }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn spawn_flusher(&self) {
        if self.shared.flushing.swap(true, Ordering::SeqCst) {
            return;
        }
        let inner = Arc::clone(&self.inner);
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            loop {
                if shared.pending.lock().await.is_none() {
                    shared.flushing.store(false, Ordering::SeqCst);
                    // A writer may have queued between the check and the
                    // flag reset; reclaim the flag and keep draining.
                    if shared.pending.lock().await.is_some()
                        && !shared.flushing.swap(true, Ordering::SeqCst)
                    {
                        continue;
                    }
                    break;
                }

                // Quota first, then take: later records queued while we wait
                // supersede the one we would have written.
                let wait = shared.bucket.lock().await.try_consume();
                if let Some(delay) = wait {
                    tokio::time::sleep(delay).await;
                    continue;
                }

                if let Some(state) = shared.pending.lock().await.take() {
                    if let Err(err) = inner.save(&state).await {
                        log::warn!("Coalesced state write failed: {}", err);
                    }
                }
            }
        });
    }
}

#[async_trait]
impl<S: StateStore + 'static> StateStore for ThrottledStore<S> {
    async fn load(&self) -> ClarifyResult<Option<AccessibilityState>> {
        self.inner.load().await
    }

    async fn save(&self, state: &AccessibilityState) -> ClarifyResult<()> {
        // While a flusher is draining, the newest record must go through it
        // too, or an older queued record could land on top of this one.
        if self.shared.flushing.load(Ordering::SeqCst) {
            *self.shared.pending.lock().await = Some(state.clone());
            self.spawn_flusher();
            return Ok(());
        }

        let wait = self.shared.bucket.lock().await.try_consume();
        if wait.is_none() {
            return self.inner.save(state).await;
        }

        // Over quota: replace whatever was queued and make sure a flusher
        // will land the trailing record.
        *self.shared.pending.lock().await = Some(state.clone());
        self.spawn_flusher();
        Ok(())
    }
}
