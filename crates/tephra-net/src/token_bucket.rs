//! Admission control for concurrent requests.
//!
//! A [`TokenBucket`] holds a fixed number of tokens; every in-flight
//! request owns exactly one. When the bucket is empty, `acquire` suspends
//! the calling task on a FIFO queue without consuming a thread. Released
//! tokens are handed directly to the longest-waiting live task rather than
//! returned to the count, so a release wakes exactly one waiter and
//! arrival order is preserved.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

struct State {
    available: usize,
    waiters: VecDeque<oneshot::Sender<Token>>,
}

/// A fixed pool of admission tokens with FIFO waiting.
#[derive(Clone)]
pub struct TokenBucket {
    state: Arc<Mutex<State>>,
}

impl TokenBucket {
    /// Create a bucket holding `tokens` tokens.
    #[must_use]
    pub fn new(tokens: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                available: tokens,
                waiters: VecDeque::new(),
            })),
        }
    }

    /// Take a token, suspending until one is released if none remain.
    ///
    /// Dropping the returned [`Token`] releases it. Dropping the future
    /// while it waits abandons the queue slot; a token already in flight
    /// to an abandoned waiter is recovered and passed on, so cancellation
    /// neither loses tokens nor blocks the queue.
    pub async fn acquire(&self) -> Token {
        let receiver = {
            let mut state = self.state.lock().expect("token bucket lock poisoned");
            if state.available > 0 {
                state.available -= 1;
                return Token {
                    state: Some(Arc::clone(&self.state)),
                };
            }
            let (sender, receiver) = oneshot::channel();
            state.waiters.push_back(sender);
            receiver
        };
        receiver
            .await
            .expect("waiting sender stays queued until a release reaches it")
    }

    /// Run `f`'s future while holding a token, releasing it on every exit
    /// path.
    pub async fn with_token<F, Fut, T>(&self, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _token = self.acquire().await;
        f().await
    }

    /// Tokens currently unclaimed. Zero whenever anything is waiting.
    #[must_use]
    pub fn available(&self) -> usize {
        self.state.lock().expect("token bucket lock poisoned").available
    }
}

/// Permission to run one admitted operation; dropping it releases the slot.
#[must_use = "dropping the token immediately releases it"]
pub struct Token {
    state: Option<Arc<Mutex<State>>>,
}

impl Drop for Token {
    fn drop(&mut self) {
        let Some(state) = self.state.take() else {
            return;
        };
        release(&state);
    }
}

fn release(state: &Arc<Mutex<State>>) {
    loop {
        let waiter = {
            let mut locked = state.lock().expect("token bucket lock poisoned");
            match locked.waiters.pop_front() {
                Some(waiter) => waiter,
                None => {
                    locked.available += 1;
                    return;
                }
            }
        };
        // The send happens outside the lock: when the receiving side was
        // already dropped, the returned token's own drop must be able to
        // take the lock again.
        let token = Token {
            state: Some(Arc::clone(state)),
        };
        match waiter.send(token) {
            Ok(()) => return,
            Err(mut unclaimed) => {
                // Waiter cancelled before the hand-off; disarm the token
                // and try the next one in line.
                unclaimed.state = None;
            }
        }
    }
}
