//! Token-bucket throttler
//!
//! Every exchange instance owns one [`Throttler`]. Callers enqueue a ticket
//! carrying the endpoint's cost and await it; a single background drain loop
//! grants tickets in strict FIFO order as tokens allow.
//!
//! - The drain loop is spawned lazily by the first caller that finds it idle and
//!   exits as soon as the queue is empty.
//! - The head ticket is granted whenever `tokens >= 0`, even if its cost drives
//!   the bucket negative. The debt is paid back by refills before the next
//!   grant.
//! - While in debt the loop sleeps `delay`, then refills
//!   `elapsed_ms * refill_rate` tokens, clamped to `capacity`.
//! - Once the queue holds more than `max_queue_depth` tickets, new tickets are
//!   rejected with [`Error::AdmissionRejected`] and never enqueued.
//!
//! ```rust
//! use ccxt_base::throttler::{Throttler, ThrottlerConfig};
//! use std::time::Duration;
//!
//! # async fn example() -> ccxt_base::error::Result<()> {
//! // one unit of cost per 50ms
//! let throttler = Throttler::new(ThrottlerConfig::from_rate_limit(Duration::from_millis(50)));
//! throttler.throttle(None).await?;
//! throttler.throttle(Some(5.0)).await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{Instant, sleep};
use tracing::{trace, warn};

/// Queue depth used when none is configured.
pub const DEFAULT_MAX_QUEUE_DEPTH: usize = 1000;

/// Token bucket parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ThrottlerConfig {
    /// Upper bound for accumulated tokens.
    pub capacity: f64,
    /// Tokens added per elapsed millisecond.
    pub refill_rate: f64,
    /// Sleep between refills while the bucket is in debt.
    pub delay: Duration,
    /// Cost of a ticket enqueued without an explicit cost.
    pub cost: f64,
    /// Tickets allowed to wait before new ones are rejected.
    pub max_queue_depth: usize,
    /// Tokens available when the throttler is created.
    pub tokens: f64,
}

impl Default for ThrottlerConfig {
    fn default() -> Self {
        Self {
            capacity: 1.0,
            refill_rate: 1.0,
            delay: Duration::from_millis(1),
            cost: 1.0,
            max_queue_depth: DEFAULT_MAX_QUEUE_DEPTH,
            tokens: 0.0,
        }
    }
}

impl ThrottlerConfig {
    /// Bucket that admits one unit of cost per `interval`.
    ///
    /// `interval` is an exchange's advertised minimum delay between requests.
    /// A zero interval refills instantly.
    pub fn from_rate_limit(interval: Duration) -> Self {
        let interval_ms = interval.as_secs_f64() * 1000.0;
        let refill_rate = if interval_ms > 0.0 {
            1.0 / interval_ms
        } else {
            f64::MAX
        };
        Self {
            refill_rate,
            ..Self::default()
        }
    }

    /// Set the capacity.
    pub fn with_capacity(mut self, capacity: f64) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the refill rate in tokens per millisecond.
    pub fn with_refill_rate(mut self, refill_rate: f64) -> Self {
        self.refill_rate = refill_rate;
        self
    }

    /// Set the poll delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the default ticket cost.
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    /// Set the maximum queue depth.
    pub fn with_max_queue_depth(mut self, max_queue_depth: usize) -> Self {
        self.max_queue_depth = max_queue_depth;
        self
    }

    /// Set the initial token count.
    pub fn with_tokens(mut self, tokens: f64) -> Self {
        self.tokens = tokens;
        self
    }
}

struct Ticket {
    cost: f64,
    grant: oneshot::Sender<()>,
}

struct BucketState {
    config: ThrottlerConfig,
    tokens: f64,
    queue: VecDeque<Ticket>,
    running: bool,
}

/// Per-instance admission gate.
///
/// Cloning yields another handle to the same bucket.
#[derive(Clone)]
pub struct Throttler {
    state: Arc<Mutex<BucketState>>,
}

impl std::fmt::Debug for Throttler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("Throttler")
            .field("tokens", &state.tokens)
            .field("queued", &state.queue.len())
            .field("running", &state.running)
            .field("config", &state.config)
            .finish()
    }
}

impl Throttler {
    /// Creates a throttler with `config.tokens` available.
    pub fn new(config: ThrottlerConfig) -> Self {
        if config.delay.is_zero() {
            warn!("Throttler delay is zero, the drain loop will spin while in debt");
        }
        Self {
            state: Arc::new(Mutex::new(BucketState {
                tokens: config.tokens,
                config,
                queue: VecDeque::new(),
                running: false,
            })),
        }
    }

    /// Waits until a ticket of `cost` (default cost when `None`) is granted.
    pub async fn throttle(&self, cost: Option<f64>) -> Result<()> {
        self.enqueue(cost)?.await
    }

    /// Enqueues a ticket and returns the future that resolves on grant.
    ///
    /// The admission decision is made here: a full queue fails immediately
    /// and leaves the queue untouched. Dropping the returned ticket does not
    /// withdraw it; its cost is still charged when its turn comes.
    ///
    /// Must be called from within a tokio runtime.
    pub fn enqueue(&self, cost: Option<f64>) -> Result<ThrottleTicket> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|_| Error::not_supported("Throttler requires a tokio runtime"))?;

        let (grant, granted) = oneshot::channel();
        let start_loop = {
            let mut state = lock(&self.state);
            let queued = state.queue.len();
            if queued > state.config.max_queue_depth {
                warn!(
                    queued,
                    max_queue_depth = state.config.max_queue_depth,
                    "Throttle queue over capacity, rejecting request"
                );
                return Err(Error::admission_rejected(
                    queued,
                    state.config.max_queue_depth,
                ));
            }
            let cost = cost.unwrap_or(state.config.cost);
            state.queue.push_back(Ticket { cost, grant });
            trace!(cost, queued = queued + 1, "Enqueued throttle ticket");

            let start_loop = !state.running;
            state.running = true;
            start_loop
        };

        if start_loop {
            handle.spawn(drain(Arc::clone(&self.state)));
        }
        Ok(ThrottleTicket { granted })
    }

    /// Current token count; negative while in debt.
    pub fn available_tokens(&self) -> f64 {
        lock(&self.state).tokens
    }

    /// Tickets waiting for a grant.
    pub fn queue_len(&self) -> usize {
        lock(&self.state).queue.len()
    }

    /// True while the drain loop is alive.
    pub fn is_running(&self) -> bool {
        lock(&self.state).running
    }

    /// Snapshot of the bucket parameters.
    pub fn config(&self) -> ThrottlerConfig {
        lock(&self.state).config.clone()
    }
}

fn lock(state: &Mutex<BucketState>) -> MutexGuard<'_, BucketState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Resets the bucket if the drain task is dropped before it finishes, as
/// happens when its runtime shuts down.
///
/// Clearing the queue drops the grant senders, so waiters fail instead of
/// hanging, and the next enqueue spawns a fresh loop.
struct DrainGuard {
    state: Arc<Mutex<BucketState>>,
    armed: bool,
}

impl Drop for DrainGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut bucket = lock(&self.state);
        let dropped = bucket.queue.len();
        bucket.queue.clear();
        bucket.running = false;
        warn!(dropped, "Throttle drain loop stopped early, failing waiting tickets");
    }
}

/// The single consumer of one bucket's queue.
///
/// The guard is created before the first poll, so a task dropped unpolled
/// also resets the bucket.
fn drain(state: Arc<Mutex<BucketState>>) -> impl Future<Output = ()> + Send + 'static {
    let guard = DrainGuard {
        state: Arc::clone(&state),
        armed: true,
    };
    async move {
        let mut guard = guard;
        drain_queue(&state).await;
        guard.armed = false;
    }
}

async fn drain_queue(state: &Mutex<BucketState>) {
    let mut last = Instant::now();
    loop {
        let in_debt = {
            let mut bucket = lock(state);
            if bucket.tokens >= 0.0 {
                let Some(ticket) = bucket.queue.pop_front() else {
                    bucket.running = false;
                    return;
                };
                bucket.tokens -= ticket.cost;
                // a dropped waiter still pays
                let _ = ticket.grant.send(());
                trace!(
                    cost = ticket.cost,
                    tokens = bucket.tokens,
                    "Granted throttle ticket"
                );
                if bucket.queue.is_empty() {
                    bucket.running = false;
                    return;
                }
                None
            } else {
                Some(bucket.config.delay)
            }
        };

        match in_debt {
            Some(delay) => {
                sleep(delay).await;
                let now = Instant::now();
                let elapsed_ms = now.duration_since(last).as_secs_f64() * 1000.0;
                last = now;

                let mut bucket = lock(state);
                let refilled = bucket.tokens + elapsed_ms * bucket.config.refill_rate;
                bucket.tokens = refilled.min(bucket.config.capacity);
            }
            None => tokio::task::yield_now().await,
        }
    }
}

/// Future returned by [`Throttler::enqueue`], resolving when granted.
#[derive(Debug)]
#[must_use = "a ticket does nothing unless awaited"]
pub struct ThrottleTicket {
    granted: oneshot::Receiver<()>,
}

impl Future for ThrottleTicket {
    type Output = Result<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.granted).poll(cx).map(|granted| {
            granted.map_err(|_| {
                Error::exchange_not_available("Throttler stopped before granting the request")
            })
        })
    }
}
