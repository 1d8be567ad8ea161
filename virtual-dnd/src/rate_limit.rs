/// Coalesces bursts of calls (typically scroll notifications) into fewer invocations.
///
/// The limiter holds no clock. Feed it the current time:
/// - [`RateLimiter::call`] when an event arrives. It returns `true` when the work should run
///   right away (no limiting configured).
/// - [`RateLimiter::poll`] from the host's timer/frame loop. It returns `true` once a deferred
///   invocation is due.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RateLimiter {
    /// Every call runs immediately.
    #[default]
    Immediate,
    /// Runs `wait_ms` after the most recent call; every call pushes the deadline back.
    Debounce { wait_ms: u64, due_ms: Option<u64> },
    /// Runs `wait_ms` after the first call of a burst; calls made while armed are dropped.
    Throttle { wait_ms: u64, due_ms: Option<u64> },
}

impl RateLimiter {
    /// Picks the strategy from the configured times. Debounce wins when both are set.
    pub fn from_times(debounce_ms: u64, throttle_ms: u64) -> Self {
        if debounce_ms > 0 && throttle_ms > 0 {
            vwarn!(
                debounce_ms,
                throttle_ms,
                "both debounce and throttle configured; using debounce"
            );
        }
        if debounce_ms > 0 {
            Self::debounce(debounce_ms)
        } else if throttle_ms > 0 {
            Self::throttle(throttle_ms)
        } else {
            Self::Immediate
        }
    }

    pub fn debounce(wait_ms: u64) -> Self {
        Self::Debounce {
            wait_ms,
            due_ms: None,
        }
    }

    pub fn throttle(wait_ms: u64) -> Self {
        Self::Throttle {
            wait_ms,
            due_ms: None,
        }
    }

    /// Registers a call at `now_ms`. Returns `true` when the caller should run the work now.
    pub fn call(&mut self, now_ms: u64) -> bool {
        match self {
            Self::Immediate => true,
            Self::Debounce { wait_ms, due_ms } => {
                *due_ms = Some(now_ms.saturating_add(*wait_ms));
                false
            }
            Self::Throttle { wait_ms, due_ms } => {
                if due_ms.is_none() {
                    *due_ms = Some(now_ms.saturating_add(*wait_ms));
                }
                false
            }
        }
    }

    /// Returns `true` (and disarms) when a deferred invocation is due at `now_ms`.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self {
            Self::Immediate => false,
            Self::Debounce { due_ms, .. } | Self::Throttle { due_ms, .. } => match *due_ms {
                Some(due) if now_ms >= due => {
                    *due_ms = None;
                    true
                }
                _ => false,
            },
        }
    }

    /// Drops any pending invocation.
    pub fn cancel(&mut self) {
        match self {
            Self::Immediate => {}
            Self::Debounce { due_ms, .. } | Self::Throttle { due_ms, .. } => *due_ms = None,
        }
    }

    pub fn is_pending(&self) -> bool {
        match self {
            Self::Immediate => false,
            Self::Debounce { due_ms, .. } | Self::Throttle { due_ms, .. } => due_ms.is_some(),
        }
    }

    /// When the pending invocation is due, if any.
    pub fn due_ms(&self) -> Option<u64> {
        match self {
            Self::Immediate => None,
            Self::Debounce { due_ms, .. } | Self::Throttle { due_ms, .. } => *due_ms,
        }
    }
}
