//! Reliability module: per-provider circuit breakers
//!
//! Each provider gets an independent state machine:
//!
//! ```text
//! Closed --(failures >= threshold)--> Open
//! Open   --(cooldown elapsed, on query)--> HalfOpen
//! HalfOpen --(success)--> Closed
//! HalfOpen --(failure)--> Open
//! ```
//!
//! [`CircuitBreaker::is_open`] is itself a mutating query: it's the thing that
//! notices a cooldown elapsed and performs the Open -> HalfOpen transition, since
//! there's no background timer driving the state machine.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use gateway_types::CircuitBreakerState as PublicState;

/// Default consecutive-failure threshold before a provider trips open.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
/// Default cooldown before an open circuit allows a trial request.
pub const DEFAULT_COOLDOWN_SECONDS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone)]
struct Entry {
    state: State,
    failures: u32,
    opened_at: Option<Instant>,
}

impl Default for Entry {
    fn default() -> Self {
        Self { state: State::Closed, failures: 0, opened_at: None }
    }
}

/// Tracks circuit breaker state per provider name.
pub struct CircuitBreaker {
    state: Mutex<HashMap<String, Entry>>,
    failure_threshold: u32,
    cooldown: Duration,
}

impl CircuitBreaker {
    /// Create a breaker with the given failure threshold and cooldown.
    pub fn new(failure_threshold: u32, cooldown_secs: u64) -> Self {
        Self {
            state: Mutex::new(HashMap::new()),
            failure_threshold,
            cooldown: Duration::from_secs(cooldown_secs),
        }
    }

    /// Returns true if requests to `provider` should currently be skipped.
    ///
    /// If the circuit is open and the cooldown has elapsed, this call itself
    /// performs the Open -> HalfOpen transition and returns `false`, allowing
    /// exactly one trial request through.
    pub fn is_open(&self, provider: &str) -> bool {
        let mut state = self.state.lock().unwrap();
        let entry = state.entry(provider.to_string()).or_default();

        if entry.state == State::Open {
            if let Some(opened_at) = entry.opened_at {
                if opened_at.elapsed() >= self.cooldown {
                    entry.state = State::HalfOpen;
                    entry.failures = 0;
                    entry.opened_at = None;
                    tracing::info!(provider, "circuit breaker half-open after cooldown");
                    return false;
                }
            }
            return true;
        }
        false
    }

    /// Record a successful call. Closes the circuit (from Closed or HalfOpen).
    pub fn record_success(&self, provider: &str) {
        let mut state = self.state.lock().unwrap();
        state.insert(provider.to_string(), Entry::default());
    }

    /// Record a failed call. Trips the circuit open once `failure_threshold`
    /// consecutive failures accumulate, or immediately if already half-open.
    pub fn record_failure(&self, provider: &str) {
        let mut state = self.state.lock().unwrap();
        let entry = state.entry(provider.to_string()).or_default();

        if entry.state == State::HalfOpen {
            entry.state = State::Open;
            entry.failures = self.failure_threshold;
            entry.opened_at = Some(Instant::now());
            tracing::warn!(provider, "circuit breaker re-opened after half-open trial failed");
            return;
        }

        entry.failures += 1;
        if entry.failures >= self.failure_threshold {
            entry.state = State::Open;
            entry.opened_at = Some(Instant::now());
            tracing::warn!(provider, failures = entry.failures, "circuit breaker opened");
        }
    }

    /// Current state for a provider, for status/monitoring endpoints. Does not
    /// perform the cooldown-elapsed transition that [`Self::is_open`] does.
    pub fn state_of(&self, provider: &str) -> PublicState {
        let state = self.state.lock().unwrap();
        match state.get(provider).map(|e| e.state).unwrap_or(State::Closed) {
            State::Closed => PublicState::Closed,
            State::Open => PublicState::Open,
            State::HalfOpen => PublicState::HalfOpen,
        }
    }

    /// Snapshot of every provider this breaker has seen.
    pub fn all_states(&self) -> HashMap<String, PublicState> {
        let state = self.state.lock().unwrap();
        state
            .iter()
            .map(|(k, v)| {
                let public = match v.state {
                    State::Closed => PublicState::Closed,
                    State::Open => PublicState::Open,
                    State::HalfOpen => PublicState::HalfOpen,
                };
                (k.clone(), public)
            })
            .collect()
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_THRESHOLD, DEFAULT_COOLDOWN_SECONDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_by_default() {
        let cb = CircuitBreaker::new(3, 60);
        assert!(!cb.is_open("anthropic"));
        assert_eq!(cb.state_of("anthropic"), PublicState::Closed);
    }

    #[test]
    fn opens_after_threshold_failures() {
        let cb = CircuitBreaker::new(3, 60);
        cb.record_failure("anthropic");
        cb.record_failure("anthropic");
        assert!(!cb.is_open("anthropic"));
        cb.record_failure("anthropic");
        assert!(cb.is_open("anthropic"));
        assert_eq!(cb.state_of("anthropic"), PublicState::Open);
    }

    #[test]
    fn success_resets_circuit() {
        let cb = CircuitBreaker::new(3, 60);
        cb.record_failure("openai");
        cb.record_failure("openai");
        cb.record_success("openai");
        cb.record_failure("openai");
        cb.record_failure("openai");
        assert!(!cb.is_open("openai"), "two failures after a reset should not trip the breaker");
    }

    #[test]
    fn half_opens_after_cooldown_elapses() {
        let cb = CircuitBreaker::new(1, 0);
        cb.record_failure("gemini");
        assert_eq!(cb.state_of("gemini"), PublicState::Open);
        assert!(!cb.is_open("gemini"));
        assert_eq!(cb.state_of("gemini"), PublicState::HalfOpen);
    }

    #[test]
    fn half_open_failure_reopens_circuit() {
        let cb = CircuitBreaker::new(1, 0);
        cb.record_failure("gemini");
        assert!(!cb.is_open("gemini"));
        cb.record_failure("gemini");
        assert!(cb.is_open("gemini"));
    }

    #[test]
    fn half_open_success_closes_circuit() {
        let cb = CircuitBreaker::new(1, 0);
        cb.record_failure("gemini");
        assert!(!cb.is_open("gemini"));
        cb.record_success("gemini");
        assert_eq!(cb.state_of("gemini"), PublicState::Closed);
    }

    #[test]
    fn providers_are_independent() {
        let cb = CircuitBreaker::new(1, 60);
        cb.record_failure("anthropic");
        assert!(cb.is_open("anthropic"));
        assert!(!cb.is_open("openai"));
    }
}
