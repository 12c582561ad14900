//! Predictor: a policy bound to its one guarded state block.
//!
//! Pick your entry point:
//! - [`Predictor::predict`]: spins for the state. Process context.
//! - [`Predictor::try_predict`]: gives up if the state is held. Interrupt context.
//! - [`Policy::run`]: no lock at all, for hosts that already own the state.

use log::{debug, info};
use spin::Mutex;

use super::metrics::PredictorMetrics;
use super::policy::Policy;

/// Only constructible from a bound policy, so there is no "uninitialized" predictor.
pub struct Predictor<P: Policy> {
    policy: P,
    state: Mutex<P::State>,
    metrics: PredictorMetrics,
}

impl<P: Policy> Predictor<P> {
    pub fn new(policy: P) -> Self {
        info!("{}: predictor bound", P::NAME);
        Self {
            policy,
            state: Mutex::new(P::State::default()),
            metrics: PredictorMetrics::new(),
        }
    }

    /// Resume from a saved state block.
    pub fn with_state(policy: P, state: P::State) -> Self {
        info!("{}: predictor bound with carried state", P::NAME);
        Self {
            policy,
            state: Mutex::new(state),
            metrics: PredictorMetrics::new(),
        }
    }

    /// One decision. The lock covers `update` only.
    #[inline]
    pub fn predict(&self, input: P::Input<'_>) -> P::Decision {
        let prepared = self.policy.prepare(input);
        let observation = {
            let mut state = self.state.lock();
            self.policy.update(&mut *state, prepared)
        };
        self.finish(observation)
    }

    /// Like [`predict`](Self::predict), but `None` instead of spinning when the state is held.
    /// Nothing is recorded in the state on `None`.
    #[inline]
    pub fn try_predict(&self, input: P::Input<'_>) -> Option<P::Decision> {
        let prepared = self.policy.prepare(input);
        let observation = match self.state.try_lock() {
            Some(mut state) => self.policy.update(&mut *state, prepared),
            None => {
                self.metrics.record_contention();
                return None;
            }
        };
        Some(self.finish(observation))
    }

    #[inline(always)]
    fn finish(&self, observation: P::Observation) -> P::Decision {
        let decision = self.policy.decide(observation);
        self.metrics.record_call(P::is_abstention(&decision));
        debug!("{}: {:?}", P::NAME, decision);
        decision
    }

    #[inline(always)]
    pub fn policy(&self) -> &P {
        &self.policy
    }

    #[inline(always)]
    pub fn metrics(&self) -> &PredictorMetrics {
        &self.metrics
    }

    /// Read the state under the lock.
    pub fn inspect<R>(&self, f: impl FnOnce(&P::State) -> R) -> R {
        let state = self.state.lock();
        f(&*state)
    }

    /// Back to the zeroed state. Metrics keep counting.
    pub fn reset(&self) {
        *self.state.lock() = P::State::default();
    }

    /// Take the state out, e.g. to hand it to a successor predictor.
    pub fn into_state(self) -> P::State {
        self.state.into_inner()
    }
}
