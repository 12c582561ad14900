//! Scheduling selector. Q network over up to five runnable candidates.
//!
//! State layout: `[f1_0 .. f1_4, f2_0 .. f2_4]`, empty slots zero.
//! The chosen action is only honored if it names a real candidate.

use crate::core::activation::Activation;
use crate::core::dense::{argmax, FeedForward, LayerConfig, LayerWeights, NetworkConfig, Output};
use crate::core::error::ModelError;
use crate::core::fixed::Fixed;
use crate::core::policy::Policy;
use crate::core::predictor::Predictor;

pub const MAX_CANDIDATES: usize = 5;
pub const SCHED_STATES: usize = 2 * MAX_CANDIDATES;
pub const SCHED_HIDDEN: usize = 32;
pub const SCHED_ACTIONS: usize = MAX_CANDIDATES;

/// Runtime normalizer: nanoseconds per unit.
pub const RUNTIME_SCALE_NS: u64 = 1_000_000;
/// Wait normalizer: ticks per unit.
pub const WAIT_SCALE_TICKS: u64 = 100;

const SCHED_LAYERS: [LayerConfig; 2] = [
    LayerConfig::new(SCHED_HIDDEN, Activation::Relu),
    LayerConfig::new(SCHED_ACTIONS, Activation::Identity),
];

pub const SCHED_NETWORK: NetworkConfig<'static> = NetworkConfig::new(SCHED_STATES, &SCHED_LAYERS);

/// Two normalized features of one runnable task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Candidate {
    pub runtime: Fixed,
    pub waited: Fixed,
}

impl Candidate {
    #[inline(always)]
    pub const fn new(runtime: Fixed, waited: Fixed) -> Self {
        Self { runtime, waited }
    }

    /// From virtual runtime and ticks since the task last ran.
    #[inline(always)]
    pub const fn from_task(vruntime_ns: u64, waited_ticks: u64) -> Self {
        Self {
            runtime: Fixed::from_ratio(vruntime_ns, RUNTIME_SCALE_NS),
            waited: Fixed::from_ratio(waited_ticks, WAIT_SCALE_TICKS),
        }
    }
}

/// Stateless: the Q network is pure and the queue belongs to the host.
#[derive(Debug, Clone)]
pub struct SchedulePolicy<'w> {
    q: FeedForward<'w>,
}

impl<'w> SchedulePolicy<'w> {
    pub fn new(weights: &[LayerWeights<'w>; 2]) -> Result<Self, ModelError> {
        Self::with_config(&SCHED_NETWORK, weights)
    }

    /// Any shape, as long as it reads the 10-slot state and scores at least one action.
    pub fn with_config(config: &NetworkConfig<'_>, weights: &[LayerWeights<'w>]) -> Result<Self, ModelError> {
        let q = FeedForward::new(config, weights)?;
        if q.inputs() != SCHED_STATES {
            return Err(ModelError::SiteWidth {
                expected: SCHED_STATES,
                actual: q.inputs(),
            });
        }
        if q.outputs() == 0 || q.outputs() > SCHED_ACTIONS {
            return Err(ModelError::SiteWidth {
                expected: SCHED_ACTIONS,
                actual: q.outputs(),
            });
        }
        Ok(Self { q })
    }

    /// Pure Q values for a state vector.
    #[inline]
    pub fn q_values(&self, state: &[Fixed; SCHED_STATES]) -> Output {
        self.q.forward(state)
    }
}

/// Lay candidates out as the network expects.
#[inline]
pub fn encode_state(candidates: &[Candidate]) -> [Fixed; SCHED_STATES] {
    let mut state = [Fixed::ZERO; SCHED_STATES];
    for (i, c) in candidates.iter().take(MAX_CANDIDATES).enumerate() {
        state[i] = c.runtime;
        state[i + MAX_CANDIDATES] = c.waited;
    }
    state
}

impl<'w> Policy for SchedulePolicy<'w> {
    type State = ();
    type Input<'a> = (&'a [Candidate], usize);
    /// Q values and the live candidate count, or nothing to choose from.
    type Prepared = Option<(Output, usize)>;
    type Observation = Option<(Output, usize)>;
    type Decision = Option<usize>;

    const NAME: &'static str = "schedule";

    /// `n` is clamped to the slice and to `MAX_CANDIDATES`. `n == 0` reads nothing.
    #[inline]
    fn prepare(&self, (candidates, n): (&[Candidate], usize)) -> Self::Prepared {
        let n = n.min(candidates.len()).min(MAX_CANDIDATES);
        if n == 0 {
            return None;
        }
        let state = encode_state(&candidates[..n]);
        Some((self.q_values(&state), n))
    }

    #[inline(always)]
    fn update(&self, _state: &mut (), prepared: Self::Prepared) -> Self::Observation {
        prepared
    }

    #[inline]
    fn decide(&self, observation: Self::Observation) -> Option<usize> {
        let (q, n) = observation?;
        argmax(&q).filter(|&action| action < n)
    }

    #[inline(always)]
    fn is_abstention(decision: &Option<usize>) -> bool {
        decision.is_none()
    }
}

impl<'w> Predictor<SchedulePolicy<'w>> {
    /// Index into `candidates` of the task to run next.
    #[inline]
    pub fn select_action(&self, candidates: &[Candidate], n: usize) -> Option<usize> {
        self.predict((candidates, n))
    }
}
