//! Policy trait. Split so the exclusive section only covers the state mutation.
//!
//! Rules:
//! - `prepare` and `decide` are pure. They run outside any lock.
//! - `update` is the only place state changes. Keep it to the read-modify-write.
//! - No allocation, no blocking, bounded work in all three.

/// A decision policy over one predictor's private state.
pub trait Policy {
    /// Mutable state. Zeroed on construction.
    type State: Default;
    /// What the host hands in.
    type Input<'a>;
    /// Result of the pure pre-work.
    type Prepared;
    /// What leaves the exclusive section.
    type Observation;
    type Decision: core::fmt::Debug;

    /// Short name for logs.
    const NAME: &'static str;

    fn prepare(&self, input: Self::Input<'_>) -> Self::Prepared;

    fn update(&self, state: &mut Self::State, prepared: Self::Prepared) -> Self::Observation;

    fn decide(&self, observation: Self::Observation) -> Self::Decision;

    /// Whether a decision is "no decision". Counts toward abstentions.
    #[inline(always)]
    fn is_abstention(_decision: &Self::Decision) -> bool {
        false
    }

    /// All three phases against state the caller already owns exclusively.
    #[inline]
    fn run(&self, state: &mut Self::State, input: Self::Input<'_>) -> Self::Decision {
        let prepared = self.prepare(input);
        let observation = self.update(state, prepared);
        self.decide(observation)
    }
}
