//! Effect execution behind the breaker's attempt protocol.

use crate::breaker::{AttemptError, CircuitBreaker};
use stillwater::effect::Effect;

impl<E: Clone> CircuitBreaker<E> {
    /// Run `effect` against `env` if the breaker admits it.
    ///
    /// Same contract as [`attempt`](Self::attempt): a rejected effect is never
    /// run, a failed one is recorded and returned as
    /// [`AttemptError::Failed`]. The breaker's lock is not held while the
    /// effect runs.
    pub async fn attempt_effect<Eff>(
        &self,
        effect: Eff,
        env: &Eff::Env,
    ) -> Result<Eff::Output, AttemptError<E>>
    where
        Eff: Effect<Error = E>,
    {
        self.admit()?;
        let outcome = effect.run(env).await;
        self.settle(outcome)
    }
}
