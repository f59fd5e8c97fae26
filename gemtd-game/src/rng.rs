//! Deterministic per-trial random streams.
use hmac::{Hmac, Mac};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::{Digest, Sha256};

use crate::skill::SkillLevel;

type HmacSha256 = Hmac<Sha256>;

/// Coordinates of one trial inside a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrialKey {
    pub skill: SkillLevel,
    pub wave: u32,
    pub trial: u32,
}

impl TrialKey {
    #[must_use]
    pub const fn new(skill: SkillLevel, wave: u32, trial: u32) -> Self {
        Self { skill, wave, trial }
    }

    fn domain_tag(&self, stream: &str) -> Vec<u8> {
        format!(
            "{stream}/{}/{}/{}",
            self.skill.key(),
            self.wave,
            self.trial
        )
        .into_bytes()
    }
}

/// Independent random streams for one trial, segregated by decision domain.
///
/// `strategy` drives synthesis choices and `execution` drives the combat
/// variance roll, so changing how many draws synthesis makes never shifts
/// the execution outcome.
#[derive(Debug, Clone)]
pub struct TrialRng {
    strategy: CountingRng<ChaCha20Rng>,
    execution: CountingRng<ChaCha20Rng>,
}

impl TrialRng {
    /// Streams for a trial, derived from the run seed and the trial coordinates.
    #[must_use]
    pub fn for_trial(run_seed: u64, key: TrialKey) -> Self {
        Self {
            strategy: CountingRng::new(derive_stream_seed(run_seed, &key.domain_tag("strategy"))),
            execution: CountingRng::new(derive_stream_seed(
                run_seed,
                &key.domain_tag("execution"),
            )),
        }
    }

    /// Streams for ad-hoc use outside a sweep.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            strategy: CountingRng::new(derive_stream_seed(seed, b"strategy")),
            execution: CountingRng::new(derive_stream_seed(seed, b"execution")),
        }
    }

    pub fn strategy(&mut self) -> &mut CountingRng<ChaCha20Rng> {
        &mut self.strategy
    }

    pub fn execution(&mut self) -> &mut CountingRng<ChaCha20Rng> {
        &mut self.execution
    }
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<ChaCha20Rng> {
    fn new(seed: [u8; 32]) -> Self {
        Self {
            rng: ChaCha20Rng::from_seed(seed),
            draws: 0,
        }
    }
}

impl<R: RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: RngCore> RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

fn derive_stream_seed(run_seed: u64, domain_tag: &[u8]) -> [u8; 32] {
    match HmacSha256::new_from_slice(&run_seed.to_le_bytes()) {
        Ok(mut mac) => {
            mac.update(domain_tag);
            mac.finalize().into_bytes().into()
        }
        // HMAC takes keys of any length; plain hashing keeps this total.
        Err(_) => Sha256::new()
            .chain_update(run_seed.to_le_bytes())
            .chain_update(domain_tag)
            .finalize()
            .into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn same_trial_key_replays_identically() {
        let key = TrialKey::new(SkillLevel::Good, 3, 7);
        let mut first = TrialRng::for_trial(1337, key);
        let mut second = TrialRng::for_trial(1337, key);
        let a: Vec<u64> = (0..8).map(|_| first.strategy().next_u64()).collect();
        let b: Vec<u64> = (0..8).map(|_| second.strategy().next_u64()).collect();
        assert_eq!(a, b);
        assert_eq!(first.execution().next_u64(), second.execution().next_u64());
    }

    #[test]
    fn streams_and_trials_are_independent() {
        let mut rng = TrialRng::for_trial(1337, TrialKey::new(SkillLevel::Good, 3, 7));
        let strategy = rng.strategy().next_u64();
        let execution = rng.execution().next_u64();
        assert_ne!(strategy, execution);

        let mut other = TrialRng::for_trial(1337, TrialKey::new(SkillLevel::Good, 3, 8));
        assert_ne!(other.strategy().next_u64(), strategy);

        let mut reseeded = TrialRng::for_trial(42, TrialKey::new(SkillLevel::Good, 3, 7));
        assert_ne!(reseeded.strategy().next_u64(), strategy);
    }

    #[test]
    fn draws_are_counted_per_stream() {
        let mut rng = TrialRng::from_seed(9);
        let _: f64 = rng.strategy().r#gen();
        let _: f64 = rng.strategy().r#gen();
        rng.execution().next_u32();
        assert!(rng.strategy().draws() >= 2);
        assert_eq!(rng.execution().draws(), 1);
    }
}
