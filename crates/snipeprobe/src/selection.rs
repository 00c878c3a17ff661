//! Option selection policies for dropdown fields.
//!
//! Which rendered option a field picks is configuration, not code: each
//! select2 field carries a [`SelectionPolicy`]. Random picks come from an
//! explicitly seeded [`OptionPicker`] so a failing run can be replayed.
//!
//! ```ignore
//! let mut picker = OptionPicker::new(Seed::from_u64(12345));
//! let index = picker.pick(SelectionPolicy::Random, 7, "company")?;
//! ```

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};

/// Deterministic seed for reproducible option picks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Seed(u64);

impl Seed {
    /// Create a seed from a u64 value
    #[must_use]
    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    /// Seed from the wall clock, for runs that did not pin one
    #[must_use]
    pub fn from_clock() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos() as u64);
        Self(nanos)
    }

    /// Get the raw seed value
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Simple xorshift64 PRNG
#[derive(Debug, Clone)]
struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const fn new(seed: Seed) -> Self {
        // Ensure non-zero state
        let state = if seed.0 == 0 { 1 } else { seed.0 };
        Self { state }
    }

    const fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    const fn next_below(&mut self, bound: u64) -> u64 {
        if bound <= 1 {
            return 0;
        }
        self.next() % bound
    }
}

/// Which of the rendered options a field picks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// The first rendered option
    #[default]
    First,
    /// Uniformly random over the rendered options
    Random,
}

impl std::fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::First => f.write_str("first"),
            Self::Random => f.write_str("random"),
        }
    }
}

/// Picks option indices according to a policy
#[derive(Debug, Clone)]
pub struct OptionPicker {
    seed: Seed,
    rng: Xorshift64,
}

impl OptionPicker {
    /// Create a picker with the given seed
    #[must_use]
    pub const fn new(seed: Seed) -> Self {
        Self {
            seed,
            rng: Xorshift64::new(seed),
        }
    }

    /// Choose an index in `0..count`.
    ///
    /// # Errors
    ///
    /// [`ProbeError::NoOptions`] when `count` is zero.
    pub fn pick(&mut self, policy: SelectionPolicy, count: usize, field: &str) -> ProbeResult<usize> {
        if count == 0 {
            return Err(ProbeError::NoOptions {
                field: field.to_string(),
            });
        }
        let index = match policy {
            SelectionPolicy::First => 0,
            SelectionPolicy::Random => self.rng.next_below(count as u64) as usize,
        };
        tracing::debug!(field, %policy, count, index, "picked option");
        Ok(index)
    }

    /// The seed this picker started from
    #[must_use]
    pub const fn seed(&self) -> Seed {
        self.seed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod seed_tests {
        use super::*;

        #[test]
        fn test_seed_from_u64() {
            let seed = Seed::from_u64(12345);
            assert_eq!(seed.value(), 12345);
            assert_eq!(seed.to_string(), "12345");
        }

        #[test]
        fn test_seed_default() {
            assert_eq!(Seed::default().value(), 0);
        }
    }

    mod xorshift_tests {
        use super::*;

        #[test]
        fn test_xorshift_deterministic() {
            let mut rng1 = Xorshift64::new(Seed::from_u64(42));
            let mut rng2 = Xorshift64::new(Seed::from_u64(42));
            for _ in 0..100 {
                assert_eq!(rng1.next(), rng2.next());
            }
        }

        #[test]
        fn test_xorshift_zero_seed_is_not_stuck() {
            let mut rng = Xorshift64::new(Seed::from_u64(0));
            assert_ne!(rng.next(), 0);
        }
    }

    mod picker_tests {
        use super::*;

        #[test]
        fn test_zero_options_is_an_error() {
            let mut picker = OptionPicker::new(Seed::from_u64(1));
            let err = picker.pick(SelectionPolicy::Random, 0, "company").unwrap_err();
            assert!(matches!(err, ProbeError::NoOptions { ref field } if field == "company"));
        }

        #[test]
        fn test_first_policy_with_zero_options_is_an_error() {
            let mut picker = OptionPicker::new(Seed::from_u64(1));
            assert!(picker.pick(SelectionPolicy::First, 0, "location").is_err());
        }

        #[test]
        fn test_first_policy_always_zero() {
            let mut picker = OptionPicker::new(Seed::from_u64(9));
            for count in 1..20 {
                assert_eq!(picker.pick(SelectionPolicy::First, count, "assignee").unwrap(), 0);
            }
        }

        #[test]
        fn test_same_seed_same_picks() {
            let mut a = OptionPicker::new(Seed::from_u64(777));
            let mut b = OptionPicker::new(Seed::from_u64(777));
            let picks_a: Vec<usize> = (0..10)
                .map(|_| a.pick(SelectionPolicy::Random, 13, "company").unwrap())
                .collect();
            let picks_b: Vec<usize> = (0..10)
                .map(|_| b.pick(SelectionPolicy::Random, 13, "company").unwrap())
                .collect();
            assert_eq!(picks_a, picks_b);
        }

        #[test]
        fn test_policy_serde() {
            let p: SelectionPolicy = serde_yaml_ng::from_str("random").unwrap();
            assert_eq!(p, SelectionPolicy::Random);
            assert_eq!(SelectionPolicy::default(), SelectionPolicy::First);
        }
    }

    proptest! {
        #[test]
        fn prop_random_pick_in_range(seed in any::<u64>(), count in 1usize..500) {
            let mut picker = OptionPicker::new(Seed::from_u64(seed));
            let index = picker.pick(SelectionPolicy::Random, count, "company").unwrap();
            prop_assert!(index < count);
        }
    }
}
