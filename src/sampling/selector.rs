use crate::error::Result;
use crate::sampling::policy::SelectionPolicy;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

pub trait Selector: Send + Sync {
    fn select(&self, total_tokens: usize) -> Result<InclusionMask>;
}

/// One flag per token; `true` keeps the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionMask {
    flags: Vec<bool>,
}

impl InclusionMask {
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn is_included(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(false)
    }

    pub fn included_count(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }

    /// Indices of kept tokens, ascending.
    pub fn selected_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.flags
            .iter()
            .enumerate()
            .filter_map(|(i, &f)| f.then_some(i))
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.flags
    }
}

impl From<Vec<bool>> for InclusionMask {
    fn from(flags: Vec<bool>) -> Self {
        Self { flags }
    }
}

/// Marks the first `k` tokens and shuffles the whole mask.
///
/// Each call seeds its own generator, so equal `(total, policy, seed)`
/// always give the same mask.
#[derive(Debug, Clone, Copy)]
pub struct ShuffleSelector {
    pub policy: SelectionPolicy,
    pub seed: u64,
}

impl ShuffleSelector {
    pub fn new(policy: SelectionPolicy, seed: u64) -> Self {
        Self { policy, seed }
    }
}

impl Selector for ShuffleSelector {
    fn select(&self, total_tokens: usize) -> Result<InclusionMask> {
        let keep = self.policy.resolve(total_tokens)?;

        let mut flags = vec![false; total_tokens];
        flags[..keep].fill(true);

        let mut rng = StdRng::seed_from_u64(self.seed);
        flags.shuffle(&mut rng);

        Ok(InclusionMask { flags })
    }
}

pub fn select(total_tokens: usize, policy: SelectionPolicy, seed: u64) -> Result<InclusionMask> {
    ShuffleSelector::new(policy, seed).select(total_tokens)
}
