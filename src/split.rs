//! Split controller: the split pointer and the two moduli of Linear Hashing.
//!
//! `SplitState` is a plain value. It knows nothing about buckets; the map asks
//! it where a hash lives and calls [`SplitState::advance`] once per split.
//!
//! Addressing
//! - `h(x) = x mod low` covers chains `0..low`.
//! - `h2(x) = x mod high` with `high = 2 * low`, so `h2(x)` is either `h(x)`
//!   or `h(x) + low`.
//! - Chains `0..split` of the current round have already been split into
//!   `low..low + split`. A hash whose `h2` lands inside the directory is
//!   therefore addressed by `h2`; otherwise its home chain has not been split
//!   yet and `h` applies.

/// Position of the table within its current doubling round.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SplitState {
    low: usize,
    split: usize,
}

/// Outcome of one [`SplitState::advance`] transition.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SplitStep {
    /// Chain whose entries are redistributed.
    pub source: usize,
    /// Newly appended chain receiving the entries that move.
    pub target: usize,
    /// The split pointer wrapped and the low modulus doubled.
    pub round_complete: bool,
}

impl SplitState {
    /// Starts a round with `initial_modulus` chains and nothing split.
    ///
    /// A zero modulus is clamped to one; `LinHashConfig` rejects it earlier.
    pub const fn new(initial_modulus: usize) -> Self {
        let low = if initial_modulus == 0 { 1 } else { initial_modulus };
        Self { low, split: 0 }
    }

    pub fn low_modulus(&self) -> usize {
        self.low
    }

    pub fn high_modulus(&self) -> usize {
        self.low * 2
    }

    pub fn split_pointer(&self) -> usize {
        self.split
    }

    /// Number of chains the directory holds in this state.
    pub fn chain_count(&self) -> usize {
        self.low + self.split
    }

    /// `h`: low resolution address.
    #[inline]
    pub fn low_index(&self, hash: u64) -> usize {
        (hash % self.low as u64) as usize
    }

    /// `h2`: high resolution address.
    #[inline]
    pub fn high_index(&self, hash: u64) -> usize {
        (hash % self.high_modulus() as u64) as usize
    }

    /// Chain holding `hash`: `h2` when that chain exists, `h` otherwise.
    #[inline]
    pub fn address(&self, hash: u64) -> usize {
        let high = self.high_index(hash);
        if high < self.chain_count() {
            high
        } else {
            self.low_index(hash)
        }
    }

    /// Moves the split pointer one chain forward, wrapping into the next round
    /// when every chain of the current one has been split.
    ///
    /// Entries of `step.source` must be readdressed with the state as it was
    /// *before* this call (its `high_index`).
    pub fn advance(&mut self) -> SplitStep {
        let source = self.split;
        let target = self.low + self.split;
        self.split += 1;
        let round_complete = self.split >= self.low;
        if round_complete {
            self.split = 0;
            self.low *= 2;
        }
        SplitStep {
            source,
            target,
            round_complete,
        }
    }
}

impl Default for SplitState {
    fn default() -> Self {
        Self::new(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: `high_modulus == 2 * low_modulus` and
    /// `chain_count == low_modulus + split_pointer` through several rounds.
    #[test]
    fn moduli_and_chain_count_track_advances() {
        let mut s = SplitState::new(4);
        let mut chains = 4;
        for _ in 0..40 {
            assert_eq!(s.high_modulus(), 2 * s.low_modulus());
            assert_eq!(s.chain_count(), s.low_modulus() + s.split_pointer());
            assert_eq!(s.chain_count(), chains);
            assert!(s.split_pointer() < s.low_modulus());
            let step = s.advance();
            assert_eq!(step.target, chains, "new chain is appended at the end");
            chains += 1;
        }
    }

    /// Invariant: the split pointer walks `0..low`, then the round completes
    /// and the low modulus doubles.
    #[test]
    fn round_completes_after_low_splits() {
        let mut s = SplitState::new(4);
        let steps: Vec<SplitStep> = (0..4).map(|_| s.advance()).collect();
        let sources: Vec<usize> = steps.iter().map(|st| st.source).collect();
        let targets: Vec<usize> = steps.iter().map(|st| st.target).collect();
        assert_eq!(sources, vec![0, 1, 2, 3]);
        assert_eq!(targets, vec![4, 5, 6, 7]);
        assert_eq!(
            steps.iter().map(|st| st.round_complete).collect::<Vec<_>>(),
            vec![false, false, false, true]
        );
        assert_eq!(s.low_modulus(), 8);
        assert_eq!(s.high_modulus(), 16);
        assert_eq!(s.split_pointer(), 0);
    }

    /// Invariant: before a chain is split its hashes use `h`; afterwards the ones
    /// whose `h2` points at the new chain move there.
    #[test]
    fn address_falls_back_to_low_until_chain_split() {
        let mut s = SplitState::new(4);
        // h = 1, h2 = 5
        assert_eq!(s.address(13), 1);
        // h = 1, h2 = 1
        assert_eq!(s.address(9), 1);

        s.advance(); // split chain 0 -> 4
        assert_eq!(s.address(13), 1, "chain 1 not split yet");
        assert_eq!(s.address(12), 4, "h = 0, h2 = 4 after chain 0 split");
        assert_eq!(s.address(8), 0);

        s.advance(); // split chain 1 -> 5
        assert_eq!(s.address(13), 5);
        assert_eq!(s.address(9), 1);
    }

    /// Invariant: a split's source entries land on either the source or the
    /// target chain under the pre-split `h2`.
    #[test]
    fn split_readdressing_stays_within_source_or_target() {
        let mut s = SplitState::new(3);
        for _ in 0..20 {
            let before = s;
            let step = s.advance();
            for hash in 0..200u64 {
                if before.address(hash) != step.source {
                    continue;
                }
                let to = before.high_index(hash);
                assert!(to == step.source || to == step.target);
                assert_eq!(s.address(hash), to, "post-split addressing agrees");
            }
        }
    }

    /// Invariant: every address is a valid chain index.
    #[test]
    fn address_always_in_bounds() {
        let mut s = SplitState::new(5);
        for _ in 0..30 {
            for hash in [0u64, 1, 7, 99, u64::MAX, u64::MAX - 3] {
                assert!(s.address(hash) < s.chain_count());
            }
            s.advance();
        }
    }

    #[test]
    fn zero_modulus_is_clamped() {
        let s = SplitState::new(0);
        assert_eq!(s.low_modulus(), 1);
        assert_eq!(s.address(12345), 0);
    }
}
