//! Gate slots and the derived game phase.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ordinal identifying one of the extra-piece slots agreed for a game;
/// 0 is the `NONE` sentinel. At most `Gate::NB - 1` gating pieces are
/// placed per color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Gate(pub(crate) u8);

impl Gate {
    pub const NONE: Gate = Gate(0);
    pub const G1: Gate = Gate(1);
    pub const G2: Gate = Gate(2);
    pub const NB: usize = 3;

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    #[must_use]
    pub(crate) const fn next(self) -> Gate {
        Gate(self.0 + 1)
    }

    #[inline]
    #[must_use]
    pub(crate) const fn prev(self) -> Gate {
        Gate(self.0 - 1)
    }
}

/// The variant's game phase, derived from the gating counters and never
/// stored: first both sides agree on the extra piece types, then each
/// side places them on its first rank, then normal play begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GamePhase {
    Selection,
    Placing,
    Playing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_ordering() {
        assert!(Gate::NONE < Gate::G1);
        assert_eq!(Gate::NONE.next(), Gate::G1);
        assert_eq!(Gate::G2.prev(), Gate::G1);
        assert_eq!(Gate::G2.index(), 2);
    }
}
