use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Supplies piece kinds using the 7-bag randomizer.
///
/// Every run of seven pieces drawn from a bag boundary contains each kind exactly once,
/// in shuffled order. The following bag is shuffled ahead of time so at least seven
/// upcoming pieces can always be previewed.
///
/// # Example
///
/// ```
/// use kickstack_engine::{PieceBuffer, PieceSeed};
///
/// let mut buffer = PieceBuffer::with_seed(PieceSeed::from_u128(7));
/// let preview: Vec<_> = buffer.next_pieces().take(3).collect();
/// assert_eq!(buffer.pop_next(), preview[0]);
/// ```
#[derive(Debug, Clone)]
pub struct PieceBuffer {
    rng: Pcg32,
    current: [PieceKind; PieceKind::LEN],
    upcoming: [PieceKind; PieceKind::LEN],
    cursor: usize,
}

/// 128-bit seed for a [`PieceBuffer`].
///
/// Serialized as a 32-character hex string so it can be recorded next to results and
/// replayed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    #[must_use]
    pub const fn from_u128(seed: u128) -> Self {
        Self(seed.to_be_bytes())
    }

    #[must_use]
    pub const fn as_u128(self) -> u128 {
        u128::from_be_bytes(self.0)
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:032x}", self.as_u128()))
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        if hex_str.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            )));
        }
        let num = u128::from_str_radix(&hex_str, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid hex: {hex_str} ({e})")))?;
        Ok(Self::from_u128(num))
    }
}

impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

impl PieceBuffer {
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        let mut rng = Pcg32::from_seed(seed.0);
        let current = shuffled_bag(&mut rng);
        let upcoming = shuffled_bag(&mut rng);
        Self {
            rng,
            current,
            upcoming,
            cursor: 0,
        }
    }

    /// Draws the next piece, shuffling a fresh bag once the current one runs out.
    pub fn pop_next(&mut self) -> PieceKind {
        let kind = self.current[self.cursor];
        self.cursor += 1;
        if self.cursor == PieceKind::LEN {
            self.current = self.upcoming;
            self.upcoming = shuffled_bag(&mut self.rng);
            self.cursor = 0;
        }
        kind
    }

    /// Upcoming pieces in draw order; always yields at least seven.
    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.current[self.cursor..]
            .iter()
            .chain(&self.upcoming)
            .copied()
    }
}

fn shuffled_bag<R: Rng + ?Sized>(rng: &mut R) -> [PieceKind; PieceKind::LEN] {
    let mut bag = PieceKind::ALL;
    bag.shuffle(rng);
    bag
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_every_bag_holds_each_kind_once() {
        let mut buffer = PieceBuffer::with_seed(PieceSeed::from_u128(0x1234));
        for _ in 0..10 {
            let bag = (0..PieceKind::LEN)
                .map(|_| buffer.pop_next())
                .collect::<HashSet<_>>();
            assert_eq!(bag.len(), PieceKind::LEN);
        }
    }

    #[test]
    fn test_preview_matches_draws() {
        let mut buffer = PieceBuffer::with_seed(PieceSeed::from_u128(99));
        for _ in 0..20 {
            let preview = buffer.next_pieces().collect::<Vec<_>>();
            assert!(preview.len() >= PieceKind::LEN);
            assert_eq!(buffer.pop_next(), preview[0]);
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let seed = PieceSeed::from_u128(0x0123_4567_89ab_cdef);
        let mut first = PieceBuffer::with_seed(seed);
        let mut second = PieceBuffer::with_seed(seed);
        for _ in 0..30 {
            assert_eq!(first.pop_next(), second.pop_next());
        }
    }

    #[test]
    fn test_seed_serializes_as_hex() {
        let seed = PieceSeed::from_u128(0x0123_4567_89ab_cdef_fedc_ba98_7654_3210);
        let serialized = serde_json::to_string(&seed).unwrap();
        assert_eq!(serialized, "\"0123456789abcdeffedcba9876543210\"");
        let deserialized: PieceSeed = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, seed);

        let upper: PieceSeed =
            serde_json::from_str("\"0123456789ABCDEFFEDCBA9876543210\"").unwrap();
        assert_eq!(upper, seed);
    }

    #[test]
    fn test_seed_rejects_bad_hex() {
        for json in [
            "\"\"",
            "\"0123456789abcdef0123456789abcde\"",
            "\"ghijklmnopqrstuvwxyzghijklmnopqr\"",
        ] {
            let err = serde_json::from_str::<PieceSeed>(json).unwrap_err();
            assert!(err.to_string().contains("invalid hex"), "{json}");
        }
    }
}
