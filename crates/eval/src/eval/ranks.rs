// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Rank frequencies and bitmasks for a set of cards.
use showdown_cards::{Card, Rank};

/// Bit mask for all 13 ranks, bit 0 is a deuce and bit 12 an ace.
const ALL_RANKS: u16 = 0x1fff;

/// Ranks counts and per suit ranks bitmasks for up to 7 cards.
#[derive(Debug, Default)]
pub(super) struct RankCounts {
    counts: [u8; 13],
    suits: [u16; 4],
    suit_counts: [u8; 4],
}

impl RankCounts {
    pub fn new(cards: &[Card]) -> Self {
        let mut rc = Self::default();
        for card in cards {
            let (rank, suit) = (card.rank().index(), card.suit().index());
            rc.counts[rank] += 1;
            rc.suits[suit] |= 1 << rank;
            rc.suit_counts[suit] += 1;
        }

        rc
    }

    /// Bitmask of the ranks in the set.
    pub fn ranks_mask(&self) -> u16 {
        self.suits.iter().fold(0, |acc, s| acc | s) & ALL_RANKS
    }

    /// Ranks bitmask of the suit with at least 5 cards, if any.
    pub fn flush_mask(&self) -> Option<u16> {
        self.suit_counts
            .iter()
            .position(|&n| n >= 5)
            .map(|suit| self.suits[suit])
    }

    /// Ranks with exactly `n` cards from highest to lowest.
    pub fn ranks_with_count(&self, n: u8) -> impl Iterator<Item = Rank> + '_ {
        Rank::ranks().rev().filter(move |r| self.counts[r.index()] == n)
    }
}

/// Returns the top card of the highest straight in the ranks bitmask.
pub(super) fn straight_top(mask: u16) -> Option<Rank> {
    // Shift ranks up by one and copy the ace in bit 0 so that A-2-3-4-5 is a
    // run of five bits like any other straight.
    let ext = (u32::from(mask) << 1) | ((u32::from(mask) >> 12) & 1);

    (4..=13).rev().find_map(|top| {
        let run: u32 = 0b11111 << (top - 4);
        if (ext & run) == run {
            Rank::from_index(top - 1)
        } else {
            None
        }
    })
}

/// Returns the highest rank in a non empty ranks bitmask.
pub(super) fn highest(mask: u16) -> Rank {
    debug_assert!(mask & ALL_RANKS != 0);
    let idx = 15 - (mask & ALL_RANKS).leading_zeros() as usize;
    Rank::from_index(idx).unwrap_or(Rank::Deuce)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(ranks: &[Rank]) -> u16 {
        ranks.iter().fold(0, |acc, r| acc | 1 << r.index())
    }

    #[test]
    fn straights() {
        use Rank::*;

        assert_eq!(straight_top(mask(&[Ace, Deuce, Trey, Four, Five])), Some(Five));
        assert_eq!(straight_top(mask(&[Ten, Jack, Queen, King, Ace])), Some(Ace));
        assert_eq!(
            straight_top(mask(&[Ace, Deuce, Trey, Four, Five, Six, Nine])),
            Some(Six)
        );
        assert_eq!(straight_top(mask(&[Queen, King, Ace, Deuce, Trey])), None);
        assert_eq!(straight_top(mask(&[Deuce, Trey, Four, Five, Seven])), None);
    }

    #[test]
    fn highest_rank() {
        assert_eq!(highest(mask(&[Rank::Deuce])), Rank::Deuce);
        assert_eq!(highest(mask(&[Rank::Deuce, Rank::Nine])), Rank::Nine);
        assert_eq!(highest(mask(&[Rank::Ace, Rank::Trey])), Rank::Ace);
    }
}
