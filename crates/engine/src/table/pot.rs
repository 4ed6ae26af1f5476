// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! The hand pot.
use showdown_core::poker::Chips;

/// A pot that accumulates the players commitments as they are made.
#[derive(Debug, Default)]
pub struct Pot {
    chips: Chips,
}

impl Pot {
    /// Adds committed chips to the pot.
    pub fn add(&mut self, chips: Chips) {
        self.chips += chips;
    }

    /// The chips in the pot.
    pub fn chips(&self) -> Chips {
        self.chips
    }

    /// Empties the pot and returns all its chips to a single winner.
    pub fn award(&mut self) -> Chips {
        std::mem::take(&mut self.chips)
    }

    /// Empties the pot splitting it among `winners` tied players.
    ///
    /// Winners must be in seat order starting from the seat after the button,
    /// the first winner gets the chips left over by the integer division.
    pub fn split(&mut self, winners: usize) -> Vec<Chips> {
        if winners == 0 {
            return Vec::default();
        }

        let chips = self.award();
        let share = chips / winners as u32;
        let remainder = chips % winners as u32;

        let mut payoffs = vec![share; winners];
        payoffs[0] += remainder;
        payoffs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn award_empties_pot() {
        let mut pot = Pot::default();
        pot.add(Chips::new(10));
        pot.add(Chips::new(20));
        assert_eq!(pot.chips(), Chips::new(30));

        assert_eq!(pot.award(), Chips::new(30));
        assert_eq!(pot.chips(), Chips::ZERO);
    }

    #[test]
    fn split_remainder_to_first_winner() {
        let mut pot = Pot::default();
        pot.add(Chips::new(41));
        assert_eq!(pot.split(2), vec![Chips::new(21), Chips::new(20)]);
        assert!(pot.chips().is_zero());

        pot.add(Chips::new(100));
        let payoffs = pot.split(3);
        assert_eq!(payoffs, vec![Chips::new(34), Chips::new(33), Chips::new(33)]);
        assert_eq!(payoffs.into_iter().sum::<Chips>(), Chips::new(100));
    }

    #[test]
    fn split_without_winners_keeps_chips() {
        let mut pot = Pot::default();
        pot.add(Chips::new(10));
        assert!(pot.split(0).is_empty());
        assert_eq!(pot.chips(), Chips::new(10));
    }
}
