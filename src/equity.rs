use std::cmp::Ordering;

use itertools::Itertools;
use rand::Rng;

use crate::cards::{Card, remaining_deck};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum HandCategory {
    HighCard = 1,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

/// Category plus tiebreak ranks, most significant first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandStrength {
    pub category: HandCategory,
    pub tiebreak: Vec<u8>,
}

impl PartialOrd for HandStrength {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HandStrength {
    fn cmp(&self, other: &Self) -> Ordering {
        self.category
            .cmp(&other.category)
            .then_with(|| self.tiebreak.cmp(&other.tiebreak))
    }
}

/// Highest card of a five-high-or-better straight in `ranks`, if any.
fn straight_high(ranks: &[u8]) -> Option<u8> {
    let mut mask: u16 = 0;
    for &rank in ranks {
        mask |= 1 << rank;
        if rank == 14 {
            mask |= 1 << 1;
        }
    }
    (5u8..=14)
        .rev()
        .find(|&high| (0..5).all(|step| mask & (1 << (high - step)) != 0))
}

fn evaluate_five(cards: &[Card]) -> HandStrength {
    let mut ranks: Vec<u8> = cards.iter().map(Card::rank_value).collect();
    ranks.sort_unstable_by(|a, b| b.cmp(a));

    let flush = cards.iter().map(|card| card.suit).all_equal();
    let straight = if ranks.iter().all_unique() {
        straight_high(&ranks)
    } else {
        None
    };

    // (count, rank) largest group first, ties broken by rank.
    let groups: Vec<(usize, u8)> = ranks
        .iter()
        .copied()
        .counts()
        .into_iter()
        .map(|(rank, count)| (count, rank))
        .sorted_unstable_by(|a, b| b.cmp(a))
        .collect();
    let by_group: Vec<u8> = groups.iter().map(|&(_, rank)| rank).collect();
    let shape: Vec<usize> = groups.iter().map(|&(count, _)| count).collect();

    let (category, tiebreak) = match (straight, flush, shape.as_slice()) {
        (Some(high), true, _) => (HandCategory::StraightFlush, vec![high]),
        (_, _, [4, 1]) => (HandCategory::FourOfAKind, by_group),
        (_, _, [3, 2]) => (HandCategory::FullHouse, by_group),
        (_, true, _) => (HandCategory::Flush, ranks),
        (Some(high), false, _) => (HandCategory::Straight, vec![high]),
        (_, _, [3, 1, 1]) => (HandCategory::ThreeOfAKind, by_group),
        (_, _, [2, 2, 1]) => (HandCategory::TwoPair, by_group),
        (_, _, [2, 1, 1, 1]) => (HandCategory::OnePair, by_group),
        _ => (HandCategory::HighCard, ranks),
    };
    HandStrength { category, tiebreak }
}

/// Best five-card hand out of five to seven cards. Fewer than five cards has no hand.
pub fn best_hand(cards: &[Card]) -> Option<HandStrength> {
    if cards.len() < 5 {
        return None;
    }
    cards
        .iter()
        .copied()
        .combinations(5)
        .map(|combo| evaluate_five(&combo))
        .max()
}

/// Monte Carlo share of the pot won by `hole` against `opponents` random hands,
/// completing the board from the remaining deck. Ties split evenly.
pub fn simulate_equity<R: Rng + ?Sized>(
    hole: &[Card; 2],
    board: &[Card],
    opponents: usize,
    samples: u32,
    rng: &mut R,
) -> f64 {
    let samples = samples.max(1);
    let opponents = opponents.max(1);
    let mut dead = hole.to_vec();
    dead.extend_from_slice(board);

    let mut won = 0.0f64;
    for _ in 0..samples {
        let mut deck = remaining_deck(rng, &dead);
        let mut full_board = board.to_vec();
        full_board.extend(deck.drain(..5 - board.len().min(5)));

        let ours = best_hand(&[&hole[..], &full_board[..]].concat());
        let mut best_theirs = None;
        let mut tied = 1usize;
        for chunk in deck.chunks_exact(2).take(opponents) {
            let theirs = best_hand(&[chunk, &full_board[..]].concat());
            match theirs.cmp(&best_theirs) {
                Ordering::Greater => {
                    best_theirs = theirs;
                    tied = 1;
                }
                Ordering::Equal => tied += 1,
                Ordering::Less => {}
            }
        }

        match ours.cmp(&best_theirs) {
            Ordering::Greater => won += 1.0,
            Ordering::Equal => won += 1.0 / (tied + 1) as f64,
            Ordering::Less => {}
        }
    }

    won / samples as f64
}
