use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rand::Rng;
use rand::seq::SliceRandom;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CardParseError {
    #[error("card token must be a non-empty string")]
    Empty,
    #[error("card token must be exactly 2 characters (rank then suit, e.g. 'Ah')")]
    Length,
    #[error("Invalid rank '{0}' (expected one of 23456789TJQKA)")]
    Rank(char),
    #[error("Invalid suit '{0}' (expected one of c, d, h, s)")]
    Suit(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    pub fn letter(self) -> char {
        match self {
            Suit::Clubs => 'c',
            Suit::Diamonds => 'd',
            Suit::Hearts => 'h',
            Suit::Spades => 's',
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Suit::Clubs => "♣",
            Suit::Diamonds => "♦",
            Suit::Hearts => "♥",
            Suit::Spades => "♠",
        }
    }

    fn from_letter(c: char) -> Result<Self, CardParseError> {
        match c {
            'c' => Ok(Suit::Clubs),
            'd' => Ok(Suit::Diamonds),
            'h' => Ok(Suit::Hearts),
            's' => Ok(Suit::Spades),
            other => Err(CardParseError::Suit(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[repr(u8)]
pub enum Rank {
    Two = 2,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn letter(self) -> char {
        match self {
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        }
    }

    /// Uppercase only: `a` or `t` are rejected so tokens stay unambiguous.
    pub fn from_letter(c: char) -> Result<Self, CardParseError> {
        Rank::ALL
            .into_iter()
            .find(|rank| rank.letter() == c)
            .ok_or(CardParseError::Rank(c))
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// A single playing card, written as a two character token such as `Ah` or `Td`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub fn rank_value(&self) -> u8 {
        self.rank.value()
    }

    /// Human-facing rendering with suit symbols, used by the terminal output only.
    pub fn pretty(&self) -> String {
        format!("{}{}", self.rank.letter(), self.suit.symbol())
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.rank.letter(), self.suit.letter())
    }
}

impl FromStr for Card {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(CardParseError::Empty);
        }
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(rank), Some(suit), None) => {
                Ok(Card::new(Rank::from_letter(rank)?, Suit::from_letter(suit)?))
            }
            _ => Err(CardParseError::Length),
        }
    }
}

pub fn standard_deck() -> Vec<Card> {
    let mut cards = Vec::with_capacity(52);
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            cards.push(Card::new(rank, suit));
        }
    }
    cards
}

/// Deck with the given cards removed, shuffled.
pub fn remaining_deck<R: Rng + ?Sized>(rng: &mut R, dead: &[Card]) -> Vec<Card> {
    let mut deck = standard_deck();
    deck.retain(|card| !dead.contains(card));
    deck.shuffle(rng);
    deck
}

pub fn parse_cards<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Card>, CardParseError> {
    tokens.iter().map(|token| token.as_ref().parse()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_rank_and_suit() {
        for card in standard_deck() {
            let token = card.to_string();
            assert_eq!(token.parse::<Card>(), Ok(card));
        }
        assert_eq!(
            "Th".parse::<Card>().unwrap(),
            Card::new(Rank::Ten, Suit::Hearts)
        );
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert_eq!("".parse::<Card>(), Err(CardParseError::Empty));
        assert!(matches!("A".parse::<Card>(), Err(CardParseError::Length)));
        assert!(matches!("Ahx".parse::<Card>(), Err(CardParseError::Length)));
        assert_eq!("Xh".parse::<Card>(), Err(CardParseError::Rank('X')));
        assert_eq!("1h".parse::<Card>(), Err(CardParseError::Rank('1')));
        assert_eq!("Ax".parse::<Card>(), Err(CardParseError::Suit('x')));
    }

    #[test]
    fn ranks_are_uppercase_and_suits_lowercase() {
        assert_eq!("ah".parse::<Card>(), Err(CardParseError::Rank('a')));
        assert_eq!("ts".parse::<Card>(), Err(CardParseError::Rank('t')));
        assert_eq!("AH".parse::<Card>(), Err(CardParseError::Suit('H')));
    }

    #[test]
    fn ten_is_not_spelled_out() {
        assert!(matches!("10h".parse::<Card>(), Err(CardParseError::Length)));
    }
}
