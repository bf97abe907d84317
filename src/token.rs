use std::fmt;

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Amber,
    Bronze,
    Copper,
    Desert,
}

impl Kind {
    pub fn all() -> Vec<Kind> {
        vec![Kind::Amber, Kind::Bronze, Kind::Copper, Kind::Desert]
    }

    /// Energy spent per step, growing tenfold with each rank.
    pub fn cost_multiplier(&self) -> i64 {
        match self {
            Kind::Amber => 1,
            Kind::Bronze => 10,
            Kind::Copper => 100,
            Kind::Desert => 1000,
        }
    }

    pub fn rank(&self) -> usize {
        match self {
            Kind::Amber => 0,
            Kind::Bronze => 1,
            Kind::Copper => 2,
            Kind::Desert => 3,
        }
    }

    pub fn by_rank(rank: usize) -> Option<Kind> {
        Kind::all().get(rank).copied()
    }
}

impl TryFrom<char> for Kind {
    type Error = ParseError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'A' => Ok(Kind::Amber),
            'B' => Ok(Kind::Bronze),
            'C' => Ok(Kind::Copper),
            'D' => Ok(Kind::Desert),
            _ => Err(ParseError::UnknownSymbol(value)),
        }
    }
}

impl From<Kind> for char {
    fn from(value: Kind) -> Self {
        match value {
            Kind::Amber => 'A',
            Kind::Bronze => 'B',
            Kind::Copper => 'C',
            Kind::Desert => 'D',
        }
    }
}

/// A single movable piece. Only its position ever changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token {
    kind: Kind,
}

impl Token {
    pub fn new(kind: Kind) -> Token {
        Token { kind }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn cost_multiplier(&self) -> i64 {
        self.kind.cost_multiplier()
    }
}

impl From<Kind> for Token {
    fn from(kind: Kind) -> Token {
        Token::new(kind)
    }
}

impl TryFrom<char> for Token {
    type Error = ParseError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        Kind::try_from(value).map(Token::new)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", char::from(self.kind))
    }
}
