use thiserror::Error;

/// Raised while building a configuration from a diagram or from parts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown symbol `{0}`")]
    UnknownSymbol(char),

    #[error("Missing corridor line")]
    MissingCorridor,

    #[error("Slot capacity must be positive")]
    EmptySlot,

    #[error("Slot holds {count} tokens but only has room for {capacity}")]
    Overfull { capacity: usize, count: usize },

    #[error("Slot at cell {entrance} has a gap beneath a token")]
    FloatingToken { entrance: usize },

    #[error("Entrance {entrance} is outside a corridor of length {length}")]
    EntranceOutOfRange { entrance: usize, length: usize },

    #[error("Cell {0} is bound to more than one slot")]
    DuplicateEntrance(usize),

    #[error("Found {count} slots, but there are only {max} kinds")]
    TooManySlots { count: usize, max: usize },

    #[error("Row `{row}` has {found} tokens for {expected} slots")]
    RowLength {
        row: String,
        found: usize,
        expected: usize,
    },
}

/// A corridor edit that breaks single occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IllegalMove {
    #[error("Cell {0} is already occupied")]
    CellOccupied(usize),

    #[error("Cell {0} is empty")]
    CellEmpty(usize),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("No solution found after {states} states")]
    Unsolvable { states: usize },

    #[error("Search budget exceeded after {states} states in {seconds} seconds")]
    BudgetExceeded { states: usize, seconds: f32 },
}
