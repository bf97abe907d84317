use im::Vector;

use crate::error::{IllegalMove, ParseError};
use crate::token::Token;

/// The shared line of single occupancy cells. Some cells are the entrance of a slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Corridor {
    cells: Vector<Option<Token>>,
    // cell -> slot bound there
    entrances: Vector<Option<usize>>,
    // slot -> its entrance cell
    doors: Vector<usize>,
}

impl Corridor {
    pub fn new(length: usize) -> Corridor {
        Corridor::from_cells(vec![None; length])
    }

    pub fn from_cells(cells: Vec<Option<Token>>) -> Corridor {
        let length = cells.len();
        Corridor {
            cells: cells.into_iter().collect(),
            entrances: std::iter::repeat(None).take(length).collect(),
            doors: Vector::new(),
        }
    }

    /// Bind the next slot to `cell`, returning the slot's index.
    pub fn bind(&mut self, cell: usize) -> Result<usize, ParseError> {
        if cell >= self.len() {
            return Err(ParseError::EntranceOutOfRange {
                entrance: cell,
                length: self.len(),
            });
        }
        if self.entrances[cell].is_some() {
            return Err(ParseError::DuplicateEntrance(cell));
        }

        let slot = self.doors.len();
        self.entrances.set(cell, Some(slot));
        self.doors.push_back(cell);
        Ok(slot)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, cell: usize) -> Option<Token> {
        self.cells.get(cell).copied().flatten()
    }

    pub fn is_free(&self, cell: usize) -> bool {
        self.get(cell).is_none()
    }

    /// No token anywhere in the corridor.
    pub fn is_clear(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// The slot bound to this cell, if any.
    pub fn slot_at(&self, cell: usize) -> Option<usize> {
        self.entrances.get(cell).copied().flatten()
    }

    pub fn is_entrance(&self, cell: usize) -> bool {
        self.slot_at(cell).is_some()
    }

    pub fn entrance_of(&self, slot: usize) -> Option<usize> {
        self.doors.get(slot).copied()
    }

    pub fn slot_count(&self) -> usize {
        self.doors.len()
    }

    pub fn occupied(&self) -> impl Iterator<Item = (usize, Token)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(cell, token)| token.map(|token| (cell, token)))
    }

    /// Every cell strictly between the endpoints must be free. The endpoints
    /// themselves are the caller's business.
    pub fn can_traverse(&self, from: usize, to: usize) -> bool {
        let (low, high) = if from < to { (from, to) } else { (to, from) };
        (low + 1..high).all(|cell| self.is_free(cell))
    }

    pub fn distance(&self, a: usize, b: usize) -> usize {
        a.abs_diff(b)
    }

    pub fn place(&self, cell: usize, token: Token) -> Result<Corridor, IllegalMove> {
        if !self.is_free(cell) {
            return Err(IllegalMove::CellOccupied(cell));
        }

        let mut next = self.clone();
        next.cells.set(cell, Some(token));
        Ok(next)
    }

    pub fn remove(&self, cell: usize) -> Result<(Corridor, Token), IllegalMove> {
        let token = self.get(cell).ok_or(IllegalMove::CellEmpty(cell))?;

        let mut next = self.clone();
        next.cells.set(cell, None);
        Ok((next, token))
    }
}
