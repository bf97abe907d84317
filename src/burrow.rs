use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use im::Vector;

use crate::corridor::Corridor;
use crate::error::ParseError;
use crate::slot::Slot;
use crate::token::{Kind, Token};
use crate::State;

/// The two rows folded out of the classic diagram, inserted beneath the top row.
pub const UNFOLDED_ROWS: [&str; 2] = ["#D#C#B#A#", "#D#B#A#C#"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Corridor(usize),
    Slot(usize),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Location::Corridor(cell) => write!(f, "cell {cell}"),
            Location::Slot(slot) => write!(f, "slot {slot}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub token: Token,
    pub from: Location,
    pub to: Location,
    pub cost: i64,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {} -> {} ({})", self.token, self.from, self.to, self.cost)
    }
}

/// A snapshot of where every token sits.
///
/// Equality and hashing only look at the layout; the cost of reaching a
/// configuration is tracked by the solver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Configuration {
    corridor: Corridor,
    slots: Vector<Slot>,
}

impl Configuration {
    /// Build from the corridor's initial cells and `(entrance cell, slot)` pairs.
    pub fn new(cells: Vec<Option<Token>>, slots: Vec<(usize, Slot)>) -> Result<Self, ParseError> {
        let mut corridor = Corridor::from_cells(cells);
        let mut bound = Vector::new();

        for (entrance, slot) in slots {
            corridor.bind(entrance)?;
            bound.push_back(slot);
        }

        Ok(Configuration {
            corridor,
            slots: bound,
        })
    }

    pub fn corridor(&self) -> &Corridor {
        &self.corridor
    }

    pub fn slots(&self) -> impl Iterator<Item = &Slot> + '_ {
        self.slots.iter()
    }

    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// Every token in the configuration, sorted by kind.
    pub fn tokens(&self) -> Vec<Token> {
        let mut tokens = self
            .corridor
            .occupied()
            .map(|(_, token)| token)
            .chain(self.slots.iter().flat_map(|slot| slot.contents()))
            .collect::<Vec<_>>();
        tokens.sort();
        tokens
    }

    pub fn is_terminal(&self) -> bool {
        self.corridor.is_clear() && self.slots.iter().all(Slot::is_settled)
    }

    fn door(&self, slot: usize) -> usize {
        match self.corridor.entrance_of(slot) {
            Some(cell) => cell,
            None => unreachable!("slot {slot} has no entrance"),
        }
    }

    /// Every configuration one move away, with the cost of that move.
    pub fn successors(&self) -> Vec<(i64, Move, Configuration)> {
        let mut next_states = Vec::new();

        // Corridor -> slot
        for (cell, token) in self.corridor.occupied() {
            for (index, slot) in self.slots.iter().enumerate() {
                let entrance = self.door(index);
                if cell != entrance && !self.corridor.is_free(entrance) {
                    continue;
                }
                if !self.corridor.can_traverse(cell, entrance) {
                    continue;
                }
                let Some((slot, depth)) = slot.place(token) else {
                    continue;
                };

                let corridor = match self.corridor.remove(cell) {
                    Ok((corridor, _)) => corridor,
                    Err(err) => unreachable!("{err}"),
                };
                let cost = (self.corridor.distance(cell, entrance) + depth) as i64
                    * token.cost_multiplier();

                next_states.push((
                    cost,
                    Move {
                        token,
                        from: Location::Corridor(cell),
                        to: Location::Slot(index),
                        cost,
                    },
                    Configuration {
                        corridor,
                        slots: self.slots.update(index, slot),
                    },
                ));
            }
        }

        // Slot -> corridor
        for (index, slot) in self.slots.iter().enumerate() {
            let entrance = self.door(index);
            if !self.corridor.is_free(entrance) {
                continue;
            }
            let Some((slot, token, depth)) = slot.take_topmost() else {
                continue;
            };
            let slots = self.slots.update(index, slot);

            for cell in 0..self.corridor.len() {
                if self.corridor.is_entrance(cell)
                    || !self.corridor.is_free(cell)
                    || !self.corridor.can_traverse(entrance, cell)
                {
                    continue;
                }

                let corridor = match self.corridor.place(cell, token) {
                    Ok(corridor) => corridor,
                    Err(err) => unreachable!("{err}"),
                };
                let cost = (depth + self.corridor.distance(entrance, cell)) as i64
                    * token.cost_multiplier();

                next_states.push((
                    cost,
                    Move {
                        token,
                        from: Location::Slot(index),
                        to: Location::Corridor(cell),
                        cost,
                    },
                    Configuration {
                        corridor,
                        slots: slots.clone(),
                    },
                ));
            }
        }

        next_states
    }

    /// Deepen every slot with extra rows, each row holding one token per slot.
    pub fn unfold<S: AsRef<str>>(&self, rows: &[S]) -> Result<Configuration, ParseError> {
        let mut columns = vec![Vec::new(); self.slots.len()];

        for row in rows {
            let row = row.as_ref();
            let tokens = row
                .chars()
                .filter(|c| *c != '#' && !c.is_whitespace())
                .map(Token::try_from)
                .collect::<Result<Vec<_>, _>>()?;

            if tokens.len() != self.slots.len() {
                return Err(ParseError::RowLength {
                    row: row.to_string(),
                    found: tokens.len(),
                    expected: self.slots.len(),
                });
            }

            for (column, token) in columns.iter_mut().zip(tokens) {
                column.push(token);
            }
        }

        let mut slots = Vector::new();
        for (index, (slot, column)) in self.slots.iter().zip(columns).enumerate() {
            slots.push_back(slot.unfold(&column, self.door(index))?);
        }

        Ok(Configuration {
            corridor: self.corridor.clone(),
            slots,
        })
    }
}

impl<G> State<G, Move> for Configuration {
    fn next_states(&self, _global: &G) -> Option<Vec<(i64, Move, Configuration)>> {
        let next_states = self.successors();
        if next_states.is_empty() {
            None
        } else {
            Some(next_states)
        }
    }

    fn heuristic(&self, _global: &G) -> i64 {
        0
    }

    fn is_valid(&self, _global: &G) -> bool {
        true
    }

    fn is_solved(&self, _global: &G) -> bool {
        self.is_terminal()
    }

    fn stringify(&self, _global: &G) -> String {
        self.to_string()
    }
}

impl FromStr for Configuration {
    type Err = ParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let lines = input
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>();

        // First line is the top wall, second is the corridor
        // Columns are char indices, shared with the slot lines below
        let corridor_line = lines
            .get(1)
            .ok_or(ParseError::MissingCorridor)?
            .chars()
            .collect::<Vec<_>>();
        let is_wall = |c: char| c == '#' || c.is_whitespace();
        let start = corridor_line
            .iter()
            .position(|c| !is_wall(*c))
            .ok_or(ParseError::MissingCorridor)?;
        let end = corridor_line
            .iter()
            .rposition(|c| !is_wall(*c))
            .ok_or(ParseError::MissingCorridor)?;

        let cells = corridor_line[start..=end]
            .iter()
            .map(|&c| match c {
                '.' => Ok(None),
                _ => Token::try_from(c).map(Some),
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Every other line contributes one position (top to bottom) to each slot column
        let mut columns: BTreeMap<usize, Vec<Option<Token>>> = BTreeMap::new();
        for line in lines.iter().skip(2) {
            for (column, c) in line.chars().enumerate() {
                let position = match c {
                    _ if is_wall(c) => continue,
                    '.' => None,
                    _ => Some(Token::try_from(c)?),
                };
                columns.entry(column).or_default().push(position);
            }
        }

        let max = Kind::all().len();
        if columns.len() > max {
            return Err(ParseError::TooManySlots {
                count: columns.len(),
                max,
            });
        }

        let mut slots = Vec::new();
        for (rank, (column, positions)) in columns.into_iter().enumerate() {
            let entrance = match column.checked_sub(start) {
                Some(entrance) if entrance < cells.len() => entrance,
                _ => {
                    return Err(ParseError::EntranceOutOfRange {
                        entrance: column.saturating_sub(start),
                        length: cells.len(),
                    })
                }
            };

            if positions
                .iter()
                .skip_while(|position| position.is_none())
                .any(Option::is_none)
            {
                return Err(ParseError::FloatingToken { entrance });
            }

            let contents = positions.iter().rev().flatten().copied().collect::<Vec<_>>();
            let kind = Kind::by_rank(rank).ok_or(ParseError::TooManySlots {
                count: rank + 1,
                max,
            })?;

            log::debug!("slot {rank} at cell {entrance} holds {contents:?}");
            slots.push((entrance, Slot::new(kind, positions.len(), &contents)?));
        }

        Configuration::new(cells, slots)
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let width = self.corridor.len() + 2;
        let depth = self.slots.iter().map(Slot::capacity).max().unwrap_or(0);

        writeln!(f, "{}", "#".repeat(width))?;

        let mut line = String::from("#");
        for cell in 0..self.corridor.len() {
            line.push(self.corridor.get(cell).map_or('.', |token| token.kind().into()));
        }
        line.push('#');
        writeln!(f, "{line}")?;

        for row in 0..depth {
            let mut line = String::from("#");
            for cell in 0..self.corridor.len() {
                let position = self
                    .corridor
                    .slot_at(cell)
                    .and_then(|index| self.slots.get(index))
                    .and_then(|slot| slot.positions().get(row));

                line.push(match position {
                    Some(Some(token)) => token.kind().into(),
                    Some(None) => '.',
                    None => '#',
                });
            }
            line.push('#');
            writeln!(f, "{line}")?;
        }

        write!(f, "{}", "#".repeat(width))
    }
}
