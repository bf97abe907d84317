use crate::error::ParseError;
use crate::token::{Kind, Token};

/// A fixed depth stack that only ever wants tokens of one kind.
///
/// Positions are stored from the opening downwards, so index 0 is the
/// position right below the entrance and a token at index `i` sits
/// `i + 1` steps deep.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slot {
    assigned: Kind,
    positions: Vec<Option<Token>>,
}

impl Slot {
    /// Build a slot from its contents listed bottom to top.
    pub fn new(assigned: Kind, capacity: usize, contents: &[Token]) -> Result<Slot, ParseError> {
        if capacity == 0 {
            return Err(ParseError::EmptySlot);
        }
        if contents.len() > capacity {
            return Err(ParseError::Overfull {
                capacity,
                count: contents.len(),
            });
        }

        let mut positions = vec![None; capacity];
        for (i, token) in contents.iter().enumerate() {
            positions[capacity - 1 - i] = Some(*token);
        }

        Ok(Slot {
            assigned,
            positions,
        })
    }

    pub fn assigned_kind(&self) -> Kind {
        self.assigned
    }

    pub fn capacity(&self) -> usize {
        self.positions.len()
    }

    /// Positions from the opening downwards, empty ones included.
    pub fn positions(&self) -> &[Option<Token>] {
        &self.positions
    }

    /// Tokens from the bottom up.
    pub fn contents(&self) -> impl Iterator<Item = Token> + '_ {
        self.positions.iter().rev().flatten().copied()
    }

    pub fn is_happy(&self) -> bool {
        self.positions
            .iter()
            .flatten()
            .all(|token| token.kind() == self.assigned)
    }

    pub fn has_free_position(&self) -> bool {
        self.positions[0].is_none()
    }

    pub fn is_full(&self) -> bool {
        self.positions.iter().all(Option::is_some)
    }

    pub fn is_settled(&self) -> bool {
        self.is_full() && self.is_happy()
    }

    pub fn accepts(&self, token: Token) -> bool {
        token.kind() == self.assigned && self.is_happy() && self.has_free_position()
    }

    /// Depth of the deepest free position, where the next token would land.
    pub fn placement_depth(&self) -> Option<usize> {
        self.positions
            .iter()
            .rposition(Option::is_none)
            .map(|index| index + 1)
    }

    pub fn place(&self, token: Token) -> Option<(Slot, usize)> {
        if !self.accepts(token) {
            return None;
        }

        let depth = self.placement_depth()?;
        let mut next = self.clone();
        next.positions[depth - 1] = Some(token);
        Some((next, depth))
    }

    /// Remove the shallowest token, but only while a foreign token is still inside.
    pub fn take_topmost(&self) -> Option<(Slot, Token, usize)> {
        if self.is_happy() {
            return None;
        }

        let index = self.positions.iter().position(Option::is_some)?;
        let mut next = self.clone();
        let token = next.positions[index].take()?;
        Some((next, token, index + 1))
    }

    /// Insert extra rows (listed top to bottom) right beneath the topmost position.
    pub fn unfold(&self, rows: &[Token], entrance: usize) -> Result<Slot, ParseError> {
        let mut positions = Vec::with_capacity(self.positions.len() + rows.len());
        positions.push(self.positions[0]);
        positions.extend(rows.iter().copied().map(Some));
        positions.extend(self.positions[1..].iter().copied());

        let slot = Slot {
            assigned: self.assigned,
            positions,
        };
        if slot.has_gap() {
            return Err(ParseError::FloatingToken { entrance });
        }
        Ok(slot)
    }

    // An empty position below an occupied one
    fn has_gap(&self) -> bool {
        self.positions
            .iter()
            .skip_while(|position| position.is_none())
            .any(Option::is_none)
    }
}

#[cfg(test)]
mod test_slot {
    use super::*;

    fn tokens(symbols: &str) -> Vec<Token> {
        symbols
            .chars()
            .map(|c| Token::try_from(c).unwrap())
            .collect()
    }

    #[test]
    fn test_new_fills_from_the_bottom() {
        let slot = Slot::new(Kind::Amber, 3, &tokens("BA")).unwrap();

        assert_eq!(slot.capacity(), 3);
        assert_eq!(
            slot.positions(),
            &[None, Some(Token::new(Kind::Amber)), Some(Token::new(Kind::Bronze))]
        );
        assert_eq!(slot.contents().collect::<Vec<_>>(), tokens("BA"));
    }

    #[test]
    fn test_new_rejects_bad_sizes() {
        assert_eq!(
            Slot::new(Kind::Amber, 1, &tokens("AA")),
            Err(ParseError::Overfull {
                capacity: 1,
                count: 2
            })
        );
        assert_eq!(Slot::new(Kind::Amber, 0, &[]), Err(ParseError::EmptySlot));
    }

    #[test]
    fn test_happiness() {
        assert!(Slot::new(Kind::Amber, 2, &[]).unwrap().is_happy());
        assert!(Slot::new(Kind::Amber, 2, &tokens("A")).unwrap().is_happy());
        assert!(!Slot::new(Kind::Amber, 2, &tokens("B")).unwrap().is_happy());
        assert!(!Slot::new(Kind::Amber, 2, &tokens("BA")).unwrap().is_happy());
        assert!(Slot::new(Kind::Amber, 2, &tokens("AA")).unwrap().is_settled());
    }

    #[test]
    fn test_accepts() {
        let empty = Slot::new(Kind::Bronze, 2, &[]).unwrap();
        let blocked = Slot::new(Kind::Bronze, 2, &tokens("A")).unwrap();
        let full = Slot::new(Kind::Bronze, 2, &tokens("BB")).unwrap();

        assert!(empty.accepts(Token::new(Kind::Bronze)));
        assert!(!empty.accepts(Token::new(Kind::Amber)));
        assert!(!blocked.accepts(Token::new(Kind::Bronze)));
        assert!(!full.accepts(Token::new(Kind::Bronze)));
    }

    #[test]
    fn test_place_goes_deepest() {
        let slot = Slot::new(Kind::Copper, 3, &[]).unwrap();

        let (slot, depth) = slot.place(Token::new(Kind::Copper)).unwrap();
        assert_eq!(depth, 3);

        let (slot, depth) = slot.place(Token::new(Kind::Copper)).unwrap();
        assert_eq!(depth, 2);
        assert_eq!(slot.placement_depth(), Some(1));

        assert!(slot.place(Token::new(Kind::Amber)).is_none());
    }

    #[test]
    fn test_take_topmost() {
        let slot = Slot::new(Kind::Amber, 3, &tokens("BA")).unwrap();

        let (slot, token, depth) = slot.take_topmost().unwrap();
        assert_eq!(token.kind(), Kind::Amber);
        assert_eq!(depth, 2);

        let (slot, token, depth) = slot.take_topmost().unwrap();
        assert_eq!(token.kind(), Kind::Bronze);
        assert_eq!(depth, 3);

        assert!(slot.take_topmost().is_none());
    }

    #[test]
    fn test_happy_slots_offer_nothing() {
        let partial = Slot::new(Kind::Amber, 2, &tokens("A")).unwrap();
        let full = Slot::new(Kind::Amber, 2, &tokens("AA")).unwrap();

        assert!(partial.take_topmost().is_none());
        assert!(full.take_topmost().is_none());
    }

    #[test]
    fn test_unfold() {
        let slot = Slot::new(Kind::Amber, 2, &tokens("AB")).unwrap();
        let unfolded = slot.unfold(&tokens("DD"), 2).unwrap();

        assert_eq!(unfolded.capacity(), 4);
        assert_eq!(unfolded.contents().collect::<Vec<_>>(), tokens("ADDB"));
    }

    #[test]
    fn test_unfold_under_empty_top() {
        let slot = Slot::new(Kind::Amber, 2, &[]).unwrap();

        assert_eq!(
            slot.unfold(&tokens("D"), 4),
            Err(ParseError::FloatingToken { entrance: 4 })
        );
    }
}
