//! This module defines the `Tape`, a conceptually bi-infinite sequence of binary cells
//! with a cursor.
//!
//! The tape is backed by a finite buffer. When the cursor would step past either edge the
//! buffer doubles in the direction of overflow, filling the new half with blank cells, and
//! the cursor is re-based so that growth is invisible to the caller.

use crate::types::{Cell, TallyError, CURSOR_SYMBOL};

/// A growable binary tape with a cursor.
///
/// The cursor is always a valid index into the backing buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<Cell>,
    head: usize,
}

impl Tape {
    /// Creates a tape from existing cells with the cursor at `head`.
    ///
    /// # Returns
    ///
    /// * `Err(TallyError::EmptyTape)` if `cells` is empty.
    /// * `Err(TallyError::InvalidHead)` if `head` is not an index into `cells`.
    pub fn new(cells: Vec<Cell>, head: usize) -> Result<Self, TallyError> {
        if cells.is_empty() {
            return Err(TallyError::EmptyTape);
        }

        if head >= cells.len() {
            return Err(TallyError::InvalidHead {
                head,
                len: cells.len(),
            });
        }

        Ok(Self { cells, head })
    }

    /// Parses a tape from a string of `0` and `1` characters.
    ///
    /// Every `1` becomes a filled cell and every `0` a blank cell. Any other
    /// character is rejected with `TallyError::InvalidTapeSymbol`.
    pub fn parse(input: &str, head: usize) -> Result<Self, TallyError> {
        let cells = input
            .chars()
            .enumerate()
            .map(|(index, c)| {
                Cell::try_from(c).map_err(|symbol| TallyError::InvalidTapeSymbol { index, symbol })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(cells, head)
    }

    /// Returns the cell under the cursor.
    pub fn read(&self) -> Cell {
        self.cells[self.head]
    }

    /// Overwrites the cell under the cursor.
    pub fn write(&mut self, cell: Cell) {
        self.cells[self.head] = cell;
    }

    /// Moves the cursor one position to the left, doubling the buffer on the low side
    /// when the cursor sits on the first cell.
    pub fn move_left(&mut self) {
        if self.head == 0 {
            let size = self.cells.len();
            let mut grown = vec![Cell::Blank; size];
            grown.append(&mut self.cells);
            self.cells = grown;
            self.head += size;
        }

        self.head -= 1;
    }

    /// Moves the cursor one position to the right, doubling the buffer on the high side
    /// when the cursor sits on the last cell.
    pub fn move_right(&mut self) {
        if self.head == self.cells.len() - 1 {
            let size = self.cells.len();
            self.cells.resize(size * 2, Cell::Blank);
        }

        self.head += 1;
    }

    /// Returns the cursor index into the backing buffer.
    pub fn head(&self) -> usize {
        self.head
    }

    /// Returns the number of cells currently allocated.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// A tape always holds at least one cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the backing cells.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Renders the tape as two aligned lines: a cursor marker line and a `0`/`1` content line.
    ///
    /// ```
    /// use tally::tape::Tape;
    ///
    /// let tape = Tape::parse("101", 1).unwrap();
    /// assert_eq!(tape.render(), (" * ".to_string(), "101".to_string()));
    /// ```
    pub fn render(&self) -> (String, String) {
        let cursor_line = (0..self.cells.len())
            .map(|i| if i == self.head { CURSOR_SYMBOL } else { ' ' })
            .collect();
        let tape_line = self.cells.iter().map(|c| c.symbol()).collect();

        (cursor_line, tape_line)
    }

    /// Collapses the tape into its canonical result string.
    ///
    /// Blank cells before the first filled cell and after the last filled cell are dropped,
    /// blanks between filled regions are kept. An all-blank tape collapses to `""`.
    pub fn collapse(&self) -> String {
        let collapsed: String = self
            .cells
            .iter()
            .skip_while(|c| !c.is_filled())
            .map(|c| c.symbol())
            .collect();

        collapsed.trim_end_matches(Cell::Blank.symbol()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_tape() {
        let tape = Tape::parse("0110", 2).unwrap();

        assert_eq!(tape.len(), 4);
        assert_eq!(tape.head(), 2);
        assert_eq!(tape.read(), Cell::Filled);
    }

    #[test]
    fn test_parse_empty_tape() {
        assert_eq!(Tape::parse("", 0), Err(TallyError::EmptyTape));
    }

    #[test]
    fn test_parse_invalid_symbol() {
        assert_eq!(
            Tape::parse("10x1", 0),
            Err(TallyError::InvalidTapeSymbol {
                index: 2,
                symbol: 'x'
            })
        );
    }

    #[test]
    fn test_parse_invalid_head() {
        assert_eq!(
            Tape::parse("101", 3),
            Err(TallyError::InvalidHead { head: 3, len: 3 })
        );
    }

    #[test]
    fn test_write_and_read() {
        let mut tape = Tape::parse("0", 0).unwrap();

        tape.write(Cell::Filled);
        assert_eq!(tape.read(), Cell::Filled);

        tape.write(Cell::Blank);
        assert_eq!(tape.read(), Cell::Blank);
    }

    #[test]
    fn test_move_left_grows_low_side() {
        let mut tape = Tape::parse("11", 0).unwrap();
        tape.move_left();

        assert_eq!(tape.len(), 4);
        assert_eq!(tape.head(), 1);
        assert_eq!(tape.read(), Cell::Blank);
        assert_eq!(tape.render().1, "0011");
    }

    #[test]
    fn test_move_right_grows_high_side() {
        let mut tape = Tape::parse("101", 2).unwrap();
        tape.move_right();

        assert_eq!(tape.len(), 6);
        assert_eq!(tape.head(), 3);
        assert_eq!(tape.render().1, "101000");
    }

    #[test]
    fn test_move_within_bounds_does_not_grow() {
        let mut tape = Tape::parse("101", 1).unwrap();
        tape.move_left();
        tape.move_right();
        tape.move_right();

        assert_eq!(tape.len(), 3);
        assert_eq!(tape.head(), 2);
    }

    #[test]
    fn test_render_marks_cursor() {
        let tape = Tape::parse("0110", 3).unwrap();
        let (cursor, content) = tape.render();

        assert_eq!(cursor, "   *");
        assert_eq!(content, "0110");
    }

    #[test]
    fn test_collapse() {
        let cases = [
            ("0", ""),
            ("0000", ""),
            ("1", "1"),
            ("00101100", "1011"),
            ("0011100", "111"),
            ("1001", "1001"),
            ("010010", "1001"),
        ];

        for (input, expected) in cases {
            let tape = Tape::parse(input, 0).unwrap();
            assert_eq!(tape.collapse(), expected, "collapsing {input}");
        }
    }

    fn tape_string() -> impl Strategy<Value = String> {
        proptest::collection::vec(prop_oneof![Just('0'), Just('1')], 1..32)
            .prop_map(|cells| cells.into_iter().collect())
    }

    proptest! {
        #[test]
        fn prop_cursor_stays_valid(
            input in tape_string(),
            moves in proptest::collection::vec(any::<bool>(), 0..200),
        ) {
            let mut tape = Tape::parse(&input, 0).unwrap();
            for left in moves {
                if left { tape.move_left() } else { tape.move_right() }
                prop_assert!(tape.head() < tape.len());
            }
        }

        #[test]
        fn prop_growth_preserves_content(input in tape_string()) {
            let len = input.len();

            let mut left = Tape::parse(&input, 0).unwrap();
            left.move_left();
            prop_assert_eq!(left.len(), len * 2);
            prop_assert_eq!(&left.render().1[len..], input.as_str());
            left.move_right();
            prop_assert_eq!(left.head(), len);
            prop_assert_eq!(left.read().symbol(), input.chars().next().unwrap());

            let mut right = Tape::parse(&input, len - 1).unwrap();
            right.move_right();
            prop_assert_eq!(right.len(), len * 2);
            prop_assert_eq!(&right.render().1[..len], input.as_str());
            right.move_left();
            prop_assert_eq!(right.head(), len - 1);
            prop_assert_eq!(right.read().symbol(), input.chars().last().unwrap());
        }

        #[test]
        fn prop_collapse_trims_outer_blanks(
            input in tape_string(),
            lead in 0usize..8,
            trail in 0usize..8,
        ) {
            let padded = format!("{}{}{}", "0".repeat(lead), input, "0".repeat(trail));
            let tape = Tape::parse(&padded, 0).unwrap();
            let expected = input.trim_start_matches('0').trim_end_matches('0');

            prop_assert_eq!(tape.collapse(), expected);
        }
    }
}
