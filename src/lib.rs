use std::ops::Index;

use arrayvec::ArrayVec;

pub mod astar;
mod fmt;
mod parse;
pub mod session;
pub mod solve;
pub mod uninformed;

pub use crate::astar::{AStar, Heuristic};
pub use crate::session::{scramble, Phase, Session};
pub use crate::solve::{solve, solve_staged, Policy, Solution, Stage, Strategy};
pub use crate::uninformed::{Bfs, Iddfs};

/// Board side length.
pub const SIDE: u8 = 4;
/// Number of cells on the board.
pub const CELLS: usize = (SIDE * SIDE) as usize;
/// The value standing for the empty cell.
pub const BLANK: u8 = CELLS as u8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid board: {0}")]
    InvalidBoard(BoardDefect),
    #[error("illegal action {action}: not adjacent to the blank at {blank}")]
    IllegalAction { action: Pos, blank: Pos },
    #[error("unsolvable configuration: not reachable from the solved board")]
    UnsolvableConfiguration,
    #[error("invalid target tile {0}, expecting 1..=16")]
    InvalidTarget(u8),
    #[error("invalid policy: {0}")]
    InvalidPolicy(PolicyDefect),
    #[error("search space exhausted without reaching the goal")]
    SearchExhausted,
    #[error("request rejected while {0}")]
    Busy(Phase),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardDefect {
    CellCount(usize),
    OutOfRange(u8),
    Duplicate(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyDefect {
    Empty,
    /// The stage at this index drops a tile required by the stage before it.
    Shrinks(usize),
    /// The last stage does not cover the whole board.
    Incomplete,
    UnknownPreset(usize),
}

/// A cell coordinate, `(row, col)`. Actions are the coordinates of the tile to slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos(pub u8, pub u8);

impl Pos {
    fn from_index(idx: usize) -> Self {
        Pos(idx as u8 / SIDE, idx as u8 % SIDE)
    }

    fn index(self) -> usize {
        self.0 as usize * SIDE as usize + self.1 as usize
    }

    pub fn is_in_bounds(self) -> bool {
        self.0 < SIDE && self.1 < SIDE
    }

    pub fn distance(self, other: Pos) -> u32 {
        (self.0.abs_diff(other.0) + self.1.abs_diff(other.1)) as u32
    }

    pub fn is_adjacent(self, other: Pos) -> bool {
        self.distance(other) == 1
    }

    pub fn sibling(self, dir: Direction) -> Option<Pos> {
        const DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
        let row = self.0.checked_add_signed(DIRECTIONS[dir as usize].0)?;
        let col = self.1.checked_add_signed(DIRECTIONS[dir as usize].1)?;
        let pos = Pos(row, col);
        pos.is_in_bounds().then_some(pos)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Right = 0,
    Down,
    Left,
    Up,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Right, Self::Down, Self::Left, Self::Up];

    pub fn reversed(self) -> Self {
        match self {
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Up => Direction::Down,
        }
    }
}

const DESTINATIONS: [Pos; CELLS + 1] = {
    let mut table = [Pos(0, 0); CELLS + 1];
    let mut value = 1;
    while value <= CELLS {
        table[value] = Pos(
            ((value - 1) / SIDE as usize) as u8,
            ((value - 1) % SIDE as usize) as u8,
        );
        value += 1;
    }
    table
};

/// Where `value` sits on the solved board.
///
/// # Panics
/// If `value` is not in `1..=16`.
pub fn destination(value: u8) -> Pos {
    assert!(
        (1..=BLANK).contains(&value),
        "no destination for tile {value}"
    );
    DESTINATIONS[value as usize]
}

/// A set of tile values, one bit per value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetSet(u16);

impl TargetSet {
    pub const EMPTY: Self = Self(0);
    pub const FULL: Self = Self(u16::MAX);

    pub fn from_values(values: impl IntoIterator<Item = u8>) -> Result<Self, Error> {
        values.into_iter().try_fold(Self::EMPTY, |set, value| {
            if !(1..=BLANK).contains(&value) {
                return Err(Error::InvalidTarget(value));
            }
            Ok(Self(set.0 | 1 << (value - 1)))
        })
    }

    pub fn contains(self, value: u8) -> bool {
        (1..=BLANK).contains(&value) && self.0 & 1 << (value - 1) != 0
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn is_superset(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = u8> {
        (1..=BLANK).filter(move |&value| self.contains(value))
    }
}

/// One immutable board configuration.
///
/// `blank` always caches the position of [`BLANK`] in `cells`, so the derived
/// equality and hash stay purely structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [u8; CELLS],
    blank: Pos,
}

impl Index<Pos> for Board {
    type Output = u8;
    fn index(&self, pos: Pos) -> &Self::Output {
        &self.cells[pos.index()]
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::solved()
    }
}

impl Board {
    pub fn solved() -> Self {
        let mut cells = [0; CELLS];
        for (cell, value) in cells.iter_mut().zip(1..) {
            *cell = value;
        }
        Self {
            cells,
            blank: DESTINATIONS[BLANK as usize],
        }
    }

    /// Build a board from its cells in row-major order.
    /// Solvability is not checked here, see [`Board::is_solvable`].
    pub fn from_cells(cells: [u8; CELLS]) -> Result<Self, Error> {
        let mut seen = TargetSet::EMPTY;
        let mut blank = None;
        for (idx, &value) in cells.iter().enumerate() {
            let tile = TargetSet::from_values([value])
                .map_err(|_| Error::InvalidBoard(BoardDefect::OutOfRange(value)))?;
            if seen.is_superset(tile) {
                return Err(Error::InvalidBoard(BoardDefect::Duplicate(value)));
            }
            seen = seen.union(tile);
            if value == BLANK {
                blank = Some(Pos::from_index(idx));
            }
        }
        // 16 distinct values in 1..=16 always include the blank.
        let Some(blank) = blank else {
            return Err(Error::InvalidBoard(BoardDefect::Duplicate(BLANK)));
        };
        Ok(Self { cells, blank })
    }

    pub fn from_rows(rows: [[u8; SIDE as usize]; SIDE as usize]) -> Result<Self, Error> {
        let mut cells = [0; CELLS];
        for (chunk, row) in cells.chunks_exact_mut(SIDE as usize).zip(rows) {
            chunk.copy_from_slice(&row);
        }
        Self::from_cells(cells)
    }

    pub fn blank(&self) -> Pos {
        self.blank
    }

    pub fn cells(&self) -> impl Iterator<Item = (Pos, u8)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(idx, &value)| (Pos::from_index(idx), value))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.cells.chunks_exact(SIDE as usize)
    }

    /// Positions of the tiles next to the blank, in [`Direction::ALL`] order.
    pub fn legal_actions(&self) -> ArrayVec<Pos, 4> {
        Direction::ALL
            .into_iter()
            .filter_map(|dir| self.blank.sibling(dir))
            .collect()
    }

    pub fn is_legal(&self, action: Pos) -> bool {
        action.is_in_bounds() && action.is_adjacent(self.blank)
    }

    /// Slide the tile at `action` into the blank.
    pub fn apply(&self, action: Pos) -> Result<Board, Error> {
        if !self.is_legal(action) {
            return Err(Error::IllegalAction {
                action,
                blank: self.blank,
            });
        }
        Ok(self.slide(action))
    }

    /// `action` must already be known to be legal.
    pub(crate) fn slide(&self, action: Pos) -> Board {
        let mut next = *self;
        next.cells.swap(self.blank.index(), action.index());
        next.blank = action;
        next
    }

    pub fn is_partial_goal(&self, targets: TargetSet) -> bool {
        self.cells()
            .all(|(pos, value)| !targets.contains(value) || DESTINATIONS[value as usize] == pos)
    }

    pub fn is_solved(&self) -> bool {
        self.is_partial_goal(TargetSet::FULL)
    }

    /// Sum of Manhattan distances of the misplaced target tiles.
    ///
    /// The blank never counts, even when it is a target: one slide moves exactly
    /// one tile by one cell, which keeps the estimate admissible and consistent.
    pub fn heuristic(&self, targets: TargetSet) -> u32 {
        self.cells()
            .filter(|&(_, value)| value != BLANK && targets.contains(value))
            .map(|(pos, value)| pos.distance(DESTINATIONS[value as usize]))
            .sum()
    }

    /// Number of target tiles off their destination, the blank excluded.
    pub fn misplaced(&self, targets: TargetSet) -> u32 {
        self.cells()
            .filter(|&(pos, value)| {
                value != BLANK && targets.contains(value) && DESTINATIONS[value as usize] != pos
            })
            .count() as u32
    }

    fn inversions(&self) -> usize {
        let tiles = self
            .cells
            .iter()
            .copied()
            .filter(|&value| value != BLANK)
            .collect::<ArrayVec<u8, CELLS>>();
        tiles
            .iter()
            .enumerate()
            .map(|(i, &value)| tiles[i + 1..].iter().filter(|&&next| next < value).count())
            .sum()
    }

    /// Whether the solved board is reachable by legal slides.
    ///
    /// On an even-sided board a slide flips the parity of
    /// `inversions + blank row`, which is odd on the solved board.
    pub fn is_solvable(&self) -> bool {
        (self.inversions() + self.blank.0 as usize) % 2 == 1
    }
}
