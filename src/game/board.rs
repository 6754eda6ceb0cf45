use std::collections::HashMap;

use crate::{
    dictionary::WordList,
    error::MoveError,
    models::{BoardSize, Position, Tile},
};

/// Identifies the move that put a tile on the board
pub type MoveId = u64;

/// Board as exchanged with clients: rows of tile-or-empty
pub type TileGrid = Vec<Vec<Option<Tile>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedTile {
    pub tile: Tile,
    pub move_id: MoveId,
}

/// A tile a move puts on an empty cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub pos: Position,
    pub tile: Tile,
}

/// One letter of a formed word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordCell {
    pub pos: Position,
    pub tile: Tile,
    /// Placed by the move being evaluated
    pub fresh: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormedWord {
    pub text: String,
    pub cells: Vec<WordCell>,
}

/// A geometrically valid move, not yet applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    pub placements: Vec<Placement>,
    pub words: Vec<FormedWord>,
}

impl PlannedMove {
    pub fn tiles(&self) -> Vec<Tile> {
        self.placements.iter().map(|p| p.tile).collect()
    }

    pub fn word_texts(&self) -> Vec<String> {
        self.words.iter().map(|w| w.text.clone()).collect()
    }

    /// Words the dictionary does not know, in formation order
    pub fn invalid_words(&self, words: &dyn WordList) -> Vec<String> {
        self.words
            .iter()
            .filter(|w| !words.is_valid_word(&w.text))
            .map(|w| w.text.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Across,
    Down,
}

impl Direction {
    fn perpendicular(self) -> Self {
        match self {
            Direction::Across => Direction::Down,
            Direction::Down => Direction::Across,
        }
    }

    fn delta(self) -> (isize, isize) {
        match self {
            Direction::Across => (0, 1),
            Direction::Down => (1, 0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Board {
    size: BoardSize,
    cells: Vec<Vec<Option<PlacedTile>>>,
}

impl Board {
    pub fn new(size: BoardSize) -> Self {
        let dim = size.dimension();
        Self {
            size,
            cells: vec![vec![None; dim]; dim],
        }
    }

    pub fn size(&self) -> BoardSize {
        self.size
    }

    pub fn dimension(&self) -> usize {
        self.size.dimension()
    }

    pub fn get(&self, pos: Position) -> Option<&PlacedTile> {
        self.cells.get(pos.row)?.get(pos.col)?.as_ref()
    }

    pub fn tile_at(&self, pos: Position) -> Option<Tile> {
        self.get(pos).map(|placed| placed.tile)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_none)
    }

    pub fn tile_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }

    /// Tiles on the board, row-major
    pub fn tiles(&self) -> Vec<Tile> {
        self.cells.iter().flatten().flatten().map(|p| p.tile).collect()
    }

    /// Client view of the board
    pub fn grid(&self) -> TileGrid {
        self.cells
            .iter()
            .map(|row| row.iter().map(|c| c.map(|p| p.tile)).collect())
            .collect()
    }

    /// Cells that are empty here but filled in `proposed`.
    ///
    /// Any tile that disappears or changes is treated as tampering and the
    /// whole submission is rejected.
    pub fn diff(&self, proposed: &TileGrid) -> Result<Vec<Placement>, MoveError> {
        let dim = self.dimension();
        if proposed.len() != dim || proposed.iter().any(|row| row.len() != dim) {
            return Err(MoveError::BoardShape(dim));
        }

        let mut placements = Vec::new();
        for (row, (current, next)) in self.cells.iter().zip(proposed).enumerate() {
            for (col, (before, after)) in current.iter().zip(next).enumerate() {
                let pos = Position::new(row, col);
                match (before, after) {
                    (Some(_), None) => return Err(MoveError::TileRemoved(pos)),
                    (Some(placed), Some(tile)) if placed.tile != *tile => {
                        return Err(MoveError::TileChanged(pos))
                    }
                    (None, Some(tile)) => placements.push(Placement { pos, tile: *tile }),
                    _ => {}
                }
            }
        }

        Ok(placements)
    }

    /// Diff `proposed` against the board and check the placement geometry,
    /// returning the tiles placed and every word they form.
    pub fn plan(&self, proposed: &TileGrid) -> Result<PlannedMove, MoveError> {
        let placements = self.diff(proposed)?;
        let words = self.check_placements(&placements)?;
        Ok(PlannedMove { placements, words })
    }

    /// Geometry rules for a set of new tiles, then word extraction
    pub fn check_placements(&self, placements: &[Placement]) -> Result<Vec<FormedWord>, MoveError> {
        let first = placements.first().ok_or(MoveError::NoTilesPlaced)?;

        if placements.iter().any(|p| p.tile == Tile::Blank(None)) {
            return Err(MoveError::UnassignedBlank);
        }

        let direction = if placements.iter().all(|p| p.pos.row == first.pos.row) {
            Direction::Across
        } else if placements.iter().all(|p| p.pos.col == first.pos.col) {
            Direction::Down
        } else {
            return Err(MoveError::NotCollinear);
        };

        let fresh: HashMap<Position, Tile> = placements.iter().map(|p| (p.pos, p.tile)).collect();
        self.check_contiguous(placements, direction, &fresh)?;

        if self.is_empty() {
            if !fresh.contains_key(&self.size.center()) {
                return Err(MoveError::MissingCenter);
            }
        } else if !placements.iter().any(|p| self.touches_existing(p.pos)) {
            return Err(MoveError::NotConnected);
        }

        let words = self.formed_words(placements, direction, &fresh);
        if words.is_empty() {
            return Err(MoveError::NoWordFormed);
        }
        Ok(words)
    }

    /// Put a validated move on the board
    pub fn apply(&mut self, placements: &[Placement], move_id: MoveId) {
        for placement in placements {
            self.cells[placement.pos.row][placement.pos.col] = Some(PlacedTile {
                tile: placement.tile,
                move_id,
            });
        }
    }

    /// Take back every tile a move placed, row-major
    pub fn rollback(&mut self, move_id: MoveId) -> Vec<Placement> {
        let mut removed = Vec::new();
        for (row, cells) in self.cells.iter_mut().enumerate() {
            for (col, cell) in cells.iter_mut().enumerate() {
                if matches!(cell, Some(placed) if placed.move_id == move_id) {
                    if let Some(placed) = cell.take() {
                        removed.push(Placement {
                            pos: Position::new(row, col),
                            tile: placed.tile,
                        });
                    }
                }
            }
        }
        removed
    }

    fn check_contiguous(
        &self,
        placements: &[Placement],
        direction: Direction,
        fresh: &HashMap<Position, Tile>,
    ) -> Result<(), MoveError> {
        let first = placements[0].pos;
        let along = |pos: &Position| match direction {
            Direction::Across => pos.col,
            Direction::Down => pos.row,
        };
        let start = placements.iter().map(|p| along(&p.pos)).min().unwrap_or(0);
        let end = placements.iter().map(|p| along(&p.pos)).max().unwrap_or(0);

        for step in start..=end {
            let pos = match direction {
                Direction::Across => Position::new(first.row, step),
                Direction::Down => Position::new(step, first.col),
            };
            if !fresh.contains_key(&pos) && self.get(pos).is_none() {
                return Err(MoveError::NotContiguous);
            }
        }
        Ok(())
    }

    fn touches_existing(&self, pos: Position) -> bool {
        [(-1, 0), (1, 0), (0, -1), (0, 1)]
            .into_iter()
            .filter_map(|delta| self.offset(pos, delta))
            .any(|neighbor| self.get(neighbor).is_some())
    }

    fn offset(&self, pos: Position, (dr, dc): (isize, isize)) -> Option<Position> {
        let row = pos.row.checked_add_signed(dr)?;
        let col = pos.col.checked_add_signed(dc)?;
        let dim = self.dimension();
        (row < dim && col < dim).then(|| Position::new(row, col))
    }

    fn formed_words(
        &self,
        placements: &[Placement],
        direction: Direction,
        fresh: &HashMap<Position, Tile>,
    ) -> Vec<FormedWord> {
        let anchor = placements[0].pos;
        let mut words = Vec::new();

        if placements.len() == 1 {
            // A lone tile may extend words both ways
            words.extend(self.word_through(anchor, Direction::Across, fresh));
            words.extend(self.word_through(anchor, Direction::Down, fresh));
            return words;
        }

        words.extend(self.word_through(anchor, direction, fresh));
        for placement in placements {
            words.extend(self.word_through(placement.pos, direction.perpendicular(), fresh));
        }
        words
    }

    /// Maximal run of tiles through `pos`, if at least two long
    fn word_through(
        &self,
        pos: Position,
        direction: Direction,
        fresh: &HashMap<Position, Tile>,
    ) -> Option<FormedWord> {
        let (dr, dc) = direction.delta();
        let occupied = |p: Position| fresh.contains_key(&p) || self.get(p).is_some();

        let mut start = pos;
        while let Some(prev) = self.offset(start, (-dr, -dc)) {
            if !occupied(prev) {
                break;
            }
            start = prev;
        }

        let mut cells = Vec::new();
        let mut cursor = Some(start);
        while let Some(p) = cursor {
            let cell = match fresh.get(&p) {
                Some(tile) => WordCell { pos: p, tile: *tile, fresh: true },
                None => match self.tile_at(p) {
                    Some(tile) => WordCell { pos: p, tile, fresh: false },
                    None => break,
                },
            };
            cells.push(cell);
            cursor = self.offset(p, (dr, dc));
        }

        if cells.len() < 2 {
            return None;
        }
        let text = cells.iter().filter_map(|c| c.tile.letter()).collect();
        Some(FormedWord { text, cells })
    }
}
