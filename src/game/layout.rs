use crate::models::{BoardSize, Multiplier, Position};

/// Premium squares for the upper-left quadrant, as `(row, col)` with
/// `row <= col`. The rest of the board follows by mirroring.
struct QuadrantTable {
    triple_word: &'static [(usize, usize)],
    double_word: &'static [(usize, usize)],
    triple_letter: &'static [(usize, usize)],
    double_letter: &'static [(usize, usize)],
}

const SMALL: QuadrantTable = QuadrantTable {
    triple_word: &[(0, 0), (0, 5)],
    double_word: &[(1, 1), (2, 2), (5, 5)],
    triple_letter: &[(1, 4), (4, 4)],
    double_letter: &[(0, 2), (2, 5), (3, 3)],
};

const MEDIUM: QuadrantTable = QuadrantTable {
    triple_word: &[(0, 0), (0, 7)],
    double_word: &[(1, 1), (2, 2), (3, 3), (4, 4), (7, 7)],
    triple_letter: &[(1, 5), (5, 5)],
    double_letter: &[(0, 3), (2, 6), (3, 7), (6, 6)],
};

const LARGE: QuadrantTable = QuadrantTable {
    triple_word: &[(0, 0), (0, 10), (3, 10)],
    double_word: &[(1, 1), (2, 2), (3, 3), (4, 4), (5, 5), (10, 10)],
    triple_letter: &[(1, 7), (5, 9), (7, 7)],
    double_letter: &[(0, 4), (2, 8), (4, 10), (6, 6), (8, 8)],
};

pub struct PremiumLayout;

impl PremiumLayout {
    /// Premium square at `pos`, if any
    pub fn multiplier_at(size: BoardSize, pos: Position) -> Option<Multiplier> {
        let dim = size.dimension();
        if pos.row >= dim || pos.col >= dim {
            return None;
        }

        let row = pos.row.min(dim - 1 - pos.row);
        let col = pos.col.min(dim - 1 - pos.col);
        let key = (row.min(col), row.max(col));

        let table = match size {
            BoardSize::Small => &SMALL,
            BoardSize::Medium => &MEDIUM,
            BoardSize::Large => &LARGE,
        };

        if table.triple_word.contains(&key) {
            Some(Multiplier::TripleWord)
        } else if table.double_word.contains(&key) {
            Some(Multiplier::DoubleWord)
        } else if table.triple_letter.contains(&key) {
            Some(Multiplier::TripleLetter)
        } else if table.double_letter.contains(&key) {
            Some(Multiplier::DoubleLetter)
        } else {
            None
        }
    }

    /// Full grid of premiums, row by row
    pub fn grid(size: BoardSize) -> Vec<Vec<Option<Multiplier>>> {
        let dim = size.dimension();
        (0..dim)
            .map(|row| {
                (0..dim)
                    .map(|col| Self::multiplier_at(size, Position::new(row, col)))
                    .collect()
            })
            .collect()
    }
}
