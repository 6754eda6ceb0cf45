use crate::{
    game::{board::FormedWord, layout::PremiumLayout},
    models::{BoardSize, Multiplier, RACK_SIZE},
};

/// Flat bonus for playing every tile on the rack in one move
pub const BINGO_BONUS: u32 = 50;

/// Points awarded for one move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreResult {
    /// Total for the move, bonus included
    pub score: u32,
    /// Each formed word with its own score, in formation order
    pub words: Vec<(String, u32)>,
    pub bingo: bool,
}

pub struct Scorer;

impl Scorer {
    /// Score a single formed word.
    ///
    /// Scoring rules:
    /// - Each letter has a base value, blanks are worth 0
    /// - DL / TL multiply that letter's value by 2 / 3
    /// - DW / TW multiply the whole word by 2 / 3
    /// - Premium squares only count for tiles placed by this move
    pub fn score_word(size: BoardSize, word: &FormedWord) -> u32 {
        let mut letter_total = 0;
        let mut word_multiplier = 1;

        for cell in &word.cells {
            let base = cell.tile.value();
            let premium = if cell.fresh {
                PremiumLayout::multiplier_at(size, cell.pos)
            } else {
                None
            };

            letter_total += match premium {
                Some(Multiplier::DoubleLetter) => base * 2,
                Some(Multiplier::TripleLetter) => base * 3,
                Some(Multiplier::DoubleWord) => {
                    word_multiplier *= 2;
                    base
                }
                Some(Multiplier::TripleWord) => {
                    word_multiplier *= 3;
                    base
                }
                None => base,
            };
        }

        letter_total * word_multiplier
    }

    /// Score every word a move forms. Shared tiles count once per word.
    pub fn score_move(size: BoardSize, words: &[FormedWord], tiles_placed: usize) -> ScoreResult {
        let words: Vec<(String, u32)> = words
            .iter()
            .map(|word| (word.text.clone(), Self::score_word(size, word)))
            .collect();

        let bingo = tiles_placed >= RACK_SIZE;
        let score = words.iter().map(|(_, points)| points).sum::<u32>()
            + if bingo { BINGO_BONUS } else { 0 };

        ScoreResult { score, words, bingo }
    }
}
