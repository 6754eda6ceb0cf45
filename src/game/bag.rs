use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::{models::Tile, utils::letters::scaled_distribution};

/// Undistributed tiles of one room.
///
/// Owns its RNG so a fixed seed replays the same draw order.
#[derive(Debug)]
pub struct TileBag {
    tiles: Vec<Tile>,
    initial_size: usize,
    rng: ChaCha20Rng,
}

impl TileBag {
    /// Fill a bag of `bag_size` tiles following the standard distribution
    pub fn new_with_seed(bag_size: u32, seed: u64) -> Self {
        let tiles: Vec<Tile> = scaled_distribution(bag_size)
            .into_iter()
            .flat_map(|(kind, count)| {
                let tile = match kind {
                    Some(ch) => Tile::Letter(ch),
                    None => Tile::Blank(None),
                };
                std::iter::repeat(tile).take(count as usize)
            })
            .collect();

        Self {
            initial_size: tiles.len(),
            tiles,
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    pub fn new(bag_size: u32) -> Self {
        Self::new_with_seed(bag_size, rand::rng().random())
    }

    /// Remove up to `n` tiles uniformly at random
    pub fn draw(&mut self, n: usize) -> Vec<Tile> {
        let mut drawn = Vec::with_capacity(n.min(self.tiles.len()));
        for _ in 0..n {
            if self.tiles.is_empty() {
                break;
            }
            let idx = self.rng.random_range(0..self.tiles.len());
            drawn.push(self.tiles.swap_remove(idx));
        }
        drawn
    }

    /// Put tiles back at random positions; blanks lose their letter
    pub fn return_tiles(&mut self, tiles: impl IntoIterator<Item = Tile>) {
        for tile in tiles {
            let idx = self.rng.random_range(0..=self.tiles.len());
            self.tiles.insert(idx, tile.unbound());
        }
    }

    pub fn remaining(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn initial_size(&self) -> usize {
        self.initial_size
    }
}
