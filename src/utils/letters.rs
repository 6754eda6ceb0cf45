use std::collections::HashMap;
use once_cell::sync::Lazy;

/// Scrabble letter values
pub static LETTER_VALUES: Lazy<HashMap<char, u8>> = Lazy::new(|| {
    let mut map = HashMap::new();

    // 1 point letters
    for ch in ['A', 'E', 'I', 'O', 'U', 'L', 'N', 'R', 'S', 'T'] {
        map.insert(ch, 1);
    }

    // 2 points
    for ch in ['D', 'G'] {
        map.insert(ch, 2);
    }

    // 3 points
    for ch in ['B', 'C', 'M', 'P'] {
        map.insert(ch, 3);
    }

    // 4 points
    for ch in ['F', 'H', 'V', 'W', 'Y'] {
        map.insert(ch, 4);
    }

    // 5 points
    map.insert('K', 5);

    // 8 points
    for ch in ['J', 'X'] {
        map.insert(ch, 8);
    }

    // 10 points
    for ch in ['Q', 'Z'] {
        map.insert(ch, 10);
    }

    map
});

/// Tile counts in a standard 100 tile bag
pub const LETTER_DISTRIBUTION: [(char, u32); 26] = [
    ('A', 9),
    ('B', 2),
    ('C', 2),
    ('D', 4),
    ('E', 12),
    ('F', 2),
    ('G', 3),
    ('H', 2),
    ('I', 9),
    ('J', 1),
    ('K', 1),
    ('L', 4),
    ('M', 2),
    ('N', 6),
    ('O', 8),
    ('P', 2),
    ('Q', 1),
    ('R', 6),
    ('S', 4),
    ('T', 6),
    ('U', 4),
    ('V', 2),
    ('W', 2),
    ('X', 1),
    ('Y', 2),
    ('Z', 1),
];

pub const BLANK_COUNT: u32 = 2;

/// Size of the bag the distribution above describes
pub const BASE_BAG_SIZE: u32 = 100;

/// Get the point value for a letter
pub fn get_letter_value(letter: char) -> u8 {
    let upper = letter.to_ascii_uppercase();
    *LETTER_VALUES.get(&upper).unwrap_or(&0)
}

/// Scale the standard distribution to `bag_size` tiles.
///
/// Uses largest remainders so the counts always add up to exactly
/// `bag_size`. Entry `None` stands for blanks.
pub fn scaled_distribution(bag_size: u32) -> Vec<(Option<char>, u32)> {
    let base: Vec<(Option<char>, u32)> = LETTER_DISTRIBUTION
        .iter()
        .map(|(ch, count)| (Some(*ch), *count))
        .chain(std::iter::once((None, BLANK_COUNT)))
        .collect();

    let mut scaled: Vec<(Option<char>, u32, u32)> = base
        .iter()
        .map(|(kind, count)| {
            let exact = count * bag_size;
            (*kind, exact / BASE_BAG_SIZE, exact % BASE_BAG_SIZE)
        })
        .collect();

    let assigned: u32 = scaled.iter().map(|(_, count, _)| count).sum();
    let mut shortfall = bag_size - assigned;

    let mut by_remainder: Vec<usize> = (0..scaled.len()).collect();
    by_remainder.sort_by(|a, b| scaled[*b].2.cmp(&scaled[*a].2));
    for idx in by_remainder {
        if shortfall == 0 {
            break;
        }
        scaled[idx].1 += 1;
        shortfall -= 1;
    }

    scaled
        .into_iter()
        .map(|(kind, count, _)| (kind, count))
        .collect()
}
