use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::letters::get_letter_value;

const BLANK: &str = "BLANK";
const BLANK_PREFIX: &str = "BLANK_";

/// A letter tile. Blanks carry the letter they were bound to, if any.
///
/// On the wire tiles are plain strings: `"A"`, `"BLANK"` or `"BLANK_E"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Tile {
    Letter(char),
    Blank(Option<char>),
}

impl Tile {
    pub fn is_blank(&self) -> bool {
        matches!(self, Tile::Blank(_))
    }

    /// Letter shown on the board, `None` for an unassigned blank
    pub fn letter(&self) -> Option<char> {
        match self {
            Tile::Letter(ch) => Some(*ch),
            Tile::Blank(assigned) => *assigned,
        }
    }

    /// Point value; blanks are always worth zero
    pub fn value(&self) -> u32 {
        match self {
            Tile::Letter(ch) => get_letter_value(*ch) as u32,
            Tile::Blank(_) => 0,
        }
    }

    /// Same physical tile, ignoring what a blank is bound to
    pub fn same_kind(&self, other: &Tile) -> bool {
        match (self, other) {
            (Tile::Letter(a), Tile::Letter(b)) => a == b,
            (Tile::Blank(_), Tile::Blank(_)) => true,
            _ => false,
        }
    }

    /// The tile as it sits in the bag (blanks lose their binding)
    pub fn unbound(self) -> Tile {
        match self {
            Tile::Blank(_) => Tile::Blank(None),
            letter => letter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a tile")]
pub struct TileParseError(pub String);

fn parse_letter(raw: &str) -> Option<char> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if ch.is_ascii_alphabetic() => Some(ch.to_ascii_uppercase()),
        _ => None,
    }
}

impl std::str::FromStr for Tile {
    type Err = TileParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let upper = trimmed.to_ascii_uppercase();

        if upper == BLANK {
            return Ok(Tile::Blank(None));
        }
        if let Some(bound) = upper.strip_prefix(BLANK_PREFIX) {
            return parse_letter(bound)
                .map(|ch| Tile::Blank(Some(ch)))
                .ok_or_else(|| TileParseError(raw.to_string()));
        }

        parse_letter(trimmed)
            .map(Tile::Letter)
            .ok_or_else(|| TileParseError(raw.to_string()))
    }
}

impl TryFrom<String> for Tile {
    type Error = TileParseError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<Tile> for String {
    fn from(tile: Tile) -> Self {
        tile.to_string()
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tile::Letter(ch) => write!(f, "{}", ch),
            Tile::Blank(None) => write!(f, "{}", BLANK),
            Tile::Blank(Some(ch)) => write!(f, "{}{}", BLANK_PREFIX, ch),
        }
    }
}

/// Remove `wanted` from `pool` as a multiset.
///
/// A bound blank matches an identically bound blank first, then any unbound
/// blank. On failure `pool` is left untouched and the missing tiles are
/// returned.
pub fn take_tiles(pool: &mut Vec<Tile>, wanted: &[Tile]) -> Result<Vec<Tile>, Vec<Tile>> {
    let mut remaining = pool.clone();
    let mut taken = Vec::with_capacity(wanted.len());
    let mut missing = Vec::new();

    for tile in wanted {
        let exact = remaining.iter().position(|t| t == tile);
        let found = exact.or_else(|| match tile {
            Tile::Blank(Some(_)) => remaining.iter().position(|t| *t == Tile::Blank(None)),
            _ => None,
        });
        match found {
            Some(idx) => taken.push(remaining.remove(idx)),
            None => missing.push(*tile),
        }
    }

    if !missing.is_empty() {
        return Err(missing);
    }
    *pool = remaining;
    Ok(taken)
}

/// True when `part` can be taken out of `whole` as a multiset
pub fn is_sub_multiset(part: &[Tile], whole: &[Tile]) -> bool {
    let mut pool = whole.to_vec();
    part.iter().all(|tile| match pool.iter().position(|t| t == tile) {
        Some(idx) => {
            pool.swap_remove(idx);
            true
        }
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tiles() {
        assert_eq!("a".parse::<Tile>(), Ok(Tile::Letter('A')));
        assert_eq!("BLANK".parse::<Tile>(), Ok(Tile::Blank(None)));
        assert_eq!("BLANK_e".parse::<Tile>(), Ok(Tile::Blank(Some('E'))));
        assert!("AB".parse::<Tile>().is_err());
        assert!("BLANK_".parse::<Tile>().is_err());
        assert!("7".parse::<Tile>().is_err());
    }

    #[test]
    fn test_tile_json_is_a_plain_string() {
        let json = serde_json::to_string(&vec![Some(Tile::Blank(Some('Q'))), None]).unwrap();
        assert_eq!(json, r#"["BLANK_Q",null]"#);

        let back: Vec<Option<Tile>> = serde_json::from_str(r#"["z",null,"BLANK"]"#).unwrap();
        assert_eq!(back, vec![Some(Tile::Letter('Z')), None, Some(Tile::Blank(None))]);
    }

    #[test]
    fn test_blank_scores_zero() {
        assert_eq!(Tile::Blank(Some('Q')).value(), 0);
        assert_eq!(Tile::Letter('Q').value(), 10);
    }

    #[test]
    fn test_take_tiles_prefers_exact_blank() {
        let mut rack = vec![
            Tile::Blank(None),
            Tile::Letter('A'),
            Tile::Blank(Some('S')),
        ];
        let taken = take_tiles(&mut rack, &[Tile::Blank(Some('S')), Tile::Letter('A')]).unwrap();
        assert_eq!(taken, vec![Tile::Blank(Some('S')), Tile::Letter('A')]);
        assert_eq!(rack, vec![Tile::Blank(None)]);
    }

    #[test]
    fn test_take_tiles_leaves_pool_on_failure() {
        let mut rack = vec![Tile::Letter('A'), Tile::Letter('B')];
        let missing = take_tiles(&mut rack, &[Tile::Letter('A'), Tile::Letter('A')]).unwrap_err();
        assert_eq!(missing, vec![Tile::Letter('A')]);
        assert_eq!(rack.len(), 2);
    }
}
