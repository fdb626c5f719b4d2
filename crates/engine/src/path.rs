use ludo_core::*;
use serde::Deserialize;
use serde::Serialize;

/// One logical square along a player's path.
///
/// Track squares are shared ring positions; home squares are private to the
/// owning color. The board's geometry is presentation-only and lives with
/// the clients, so a square is nothing but its logical index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "index", rename_all = "lowercase")]
pub enum Square {
    Track(usize),
    Home(usize),
}

impl Square {
    /// Ring index if this is a shared track square.
    pub fn track_index(&self) -> Option<usize> {
        match self {
            Square::Track(i) => Some(*i),
            Square::Home(_) => None,
        }
    }
}

/// Where a token currently sits, as reported to clients and the AI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Spot {
    Base,
    Track { index: usize },
    Home { index: usize },
    Goal { index: usize },
}

impl Spot {
    pub fn track_index(&self) -> Option<usize> {
        match self {
            Spot::Track { index } => Some(*index),
            _ => None,
        }
    }
}

/// Builds the ordered path a color's tokens traverse: the full shared ring
/// rotated to the color's start offset, then the private home stretch.
/// Deterministic; computed once per player at join time.
pub fn build_path(start: usize) -> Vec<Square> {
    (0..TRACK_LENGTH)
        .map(|i| Square::Track((start + i) % TRACK_LENGTH))
        .chain((0..HOME_STEPS).map(Square::Home))
        .collect()
}

/// True if the ring index is one of the eight capture-proof squares.
pub fn is_safe(track_index: usize) -> bool {
    SAFE_SQUARES.contains(&track_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn path_has_ring_then_home() {
        let path = build_path(Color::Red.start_offset());
        assert_eq!(path.len(), TRACK_LENGTH + HOME_STEPS);
        assert_eq!(path[0], Square::Track(0));
        assert_eq!(path[TRACK_LENGTH - 1], Square::Track(51));
        assert_eq!(path[TRACK_LENGTH], Square::Home(0));
        assert_eq!(path[FINISH_STEP], Square::Home(HOME_STEPS - 1));
    }
    #[test]
    fn path_rotates_by_start_offset() {
        let path = build_path(Color::Blue.start_offset());
        assert_eq!(path[0], Square::Track(13));
        // ring wraps past 51 back to 0
        assert_eq!(path[TRACK_LENGTH - 13], Square::Track(0));
        assert_eq!(path[TRACK_LENGTH - 1], Square::Track(12));
    }
    #[test]
    fn every_color_walks_the_whole_ring() {
        for color in Color::ALL {
            let ring: std::collections::HashSet<usize> = build_path(color.start_offset())
                .iter()
                .filter_map(Square::track_index)
                .collect();
            assert_eq!(ring.len(), TRACK_LENGTH);
        }
    }
    #[test]
    fn safe_set_matches_contract() {
        for index in [0, 8, 13, 21, 26, 34, 39, 47] {
            assert!(is_safe(index));
        }
        assert!(!is_safe(1));
        assert!(!is_safe(50));
    }
}
