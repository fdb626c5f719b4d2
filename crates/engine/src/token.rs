use ludo_core::*;
use serde::Deserialize;
use serde::Serialize;

/// Lifecycle of one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStatus {
    /// Unplaced; waiting for a six to enter the board.
    Base,
    /// Somewhere along its owner's path.
    Active,
    /// Reached the goal square exactly.
    Finished,
}

/// One of a player's four tokens.
///
/// Invariant: `steps` is `None` iff `status` is `Base`. A finished token
/// keeps `steps` at the final path index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    pub status: TokenStatus,
    pub steps: Option<Step>,
}

impl Token {
    /// A token in its starting state. Ids are stable across game restarts:
    /// `"<color>-<index>"`.
    pub fn fresh(owner: Color, index: TokenIndex) -> Self {
        Self {
            id: format!("{}-{}", owner, index),
            status: TokenStatus::Base,
            steps: None,
        }
    }
    /// The full starting set for one player.
    pub fn rack(owner: Color) -> Vec<Token> {
        (0..TOKENS_PER_PLAYER).map(|i| Token::fresh(owner, i)).collect()
    }
    /// Sends the token back to base, clearing its position.
    pub fn bounce(&mut self) {
        self.status = TokenStatus::Base;
        self.steps = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn fresh_token_upholds_base_invariant() {
        let token = Token::fresh(Color::Yellow, 2);
        assert_eq!(token.id, "yellow-2");
        assert_eq!(token.status, TokenStatus::Base);
        assert_eq!(token.steps, None);
    }
    #[test]
    fn rack_has_four_distinct_ids() {
        let rack = Token::rack(Color::Red);
        assert_eq!(rack.len(), TOKENS_PER_PLAYER);
        let ids: std::collections::HashSet<_> = rack.iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids.len(), TOKENS_PER_PLAYER);
    }
    #[test]
    fn bounce_restores_base_invariant() {
        let mut token = Token::fresh(Color::Green, 0);
        token.status = TokenStatus::Active;
        token.steps = Some(17);
        token.bounce();
        assert_eq!(token.status, TokenStatus::Base);
        assert_eq!(token.steps, None);
    }
}
