use ludo_core::*;
use serde::Deserialize;
use serde::Serialize;

/// A seated player: the binding of an identity to one color slot.
///
/// Created on join, never reassigned to a different slot, removed on
/// disconnect or room teardown. `connection` is `None` for AI seats and for
/// humans awaiting reconnection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: Color,
    pub name: String,
    pub connection: Option<ConnectionId>,
    pub is_ai: bool,
    pub difficulty: Option<Difficulty>,
    pub profile: Option<Profile>,
    pub is_guest: bool,
}

impl Player {
    pub fn human(id: Color, identity: Identity) -> Self {
        let name = identity
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from)
            .unwrap_or_else(|| id.label().to_string());
        Self {
            id,
            name,
            connection: identity.connection,
            is_ai: false,
            difficulty: None,
            profile: identity.profile,
            is_guest: identity.is_guest,
        }
    }
    pub fn ai(id: Color, difficulty: Difficulty, name: String) -> Self {
        Self {
            id,
            name,
            connection: None,
            is_ai: true,
            difficulty: Some(difficulty),
            profile: None,
            is_guest: false,
        }
    }
    /// External profile reference, if the seat belongs to a signed-in human.
    pub fn profile_id(&self) -> Option<uuid::Uuid> {
        self.profile.as_ref().map(|p| p.id)
    }
}

/// Join-time identity for a human seat, as handed over by the transport
/// and auth collaborators.
#[derive(Debug, Clone, Default)]
pub struct Identity {
    pub connection: Option<ConnectionId>,
    pub name: Option<String>,
    pub profile: Option<Profile>,
    pub is_guest: bool,
}
