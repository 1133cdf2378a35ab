use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{card::Card, game_state::GamePhase, player::PlayerId};

/// What one viewer is allowed to see of a player. The hand is only present
/// for the viewer's own entry (or in the engine-internal full view).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub discard_pile: Vec<Card>,
    pub handmaid_active: bool,
    pub is_knocked_out: bool,
    pub num_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand: Option<Vec<Card>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameView {
    pub round_num: u32,
    pub state: GamePhase,
    pub active_player_id: Option<PlayerId>,
    pub player_order: Vec<PlayerId>,
    pub players: HashMap<PlayerId, PlayerView>,
}
