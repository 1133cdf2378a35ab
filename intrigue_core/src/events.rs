use serde::{Deserialize, Serialize};

use crate::{
    card::{Card, CardId},
    player::PlayerId,
    view::GameView,
};

/// Optional payload accompanying a played card: who the effect is aimed at
/// and, for the Guard, the guessed number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectData {
    pub target_player_id: Option<PlayerId>,
    pub guard_number_guess: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ServerMessage {
    GameData(GameView),
    SystemMessage(String),
    CardReveal { player_id: PlayerId, hand: Vec<Card> },
    Chat { sender_name: String, text: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClientMessage {
    SetName(String),
    Chat(String),
    StartGame,
    EndGame,
    PlayCard {
        card_id: CardId,
        effect_data: Option<EffectData>,
    },
}
