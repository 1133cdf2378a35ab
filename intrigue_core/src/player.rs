use uuid::Uuid;

use crate::{
    card::{Card, CardId, CardKind},
    error::GameError,
    view::PlayerView,
};

pub type PlayerId = Uuid;

/// Per-participant state, owned exclusively by the round engine. The struct
/// lives for the whole game; round-scoped fields are wiped by
/// `reset_for_new_round`.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub hand: Vec<Card>,
    pub discard_pile: Vec<Card>,
    pub num_tokens: u32,
    pub is_knocked_out: bool,
    pub handmaid_active: bool,
    pub connected: bool,
    pub jester_recipient_id: Option<PlayerId>,
}

impl Player {
    pub fn new(id: PlayerId, name: String) -> Self {
        Player {
            id,
            name,
            hand: vec![],
            discard_pile: vec![],
            num_tokens: 0,
            is_knocked_out: false,
            handmaid_active: false,
            connected: true,
            jester_recipient_id: None,
        }
    }

    pub fn add_card_to_hand(&mut self, card: Card) {
        self.hand.push(card);
    }

    /// Moves a card from hand to the discard pile. A missing id is a
    /// state-model violation, not a player mistake.
    pub fn discard_card_by_id(&mut self, card_id: CardId) -> Result<Card, GameError> {
        let index = self
            .hand
            .iter()
            .position(|card| card.id == card_id)
            .ok_or_else(|| {
                GameError::Internal(format!(
                    "card {} is not in the hand of {}",
                    card_id, self.name
                ))
            })?;
        let card = self.hand.remove(index);
        self.discard_pile.push(card);
        Ok(card)
    }

    pub fn get_card(&self, card_id: CardId) -> Option<&Card> {
        self.hand.iter().find(|card| card.id == card_id)
    }

    pub fn has_card(&self, kind: CardKind) -> bool {
        self.hand.iter().any(|card| card.kind == kind)
    }

    pub fn has_in_discard(&self, kind: CardKind) -> bool {
        self.discard_pile.iter().any(|card| card.kind == kind)
    }

    /// Takes the player out of the round. The hand goes face up onto the
    /// discard pile; a Constable found there earns a consolation token.
    pub fn knock_out(&mut self) {
        self.discard_pile.append(&mut self.hand);
        self.is_knocked_out = true;
        if self.has_in_discard(CardKind::Constable) {
            self.num_tokens += 1;
        }
    }

    /// Remaining hand card's number plus one per Count in the discard pile.
    pub fn final_card_number(&self) -> u8 {
        let count_bonus = self
            .discard_pile
            .iter()
            .filter(|card| card.kind == CardKind::Count)
            .count() as u8;
        self.hand.first().map_or(0, |card| card.rank()) + count_bonus
    }

    pub fn reset_for_new_round(&mut self) {
        self.hand.clear();
        self.discard_pile.clear();
        self.is_knocked_out = false;
        self.handmaid_active = false;
        self.jester_recipient_id = None;
    }

    pub fn view(&self, include_hand: bool) -> PlayerView {
        PlayerView {
            id: self.id,
            name: self.name.clone(),
            discard_pile: self.discard_pile.clone(),
            handmaid_active: self.handmaid_active,
            is_knocked_out: self.is_knocked_out,
            num_tokens: self.num_tokens,
            hand: include_hand.then(|| self.hand.clone()),
        }
    }
}
