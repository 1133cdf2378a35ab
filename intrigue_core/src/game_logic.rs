use log::{debug, info};

use crate::{
    card::{Card, CardId, CardKind, EffectKind},
    error::GameError,
    events::{EffectData, ServerMessage},
    game_state::{Game, GamePhase},
    player::PlayerId,
};

/// Result of a legal play. A card can be legally played and discarded while
/// its effect still comes to nothing, which is not an error.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum EffectOutcome {
    Applied,
    NoEffect,
}

impl EffectOutcome {
    pub fn applied(&self) -> bool {
        matches!(self, EffectOutcome::Applied)
    }
}

impl Game {
    /// The single mutation entry point. Rejected moves leave the game
    /// untouched; a legal play discards the card first and resolves its
    /// effect second, so a fizzled effect still costs the card.
    pub fn play_card(
        &mut self,
        player_id: PlayerId,
        card_id: CardId,
        effect_data: Option<EffectData>,
    ) -> Result<EffectOutcome, GameError> {
        if self.state != GamePhase::InProgress {
            return Err(GameError::RoundNotActive);
        }
        if self.active_player_id != Some(player_id) {
            return Err(GameError::NotYourTurn);
        }

        let player = self.player(player_id)?;
        let card = *player.get_card(card_id).ok_or(GameError::CardNotInHand)?;

        if card.kind.blocked_by_countess() && player.has_card(CardKind::Countess) {
            return Err(GameError::CountessObliges);
        }
        if let Some(guess) = effect_data.as_ref().and_then(|d| d.guard_number_guess) {
            if card.kind.needs_guess() && guess == card.rank() {
                return Err(GameError::IllegalGuess);
            }
        }

        self.player_mut(player_id)?.discard_card_by_id(card_id)?;
        debug!("{} plays {}", self.player(player_id)?.name, card.label());

        let outcome = self.perform_card_effect(card, effect_data.as_ref())?;

        if self.state == GamePhase::InProgress {
            if self.get_alive_players().len() <= 1 {
                self.end_round();
            } else {
                self.next_turn();
            }
        }
        self.broadcast_game_data();
        Ok(outcome)
    }

    /// Resolves a card that has already left the acting player's hand.
    /// Returns `NoEffect` when the effect comes to nothing (missing or
    /// protected target, missing guess); only state-model violations are
    /// errors.
    pub fn perform_card_effect(
        &mut self,
        card: Card,
        effect_data: Option<&EffectData>,
    ) -> Result<EffectOutcome, GameError> {
        let acting_id = self
            .active_player_id
            .ok_or_else(|| GameError::Internal("no active player".to_string()))?;

        // protection from the previous cycle is spent at the latest when the
        // player acts again
        self.player_mut(acting_id)?.handmaid_active = false;

        let target_id = effect_data.and_then(|d| d.target_player_id);

        match card.kind.effect() {
            EffectKind::Guess => self.resolve_guess(
                acting_id,
                target_id,
                effect_data.and_then(|d| d.guard_number_guess),
            ),
            EffectKind::Peek => self.resolve_peek(acting_id, target_id),
            EffectKind::Compare => self.resolve_compare(acting_id, target_id),
            EffectKind::Protect => {
                self.player_mut(acting_id)?.handmaid_active = true;
                Ok(EffectOutcome::Applied)
            }
            EffectKind::DiscardAndDraw => self.resolve_forced_discard(acting_id, target_id, true),
            EffectKind::DiscardHand => self.resolve_forced_discard(acting_id, target_id, false),
            EffectKind::Swap => self.resolve_swap(acting_id, target_id),
            EffectKind::SelfEliminate => {
                self.knock_out_player(acting_id)?;
                Ok(EffectOutcome::Applied)
            }
            EffectKind::Mark => self.resolve_mark(acting_id, target_id),
            EffectKind::Noop => Ok(EffectOutcome::Applied),
        }
    }

    /// Uniform target rule: the target must exist, be in the round and not
    /// be protected. Self-targeting only where the card allows it; a player
    /// targeting themselves is not blocked by their own protection.
    fn valid_target(
        &self,
        acting_id: PlayerId,
        target_id: Option<PlayerId>,
        allow_self: bool,
    ) -> Option<PlayerId> {
        let target_id = target_id?;
        if target_id == acting_id {
            return allow_self.then_some(target_id);
        }
        let target = self.players.get(&target_id)?;
        if target.is_knocked_out || target.handmaid_active {
            return None;
        }
        Some(target_id)
    }

    fn resolve_guess(
        &mut self,
        acting_id: PlayerId,
        target_id: Option<PlayerId>,
        guess: Option<u8>,
    ) -> Result<EffectOutcome, GameError> {
        let Some(guess) = guess else {
            return Ok(EffectOutcome::NoEffect);
        };
        let Some(target_id) = self.valid_target(acting_id, target_id, false) else {
            return Ok(EffectOutcome::NoEffect);
        };
        let matched = self
            .player(target_id)?
            .hand
            .first()
            .map_or(false, |card| card.rank() == guess);
        if matched {
            self.knock_out_player(target_id)?;
        }
        Ok(EffectOutcome::Applied)
    }

    fn resolve_peek(
        &mut self,
        acting_id: PlayerId,
        target_id: Option<PlayerId>,
    ) -> Result<EffectOutcome, GameError> {
        let Some(target_id) = self.valid_target(acting_id, target_id, false) else {
            return Ok(EffectOutcome::NoEffect);
        };
        let hand = self.player(target_id)?.hand.clone();
        self.io.emit(
            acting_id,
            ServerMessage::CardReveal {
                player_id: target_id,
                hand,
            },
        );
        Ok(EffectOutcome::Applied)
    }

    fn resolve_compare(
        &mut self,
        acting_id: PlayerId,
        target_id: Option<PlayerId>,
    ) -> Result<EffectOutcome, GameError> {
        let Some(target_id) = self.valid_target(acting_id, target_id, false) else {
            return Ok(EffectOutcome::NoEffect);
        };
        // the played card is already discarded, so each side holds one card
        let mine = self.player(acting_id)?.hand.first().map(|card| card.rank());
        let theirs = self.player(target_id)?.hand.first().map(|card| card.rank());
        let (Some(mine), Some(theirs)) = (mine, theirs) else {
            return Ok(EffectOutcome::NoEffect);
        };
        if mine < theirs {
            self.knock_out_player(acting_id)?;
        } else if theirs < mine {
            self.knock_out_player(target_id)?;
        }
        Ok(EffectOutcome::Applied)
    }

    fn resolve_forced_discard(
        &mut self,
        acting_id: PlayerId,
        target_id: Option<PlayerId>,
        redraw: bool,
    ) -> Result<EffectOutcome, GameError> {
        let Some(target_id) = self.valid_target(acting_id, target_id, true) else {
            return Ok(EffectOutcome::NoEffect);
        };
        // the princess may never be folded; forcing her out is a knockout
        if self.player(target_id)?.has_card(CardKind::Princess) {
            self.knock_out_player(target_id)?;
            return Ok(EffectOutcome::Applied);
        }
        {
            let target = self.player_mut(target_id)?;
            let mut folded = std::mem::take(&mut target.hand);
            target.discard_pile.append(&mut folded);
        }
        if redraw {
            if let Some(card) = self.draw_card() {
                self.player_mut(target_id)?.add_card_to_hand(card);
            }
        }
        Ok(EffectOutcome::Applied)
    }

    fn resolve_swap(
        &mut self,
        acting_id: PlayerId,
        target_id: Option<PlayerId>,
    ) -> Result<EffectOutcome, GameError> {
        let Some(target_id) = self.valid_target(acting_id, target_id, false) else {
            return Ok(EffectOutcome::NoEffect);
        };
        // swap the hand contents in place, not the card identities
        let mine = std::mem::take(&mut self.player_mut(acting_id)?.hand);
        let theirs = std::mem::replace(&mut self.player_mut(target_id)?.hand, mine);
        self.player_mut(acting_id)?.hand = theirs;
        Ok(EffectOutcome::Applied)
    }

    fn resolve_mark(
        &mut self,
        acting_id: PlayerId,
        target_id: Option<PlayerId>,
    ) -> Result<EffectOutcome, GameError> {
        let Some(target_id) = self.valid_target(acting_id, target_id, false) else {
            return Ok(EffectOutcome::NoEffect);
        };
        self.player_mut(target_id)?.jester_recipient_id = Some(acting_id);
        Ok(EffectOutcome::Applied)
    }

    pub fn knock_out_player(&mut self, player_id: PlayerId) -> Result<(), GameError> {
        let player = self.player_mut(player_id)?;
        let tokens_before = player.num_tokens;
        player.knock_out();
        let name = player.name.clone();
        let constable_token = player.num_tokens > tokens_before;
        self.io
            .system_message(format!("{} is knocked out of the round", name));
        if constable_token {
            self.io
                .system_message(format!("{} earns a token for the discarded Constable", name));
        }
        Ok(())
    }

    /// Moves the turn cursor to the next player still in the round and deals
    /// them a card. Protection expires when its owner's own turn begins.
    /// When no card is left to draw, the round is over instead.
    pub fn next_turn(&mut self) {
        if self.get_alive_players().len() <= 1 {
            self.end_round();
            return;
        }
        loop {
            self.player_order_cursor = (self.player_order_cursor + 1) % self.player_order.len();
            let id = self.player_order[self.player_order_cursor];
            if !self.players[&id].is_knocked_out {
                break;
            }
        }
        let id = self.player_order[self.player_order_cursor];
        self.active_player_id = Some(id);
        if let Some(player) = self.players.get_mut(&id) {
            player.handmaid_active = false;
        }
        match self.draw_card() {
            Some(card) => {
                if let Some(player) = self.players.get_mut(&id) {
                    player.add_card_to_hand(card);
                }
            }
            None => self.end_round(),
        }
    }

    /// Scores the round: the highest final card number among the players
    /// still standing wins, ties going to the earliest seat in turn order. A
    /// jester link redirects the round's token away from the hand winner.
    pub fn end_round(&mut self) {
        if self.state != GamePhase::InProgress {
            return;
        }
        self.state = GamePhase::RoundOver;
        self.active_player_id = None;

        let mut winner_id: Option<PlayerId> = None;
        let mut best = 0u8;
        for id in &self.player_order {
            let Some(player) = self.players.get(id) else {
                continue;
            };
            if player.is_knocked_out {
                continue;
            }
            let number = player.final_card_number();
            if winner_id.is_none() || number > best {
                winner_id = Some(*id);
                best = number;
            }
        }
        let Some(winner_id) = winner_id else {
            self.io
                .system_message("The round ends with no one left standing".to_string());
            return;
        };
        self.last_round_winner = Some(winner_id);
        info!("round {} won by {}", self.round_num, winner_id);

        let winner = &self.players[&winner_id];
        self.io.system_message(format!(
            "{} wins round {} with a final number of {}",
            winner.name, self.round_num, best
        ));

        let recipient_id = winner.jester_recipient_id.unwrap_or(winner_id);
        if recipient_id != winner_id {
            if let Some(recipient) = self.players.get(&recipient_id) {
                self.io.system_message(format!(
                    "The round's token goes to {} for the jester's wager",
                    recipient.name
                ));
            }
        }

        let threshold = self.tokens_to_win();
        if let Some(recipient) = self.players.get_mut(&recipient_id) {
            recipient.num_tokens += 1;
            if recipient.num_tokens >= threshold {
                let name = recipient.name.clone();
                let tokens = recipient.num_tokens;
                self.state = GamePhase::GameOver;
                self.io
                    .system_message(format!("{} wins the game with {} tokens", name, tokens));
            }
        }
    }
}
