use std::collections::HashMap;

use log::info;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::{
    card::{Card, CardSet},
    error::GameError,
    events::ServerMessage,
    io::GameIo,
    player::{Player, PlayerId},
    view::GameView,
};

#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Waiting,
    InProgress,
    RoundOver,
    GameOver,
}

/// One table of players across rounds. All mutation goes through the
/// documented operations; callers must serialize moves per game instance.
pub struct Game {
    pub io: Box<dyn GameIo>,
    pub card_set: CardSet,
    pub players: HashMap<PlayerId, Player>,
    /// Join order; also the turn order for every round.
    pub player_order: Vec<PlayerId>,
    pub player_order_cursor: usize,
    pub active_player_id: Option<PlayerId>,
    pub spectator_ids: Vec<PlayerId>,
    /// Dealt cards are never removed from the deck; the cursor advances past
    /// them instead.
    pub deck: Vec<Card>,
    pub deck_cursor: usize,
    pub burn_card: Option<Card>,
    pub round_num: u32,
    pub state: GamePhase,
    pub last_round_winner: Option<PlayerId>,
}

impl Game {
    pub fn new(io: Box<dyn GameIo>, card_set: CardSet) -> Self {
        Game {
            io,
            card_set,
            players: HashMap::new(),
            player_order: vec![],
            player_order_cursor: 0,
            active_player_id: None,
            spectator_ids: vec![],
            deck: vec![],
            deck_cursor: 0,
            burn_card: None,
            round_num: 0,
            state: GamePhase::Waiting,
            last_round_winner: None,
        }
    }

    /// Fills the player registry from room membership. Only effective once,
    /// at game creation.
    pub fn setup(&mut self, users: &[(PlayerId, String)]) {
        if !self.players.is_empty() {
            return;
        }
        for (id, name) in users {
            self.players.insert(*id, Player::new(*id, name.clone()));
            self.player_order.push(*id);
        }
    }

    pub fn add_spectator(&mut self, player_id: PlayerId) {
        if !self.players.contains_key(&player_id) && !self.spectator_ids.contains(&player_id) {
            self.spectator_ids.push(player_id);
        }
    }

    /// Marks a participant as gone. Round history stays; the player object is
    /// never deleted mid-game.
    pub fn remove_user(&mut self, player_id: PlayerId) {
        if let Some(player) = self.players.get_mut(&player_id) {
            player.connected = false;
        }
        self.spectator_ids.retain(|id| *id != player_id);
    }

    /// Builds and shuffles the deck, sets the burn card aside, deals one card
    /// per player and a second one to the round's first active player.
    pub fn new_round(&mut self) {
        self.round_num += 1;
        for player in self.players.values_mut() {
            player.reset_for_new_round();
        }

        let mut deck = self.card_set.build_deck();
        deck.shuffle(&mut rand::thread_rng());
        self.burn_card = deck.pop();
        self.deck = deck;
        self.deck_cursor = 0;

        // the previous round's hand winner leads the next round
        self.player_order_cursor = self
            .last_round_winner
            .and_then(|winner| self.player_order.iter().position(|id| *id == winner))
            .unwrap_or(0);
        self.active_player_id = self.player_order.get(self.player_order_cursor).copied();

        let order = self.player_order.clone();
        for id in &order {
            let card = self.draw_card().expect("deck too small for the table");
            if let Some(player) = self.players.get_mut(id) {
                player.add_card_to_hand(card);
            }
        }
        if let Some(active_id) = self.active_player_id {
            let card = self.draw_card().expect("deck too small for the table");
            if let Some(player) = self.players.get_mut(&active_id) {
                player.add_card_to_hand(card);
            }
        }

        self.state = GamePhase::InProgress;
        info!(
            "round {} started with {} players",
            self.round_num,
            self.player_order.len()
        );
        self.io
            .system_message(format!("Round {} has started", self.round_num));
        self.broadcast_game_data();
    }

    /// Next card from the deck, or the burn card once the deck is spent.
    pub fn draw_card(&mut self) -> Option<Card> {
        if self.deck_cursor < self.deck.len() {
            let card = self.deck[self.deck_cursor];
            self.deck_cursor += 1;
            Some(card)
        } else {
            self.burn_card.take()
        }
    }

    pub fn cards_remaining(&self) -> usize {
        self.deck.len() - self.deck_cursor
    }

    pub fn get_alive_players(&self) -> Vec<&Player> {
        self.player_order
            .iter()
            .filter_map(|id| self.players.get(id))
            .filter(|player| !player.is_knocked_out)
            .collect()
    }

    pub fn player(&self, player_id: PlayerId) -> Result<&Player, GameError> {
        self.players.get(&player_id).ok_or(GameError::UnknownPlayer)
    }

    pub(crate) fn player_mut(&mut self, player_id: PlayerId) -> Result<&mut Player, GameError> {
        self.players
            .get_mut(&player_id)
            .ok_or(GameError::UnknownPlayer)
    }

    pub fn tokens_to_win(&self) -> u32 {
        match self.player_order.len() {
            2 => 7,
            3 => 5,
            _ => 4,
        }
    }

    /// Projection of the game as one viewer may see it. `None` is the
    /// engine-internal full-visibility mode; any other viewer sees every
    /// hand but their own withheld.
    pub fn serialize_for_player(&self, viewer_id: Option<PlayerId>) -> GameView {
        let players = self
            .players
            .iter()
            .map(|(id, player)| {
                let include_hand = viewer_id.map_or(true, |viewer| viewer == *id);
                (*id, player.view(include_hand))
            })
            .collect();
        GameView {
            round_num: self.round_num,
            state: self.state,
            active_player_id: self.active_player_id,
            player_order: self.player_order.clone(),
            players,
        }
    }

    /// Sends every participant and spectator their own projection. This is
    /// the only path by which state leaves the engine.
    pub fn broadcast_game_data(&self) {
        for id in self.player_order.iter().chain(self.spectator_ids.iter()) {
            self.io.emit(
                *id,
                ServerMessage::GameData(self.serialize_for_player(Some(*id))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::test_support::{test_game, test_game_with_io, RecordingIo};

    fn card_accounting(game: &Game) -> usize {
        let in_hands: usize = game.players.values().map(|p| p.hand.len()).sum();
        let in_discards: usize = game.players.values().map(|p| p.discard_pile.len()).sum();
        game.cards_remaining()
            + game.burn_card.iter().count()
            + in_hands
            + in_discards
    }

    #[test]
    fn new_round_should_deal_one_card_each_and_two_to_the_first_player() {
        let (mut game, ids) = test_game(3);

        game.new_round();

        let active_id = game.active_player_id.unwrap();
        for id in &ids {
            let expected = if *id == active_id { 2 } else { 1 };
            assert_eq!(game.players[id].hand.len(), expected);
        }
        assert_eq!(game.state, GamePhase::InProgress);
        assert_eq!(game.round_num, 1);
    }

    #[test]
    fn new_round_accounting_should_match_the_composition() {
        let (mut game, _ids) = test_game(3);

        game.new_round();

        assert_eq!(card_accounting(&game), game.card_set.total_card_count());
    }

    #[test]
    fn draw_card_should_fall_back_to_the_burn_card_when_the_deck_is_spent() {
        let (mut game, _ids) = test_game(2);
        game.new_round();
        let burn = game.burn_card.unwrap();

        game.deck_cursor = game.deck.len();

        assert_eq!(game.draw_card(), Some(burn));
        assert_eq!(game.draw_card(), None);
    }

    #[test]
    fn setup_should_only_take_effect_at_game_creation() {
        let (mut game, ids) = test_game(3);

        game.setup(&[(Uuid::new_v4(), "Latecomer".to_string())]);

        assert_eq!(game.players.len(), 3);
        assert_eq!(game.player_order, ids);
    }

    #[test]
    fn remove_user_should_mark_disconnected_and_drop_spectator_status() {
        let (mut game, ids) = test_game(3);
        let watcher = Uuid::new_v4();
        game.add_spectator(watcher);

        game.remove_user(ids[1]);
        game.remove_user(watcher);

        assert!(!game.players[&ids[1]].connected);
        assert!(game.players.contains_key(&ids[1]));
        assert!(game.spectator_ids.is_empty());
    }

    #[test]
    fn get_alive_players_should_exclude_knocked_out_players() {
        let (mut game, ids) = test_game(3);
        game.players.get_mut(&ids[1]).unwrap().is_knocked_out = true;

        let alive: Vec<PlayerId> = game.get_alive_players().iter().map(|p| p.id).collect();

        assert_eq!(alive, vec![ids[0], ids[2]]);
    }

    #[test]
    fn serialize_should_include_the_hand_only_for_the_viewer() {
        let (mut game, ids) = test_game(3);
        game.new_round();

        let view = game.serialize_for_player(Some(ids[0]));

        assert_eq!(view.round_num, game.round_num);
        assert_eq!(view.state, game.state);
        assert!(view.players[&ids[0]].hand.is_some());
        assert!(view.players[&ids[1]].hand.is_none());
        assert!(view.players[&ids[2]].hand.is_none());
    }

    #[test]
    fn serialize_should_hide_every_hand_from_a_spectator() {
        let (mut game, ids) = test_game(2);
        game.new_round();
        let watcher = Uuid::new_v4();
        game.add_spectator(watcher);

        let view = game.serialize_for_player(Some(watcher));

        assert!(ids.iter().all(|id| view.players[id].hand.is_none()));
    }

    #[test]
    fn serialize_without_a_viewer_should_expose_every_hand() {
        let (mut game, ids) = test_game(2);
        game.new_round();

        let view = game.serialize_for_player(None);

        assert!(ids.iter().all(|id| view.players[id].hand.is_some()));
    }

    #[test]
    fn broadcast_should_send_each_player_their_own_projection() {
        let io = RecordingIo::default();
        let (mut game, ids) = test_game_with_io(2, io.clone());

        game.new_round();

        for id in &ids {
            let views = io.game_data_sent_to(*id);
            let view = views.last().expect("player received game data");
            assert!(view.players[id].hand.is_some());
            for other in ids.iter().filter(|other| *other != id) {
                assert!(view.players[other].hand.is_none());
            }
        }
    }

    #[test]
    fn tokens_to_win_should_shrink_with_the_table_size() {
        let (game2, _) = test_game(2);
        let (game3, _) = test_game(3);
        let (game5, _) = test_game(5);

        assert_eq!(game2.tokens_to_win(), 7);
        assert_eq!(game3.tokens_to_win(), 5);
        assert_eq!(game5.tokens_to_win(), 4);
    }
}
