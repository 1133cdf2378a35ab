use std::{cell::RefCell, rc::Rc};

use uuid::Uuid;

use crate::{
    card::{Card, CardSet},
    events::ServerMessage,
    game_state::Game,
    io::GameIo,
    player::PlayerId,
    view::GameView,
};

/// Collaborator stub that records everything the engine sends out.
#[derive(Clone, Default)]
pub struct RecordingIo {
    pub messages: Rc<RefCell<Vec<(Option<PlayerId>, ServerMessage)>>>,
}

impl RecordingIo {
    pub fn game_data_sent_to(&self, player_id: PlayerId) -> Vec<GameView> {
        self.messages
            .borrow()
            .iter()
            .filter_map(|(recipient, message)| match (recipient, message) {
                (Some(id), ServerMessage::GameData(view)) if *id == player_id => {
                    Some(view.clone())
                }
                _ => None,
            })
            .collect()
    }

    pub fn reveals_sent_to(&self, player_id: PlayerId) -> Vec<(PlayerId, Vec<Card>)> {
        self.messages
            .borrow()
            .iter()
            .filter_map(|(recipient, message)| match (recipient, message) {
                (Some(id), ServerMessage::CardReveal { player_id: shown, hand })
                    if *id == player_id =>
                {
                    Some((*shown, hand.clone()))
                }
                _ => None,
            })
            .collect()
    }

    pub fn system_messages(&self) -> Vec<String> {
        self.messages
            .borrow()
            .iter()
            .filter_map(|(_, message)| match message {
                ServerMessage::SystemMessage(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl GameIo for RecordingIo {
    fn broadcast(&self, message: ServerMessage) {
        self.messages.borrow_mut().push((None, message));
    }

    fn emit(&self, player_id: PlayerId, message: ServerMessage) {
        self.messages.borrow_mut().push((Some(player_id), message));
    }
}

pub fn test_game(player_count: usize) -> (Game, Vec<PlayerId>) {
    test_game_with_io(player_count, RecordingIo::default())
}

pub fn test_game_with_io(player_count: usize, io: RecordingIo) -> (Game, Vec<PlayerId>) {
    let users: Vec<(PlayerId, String)> = (0..player_count)
        .map(|i| (Uuid::new_v4(), format!("Player {}", i + 1)))
        .collect();
    let mut game = Game::new(Box::new(io), CardSet::Classic);
    game.setup(&users);
    let ids = users.into_iter().map(|(id, _)| id).collect();
    (game, ids)
}
