use crate::{events::ServerMessage, player::PlayerId};

/// Outward side effects of the engine. The engine assumes no transport; it
/// only calls these as opaque operations, and tests substitute a recording
/// stub.
pub trait GameIo {
    fn broadcast(&self, message: ServerMessage);

    fn emit(&self, player_id: PlayerId, message: ServerMessage);

    fn system_message(&self, text: String) {
        self.broadcast(ServerMessage::SystemMessage(text));
    }
}
