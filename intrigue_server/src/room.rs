use intrigue_core::PlayerId;

/// Lobby membership, kept in join order. The first joiner leads; leadership
/// moves to the next remaining member when the leader leaves.
pub struct RoomPlayer {
    pub id: PlayerId,
    pub name: String,
    pub is_leader: bool,
}

pub struct ChatMessage {
    pub sender_name: String,
    pub text: String,
}

#[derive(Default)]
pub struct Room {
    pub players: Vec<RoomPlayer>,
    pub messages: Vec<ChatMessage>,
}

impl Room {
    pub fn new() -> Self {
        Room::default()
    }

    pub fn add_player(&mut self, id: PlayerId) {
        if self.get_player_by_id(id).is_some() {
            return;
        }
        let is_leader = self.players.is_empty();
        self.players.push(RoomPlayer {
            id,
            name: String::new(),
            is_leader,
        });
    }

    pub fn remove_player(&mut self, id: PlayerId) -> Option<RoomPlayer> {
        let index = self.players.iter().position(|p| p.id == id)?;
        let removed = self.players.remove(index);
        if removed.is_leader {
            if let Some(next) = self.players.first_mut() {
                next.is_leader = true;
            }
        }
        Some(removed)
    }

    pub fn get_player_by_id(&self, id: PlayerId) -> Option<&RoomPlayer> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn get_leader(&self) -> Option<&RoomPlayer> {
        self.players.iter().find(|p| p.is_leader)
    }

    pub fn is_leader(&self, id: PlayerId) -> bool {
        self.get_player_by_id(id).map_or(false, |p| p.is_leader)
    }

    pub fn set_player_name(&mut self, id: PlayerId, name: String) {
        if let Some(player) = self.players.iter_mut().find(|p| p.id == id) {
            player.name = name;
        }
    }

    /// Records a chat line under the sender's current display name.
    pub fn handle_message(&mut self, sender_id: PlayerId, text: String) -> Option<&ChatMessage> {
        let sender_name = self.get_player_by_id(sender_id)?.name.clone();
        self.messages.push(ChatMessage { sender_name, text });
        self.messages.last()
    }

    /// Membership in join order, as fed to `Game::setup`.
    pub fn members(&self) -> Vec<(PlayerId, String)> {
        self.players
            .iter()
            .map(|p| (p.id, p.name.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn add_player_should_add_a_player() {
        let mut room = Room::new();
        let player_id = Uuid::new_v4();

        room.add_player(player_id);

        assert_eq!(room.players.len(), 1);
        assert!(room.get_player_by_id(player_id).is_some());
    }

    #[test]
    fn the_first_player_should_be_promoted_to_leader() {
        let mut room = Room::new();
        let player_id = Uuid::new_v4();

        room.add_player(player_id);

        assert!(room.get_player_by_id(player_id).unwrap().is_leader);
    }

    #[test]
    fn a_second_player_should_not_change_the_leader() {
        let mut room = Room::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        room.add_player(first);
        room.add_player(second);

        assert!(room.get_player_by_id(first).unwrap().is_leader);
        assert!(!room.get_player_by_id(second).unwrap().is_leader);
    }

    #[test]
    fn remove_player_should_remove_the_player() {
        let mut room = Room::new();
        let player_id = Uuid::new_v4();
        room.add_player(player_id);

        room.remove_player(player_id);

        assert!(room.players.is_empty());
    }

    #[test]
    fn removing_the_leader_should_promote_the_next_remaining_player() {
        let mut room = Room::new();
        let ids: Vec<PlayerId> = (0..4).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            room.add_player(*id);
        }

        room.remove_player(ids[0]);

        assert!(room.get_player_by_id(ids[1]).unwrap().is_leader);
        assert_eq!(room.get_leader().unwrap().id, ids[1]);
    }

    #[test]
    fn handle_message_should_record_the_text_under_the_sender_name() {
        let mut room = Room::new();
        let sender = Uuid::new_v4();
        room.add_player(sender);
        room.set_player_name(sender, "Bilbo Baggins".to_string());

        room.handle_message(sender, "hello world!".to_string());

        assert_eq!(room.messages.len(), 1);
        assert_eq!(room.messages[0].text, "hello world!");
        assert_eq!(room.messages[0].sender_name, "Bilbo Baggins");
    }
}
