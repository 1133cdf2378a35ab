mod room;
mod user_name;

use std::{
    cell::RefCell,
    collections::HashMap,
    net::{SocketAddr, UdpSocket},
    rc::Rc,
    time::{Duration, Instant, SystemTime},
};

use intrigue_core::{
    CardSet, ClientMessage, Game, GameError, GameIo, GamePhase, PlayerId, ServerMessage,
};
use log::{debug, error, info, warn};
use renet::{
    transport::{NetcodeServerTransport, ServerAuthentication, ServerConfig},
    ClientId, ConnectionConfig, DefaultChannel, RenetServer, ServerEvent,
};
use tokio::time;
use uuid::Uuid;

use crate::{room::Room, user_name::Username};

/// Collaborator handed to the engine. Messages pile up here and the polling
/// loop flushes them into the transport once the engine returns.
#[derive(Clone, Default)]
struct Outbox {
    queue: Rc<RefCell<Vec<(Option<PlayerId>, ServerMessage)>>>,
}

impl Outbox {
    fn drain(&self) -> Vec<(Option<PlayerId>, ServerMessage)> {
        self.queue.borrow_mut().drain(..).collect()
    }
}

impl GameIo for Outbox {
    fn broadcast(&self, message: ServerMessage) {
        self.queue.borrow_mut().push((None, message));
    }

    fn emit(&self, player_id: PlayerId, message: ServerMessage) {
        self.queue.borrow_mut().push((Some(player_id), message));
    }
}

fn handle_client_message(
    message: ClientMessage,
    player_id: PlayerId,
    room: &mut Room,
    game: &mut Option<Game>,
    outbox: &Outbox,
) {
    match message {
        ClientMessage::SetName(name) => {
            room.set_player_name(player_id, name);
        }
        ClientMessage::Chat(text) => {
            if let Some(chat) = room.handle_message(player_id, text) {
                outbox.broadcast(ServerMessage::Chat {
                    sender_name: chat.sender_name.clone(),
                    text: chat.text.clone(),
                });
            }
        }
        ClientMessage::StartGame => {
            if !room.is_leader(player_id) {
                outbox.emit(
                    player_id,
                    ServerMessage::SystemMessage("Only the leader can start a game".to_string()),
                );
                return;
            }
            if let Some(running) = game.as_mut() {
                match running.state {
                    GamePhase::InProgress => {
                        outbox.emit(
                            player_id,
                            ServerMessage::SystemMessage(
                                "A round is already in progress".to_string(),
                            ),
                        );
                        return;
                    }
                    GamePhase::RoundOver => {
                        running.new_round();
                        return;
                    }
                    GamePhase::Waiting | GamePhase::GameOver => {}
                }
            }
            let members = room.members();
            if members.len() < 2 {
                outbox.emit(
                    player_id,
                    ServerMessage::SystemMessage(
                        "At least two players are needed to start".to_string(),
                    ),
                );
                return;
            }
            // the premium set carries the five-to-eight player table
            let card_set = if members.len() > 4 {
                CardSet::Premium
            } else {
                CardSet::Classic
            };
            let mut new_game = Game::new(Box::new(outbox.clone()), card_set);
            new_game.setup(&members);
            new_game.new_round();
            *game = Some(new_game);
        }
        ClientMessage::EndGame => {
            if !room.is_leader(player_id) {
                outbox.emit(
                    player_id,
                    ServerMessage::SystemMessage("Only the leader can end the game".to_string()),
                );
                return;
            }
            if game.take().is_some() {
                outbox.broadcast(ServerMessage::SystemMessage(
                    "The game was ended by the leader".to_string(),
                ));
            }
        }
        ClientMessage::PlayCard {
            card_id,
            effect_data,
        } => {
            let Some(running) = game.as_mut() else {
                outbox.emit(
                    player_id,
                    ServerMessage::SystemMessage("No game is in progress".to_string()),
                );
                return;
            };
            match running.play_card(player_id, card_id, effect_data) {
                Ok(outcome) => debug!("{} played card {}: {:?}", player_id, card_id, outcome),
                Err(err) => {
                    if matches!(err, GameError::Internal(_)) {
                        error!("engine fault on move by {}: {}", player_id, err);
                    }
                    outbox.emit(
                        player_id,
                        ServerMessage::SystemMessage(format!("Illegal move: {}", err)),
                    );
                }
            }
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    println!("Usage: [SERVER_PORT]");
    let args: Vec<String> = std::env::args().collect();
    let public_addr: SocketAddr = format!("0.0.0.0:{}", args[1]).parse().unwrap();
    let connection_config = ConnectionConfig::default();
    let mut server: RenetServer = RenetServer::new(connection_config);

    let current_time = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap();
    let server_config = ServerConfig {
        current_time,
        max_clients: 64,
        protocol_id: 0,
        public_addresses: vec![public_addr],
        authentication: ServerAuthentication::Unsecure,
    };
    let socket: UdpSocket = UdpSocket::bind(public_addr).unwrap();
    let mut transport = NetcodeServerTransport::new(server_config, socket).unwrap();

    let mut room = Room::new();
    let mut game: Option<Game> = None;
    let outbox = Outbox::default();

    // connection registry: stable player ids on one side, transport client
    // ids on the other
    let mut player_ids: HashMap<ClientId, PlayerId> = HashMap::new();
    let mut client_ids: HashMap<PlayerId, ClientId> = HashMap::new();

    let mut last_updated = Instant::now();
    let mut interval = time::interval(Duration::from_millis(50));

    loop {
        interval.tick().await;
        let now = Instant::now();
        let duration = now - last_updated;
        last_updated = now;
        server.update(duration);
        transport.update(duration, &mut server).unwrap();

        while let Some(event) = server.get_event() {
            match event {
                ServerEvent::ClientConnected { client_id } => {
                    let user_data = transport.user_data(client_id).unwrap();
                    let username = Username::from_user_data(&user_data);
                    let player_id = Uuid::new_v4();
                    player_ids.insert(client_id, player_id);
                    client_ids.insert(player_id, client_id);
                    room.add_player(player_id);
                    room.set_player_name(player_id, username.0.clone());
                    info!("{} connected as {}", username.0, player_id);
                    if let Some(running) = game.as_mut() {
                        running.add_spectator(player_id);
                        outbox.emit(
                            player_id,
                            ServerMessage::GameData(
                                running.serialize_for_player(Some(player_id)),
                            ),
                        );
                    }
                    outbox.broadcast(ServerMessage::SystemMessage(format!(
                        "{} joined the room",
                        username.0
                    )));
                }
                ServerEvent::ClientDisconnected { client_id, reason } => {
                    let Some(player_id) = player_ids.remove(&client_id) else {
                        continue;
                    };
                    client_ids.remove(&player_id);
                    let name = room
                        .get_player_by_id(player_id)
                        .map(|p| p.name.clone())
                        .unwrap_or_default();
                    info!("{} disconnected: {}", name, reason);
                    room.remove_player(player_id);
                    if let Some(running) = game.as_mut() {
                        running.remove_user(player_id);
                    }
                    outbox.broadcast(ServerMessage::SystemMessage(format!(
                        "{} left the room",
                        name
                    )));
                }
            }
        }

        for client_id in server.clients_id() {
            while let Some(message) =
                server.receive_message(client_id, DefaultChannel::ReliableOrdered)
            {
                let Some(player_id) = player_ids.get(&client_id).copied() else {
                    continue;
                };
                let text = String::from_utf8(message.into()).unwrap_or_default();
                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(parsed) => {
                        handle_client_message(parsed, player_id, &mut room, &mut game, &outbox)
                    }
                    Err(err) => warn!("dropping malformed message from {}: {}", player_id, err),
                }
            }
        }

        for (recipient, message) in outbox.drain() {
            let Ok(encoded) = serde_json::to_string(&message) else {
                continue;
            };
            match recipient {
                Some(player_id) => {
                    if let Some(client_id) = client_ids.get(&player_id) {
                        server.send_message(*client_id, DefaultChannel::ReliableOrdered, encoded);
                    }
                }
                None => server.broadcast_message(DefaultChannel::ReliableOrdered, encoded),
            }
        }

        transport.send_packets(&mut server);
    }
}
