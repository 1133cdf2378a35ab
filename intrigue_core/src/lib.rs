pub mod card;
pub mod error;
pub mod events;
pub mod game_logic;
pub mod game_state;
pub mod io;
pub mod player;
pub mod view;

#[cfg(test)]
mod test_support;

pub use card::{Card, CardId, CardKind, CardSet, EffectKind};
pub use error::GameError;
pub use events::{ClientMessage, EffectData, ServerMessage};
pub use game_logic::EffectOutcome;
pub use game_state::{Game, GamePhase};
pub use io::GameIo;
pub use player::{Player, PlayerId};
pub use view::{GameView, PlayerView};
