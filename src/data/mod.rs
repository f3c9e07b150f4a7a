pub mod champion;
pub mod effects;
pub mod game_data;
pub mod roster;

pub use champion::{Category, ChampionId, Mode, RosterChampion};
pub use effects::{Effect, EffectInfo, EffectTable};
pub use game_data::{load_game_data, CatalogChampion, GameData, GameDataError, StaticGameData, SynergyRecord};
pub use roster::{FileRoster, Roster, RosterError};
