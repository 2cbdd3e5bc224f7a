pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, GameData, load_catalog, load_config, load_game_data};
