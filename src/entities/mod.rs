pub mod advertisement;
pub mod category;
pub mod game;
pub mod game_status;
pub mod search_query;

pub use advertisement::AdPosition;
pub use game_status::GameStatus;
