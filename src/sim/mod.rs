pub mod game;
pub mod ticker;
pub mod world;
