pub mod config;
pub mod game;
pub mod inbox;
pub mod systems;
pub mod timestep;
