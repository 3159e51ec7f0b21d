pub mod battle;
pub mod components;
pub mod error;
pub mod message;
pub mod resources;
pub mod systems;
