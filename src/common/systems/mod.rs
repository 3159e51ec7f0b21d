pub mod movement;
pub mod pathfind;
pub mod validate;
