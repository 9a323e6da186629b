pub mod collab;
pub mod compute;
pub mod config;
pub mod enemy;
pub mod entities;
pub mod interactions;
pub mod player;
pub mod registry;
pub mod spawner;
