//! Game simulation: the world driver, the entity contract, and the
//! concrete entities (player, enemies, ground).

pub mod enemy;
pub mod entity;
pub mod ground;
pub mod player;
pub mod world;

pub use enemy::Enemy;
pub use entity::{Command, CommandQueue, Entity, EntityId, EntityStore};
pub use ground::Ground;
pub use player::Player;
pub use world::{TaskAction, TaskQueue, World, WorldContext};
