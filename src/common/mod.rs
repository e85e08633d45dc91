// Generator and simulation core shared by the client and the tests
pub mod constants;
pub mod config;
pub mod grid;
pub mod entity;
pub mod dungeon;
pub mod floor;
pub mod complex;
pub mod lighting;
pub mod fov;
pub mod game_logic;
pub mod snapshot;
