pub mod common;

pub use common::complex::{generate_complex, Complex, ComplexBuilder};
pub use common::game_logic::Game;
