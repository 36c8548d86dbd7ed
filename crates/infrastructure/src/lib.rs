//! Looking Glass Infrastructure Layer
pub mod dns;
pub mod looking_glass;
pub mod wire;

pub use looking_glass::LookingGlass;
