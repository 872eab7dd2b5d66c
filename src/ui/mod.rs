pub mod gamepad;
pub mod input;
pub mod renderer;
pub mod scripted;
pub mod surface;
pub mod terminal;
