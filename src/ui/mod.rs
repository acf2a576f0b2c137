pub mod gamepad;
pub mod input;
pub mod lights;
pub mod renderer;
pub mod screen;
pub mod sound;
