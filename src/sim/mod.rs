pub mod controller;
pub mod event;
pub mod generator;
pub mod playback;
pub mod record;
pub mod round;
pub mod state;
