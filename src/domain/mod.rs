pub mod pace;
pub mod pad;
