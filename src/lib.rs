pub mod app_state;
pub mod audio;
pub mod config;
pub mod error;
pub mod player;
pub mod prelude;
pub mod render;
pub mod server;
