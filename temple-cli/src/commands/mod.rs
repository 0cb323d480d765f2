pub mod render;
pub mod watch;
