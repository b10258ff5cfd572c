pub mod cli;
pub mod export;
pub mod roster;
pub mod server;
pub mod session;
