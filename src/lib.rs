pub mod browser;
pub mod checker;
pub mod config;
pub mod logging;
