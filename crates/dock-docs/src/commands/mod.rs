pub mod check;
pub mod config_mode;
pub mod generate;
pub mod setup;
pub mod templates;
