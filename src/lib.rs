pub mod cli;
pub mod config;
pub mod logging;
pub mod registry;
pub mod updater;
pub mod worker;
