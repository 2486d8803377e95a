pub mod auth;
pub mod cli;
pub mod commands;
pub mod dataset;
pub mod error;
pub mod github;
pub mod logging;
pub mod merge;
pub mod models;
pub mod types;
pub mod updater;
