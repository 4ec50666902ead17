// Library exports for the timebox CLI
// This allows testing of internal modules

pub mod commands;
pub mod config;
