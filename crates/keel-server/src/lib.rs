// Keel server library: configuration, logging and persistence wiring for the
// deployment config admin binary

pub mod cli; // Command line interface
pub mod command; // Admin command execution
pub mod model; // Configuration
pub mod startup; // Application startup utilities

pub use model::Configuration;
