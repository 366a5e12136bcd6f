pub mod core;
pub mod sandbox;
pub mod tools;

// Model access
pub mod llm;

// Turn loop
pub mod agent;

// Process-level plumbing
pub mod cli;
pub mod config;
pub mod logging;
