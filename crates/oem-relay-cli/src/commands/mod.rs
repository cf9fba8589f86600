//! CLI command implementations.
//!
//! - [`notify`] - Relay the event from the environment
//! - [`rules`] - Show the parsed rule table

pub mod notify;
pub mod rules;

pub use notify::NotifyCommand;
pub use rules::RulesCommand;
