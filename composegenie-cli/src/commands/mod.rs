//! Command handlers -- one module per subcommand

pub mod catalog;
pub mod compose;
pub mod config;
pub mod security;
pub mod select;
pub mod template;
pub mod validate;
