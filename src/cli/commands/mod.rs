//! CLI command implementations

pub mod config;
pub mod event;
pub mod list;
pub mod name;
pub mod provision;

pub use config::execute as config;
pub use event::execute as event;
pub use list::execute as list;
pub use name::execute as name;
pub use provision::execute as provision;
