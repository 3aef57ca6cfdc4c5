//! Personal notes addressed by slug
//!
//! This library provides the note entity, slug generation, the access rules
//! deciding who may see or change a note, the notes service enforcing them,
//! and the HTTP layer serving it all.

mod cli;
mod config;
mod errors;
mod helper;
mod logging;
mod note;
mod policy;
mod service;
mod slug;
mod storage;
mod types;
mod users;
mod validation;
mod web;

// Re-export key components
pub use cli::*;
pub use config::*;
pub use errors::*;
pub use helper::*;
pub use logging::*;
pub use note::*;
pub use policy::*;
pub use service::*;
pub use slug::*;
pub use storage::*;
pub use types::*;
pub use users::*;
pub use validation::*;
pub use web::*;
