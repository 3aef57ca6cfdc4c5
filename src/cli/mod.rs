//! CLI module for the slugnotes application
mod app;
mod args;

pub use app::*;
pub use args::*;
