//! Ratatui front end: a menu-driven shell over the same catalog operations the
//! command line exposes.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
