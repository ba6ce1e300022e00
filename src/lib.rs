// Library surface for headless/integration tests and reuse.
// Terminal setup and the event loop live in main.rs.
pub mod action;
pub mod app;
pub mod app_dirs;
pub mod attempt;
pub mod bind;
pub mod config;
pub mod estimator;
pub mod event_log;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod timeline;
pub mod ui;

pub use action::{Action, InputEvent};
pub use estimator::{estimate, Estimator, TICK_MS};
