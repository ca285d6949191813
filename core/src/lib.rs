//! Root of the `edu-core` library.

// Prevent accidental direct writes to stdout/stderr in library code. All
// user-visible output must go through the event queue or tracing.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod config;
pub mod config_types;
mod controller;
pub mod error;
pub mod forms;
pub mod inactivity;
pub mod notifications;
pub mod overlay;
pub mod protocol;
pub mod search;
pub mod theme;
pub mod timing;
pub mod transport;

pub use controller::INITIAL_SUBMIT_ID;
pub use controller::LOGGING_OUT_MESSAGE;
pub use controller::SEARCH_FAILED_MESSAGE;
pub use controller::UiController;
pub use transport::HttpTransport;
pub use transport::Transport;
