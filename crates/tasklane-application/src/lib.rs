//! Application layer for Tasklane.
//!
//! This crate coordinates the session lifecycle, the task list and route
//! resolution on top of the contracts defined in `tasklane-core`.

pub mod routing;
pub mod session_manager;
pub mod task_list;

#[cfg(test)]
mod testing;

pub use routing::{Route, resolve};
pub use session_manager::{SessionManager, SessionTicket};
pub use task_list::TaskListController;
