//! Task domain module.
//!
//! # Module Structure
//!
//! - `model`: the confirmed `Task` entity plus the `NewTask` and `TaskPatch`
//!   request shapes used to create and modify it
//!
//! # Usage
//!
//! ```ignore
//! use tasklane_core::task::{NewTask, Task, TaskPatch};
//! ```

mod model;

// Re-export public API
pub use model::{NewTask, Task, TaskPatch};
