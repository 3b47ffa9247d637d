//! Viewer sessions: state, commands, the single-writer loop and views.

mod command;
mod driver;
mod engine;
mod view;

pub use command::{Command, Flow};
pub use driver::{Driver, DriverHandle};
pub use engine::Engine;
pub use view::{HISTORY_LIMIT, PlaybackView, ViewState};
