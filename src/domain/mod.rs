pub mod enums;
pub mod mode;
pub mod task;
pub mod views;

pub use enums::{DeliveryMode, FormField, Pane};
pub use mode::{NewTaskForm, SearchBox, UiMode};
pub use task::{Task, TaskList};
pub use views::{clamp_index, filter_done, filter_open, format_elapsed};
