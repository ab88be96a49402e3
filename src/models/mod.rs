pub mod list;
pub mod task;
pub mod user;

pub use list::List;
pub use task::{NewTask, Task, TaskStatus};
pub use user::User;
