//! Domain model (Task, TaskTime, dates, errors).
//!
//! - task: Task / NewTask / TaskTime
//! - date: display date (`MM/DD/YY`) と canonical date (`YYYY-MM-DD`) の変換
//! - errors: DateError, TimeError, StoreError, PlannerError

pub mod date;
pub mod errors;
pub mod task;

pub use self::errors::{DateError, PlannerError, StoreError, TimeError};
pub use self::task::{NewTask, Task, TaskTime};
