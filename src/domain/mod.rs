pub mod enums;
pub mod timelog;
pub mod timestamp;

pub use enums::{SessionState, ToggleAction, UiMode};
pub use timelog::{plan_name, records_open, Plan, Record, Timelog};
pub use timestamp::{format_timestamp, split_date_time, time_sub, PLAN_ID_FMT, TIME_FMT};
