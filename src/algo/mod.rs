pub mod alarm;
pub mod circular_average;
pub mod monitor;

pub use alarm::{AlarmEvaluator, LatchedAlarm, PendingAlarm, check_alarms};
pub use circular_average::CircularAverage;
pub use monitor::ChangeMonitor;
