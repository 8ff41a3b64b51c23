pub mod driver;
pub mod durations;
pub mod machine;
pub mod notification;
pub mod preset;
pub mod session;

pub use driver::{SessionTimer, TimerSnapshot};
pub use durations::{Durations, LongBreak, SkipPolicy};
pub use machine::{Action, Clock, Outcome, TimerMachine};
pub use notification::{Notification, Severity};
pub use preset::{Preset, PresetCatalog, CUSTOM_PRESET_ID, DEFAULT_PRESET_ID};
pub use session::Session;
