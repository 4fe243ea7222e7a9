pub mod memory;
pub mod mode;
pub mod task;

pub use memory::{Exchange, KnowledgeFact, SessionSummary};
pub use mode::{default_modes, AgentMode, ModeSummary, ModeUpdate, UiTheme, VoiceSettings};
pub use task::{CategoryStat, Event, ProductivityStats, Reminder, Task, TaskSortKey, TaskStatus};
