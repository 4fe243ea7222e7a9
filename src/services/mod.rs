pub mod memory_store;
pub mod mode_registry;
pub mod personalizer;
pub mod router;
pub mod task_store;

pub use memory_store::MemoryStore;
pub use mode_registry::{ModeAnalytics, ModeRegistry, FALLBACK_MODE};
pub use personalizer::personalize;
pub use router::IntentRouter;
pub use task_store::{ReminderCallback, TaskStore};
