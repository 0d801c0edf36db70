//! Settings storage for lesson progress.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileSettingsStore;
pub use memory::MemorySettingsStore;
pub use traits::{SettingsStore, CLUES_KEY, KNOWN_SPELLS_KEY, UNLOCKED_LESSONS_KEY};
