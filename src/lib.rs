pub mod config;
pub mod console;
pub mod format;
pub mod guide;
pub mod history;
pub mod ids;
pub mod record;
pub mod session;
pub mod storage;

pub use config::Config;
pub use format::{format_list_duration, format_record_date, format_timer};
pub use ids::{IdGenerator, UuidGenerator};
pub use record::DfmRecord;
pub use session::{SaveOutcome, SessionConfig, SessionSnapshot, SessionTimer, TimerState};
pub use storage::{FileStore, KeyValueStore, MemoryStore, RecordStore, StoredCollection};
