pub mod context;
pub mod error;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use context::{ChatMessage, Context, Role};
pub use error::{Result, SessionError};
pub use session::{Phase, Session};
pub use storage::{InMemorySessionStorage, SessionStorage};
