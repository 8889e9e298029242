//! The simulated translation job at runtime.
//!
//! ## Components
//!
//! - `JobState`: shared, lock-protected view of the job; read by everyone
//! - `StatusTimer`: the only writer, settles the job once its duration elapsed
//! - `RetryPolicy`: attempt budget and backoff shared by delivery and polling

pub mod retry;
pub mod state;
pub mod timer;

pub use retry::RetryPolicy;
pub use state::JobState;
pub use timer::StatusTimer;
