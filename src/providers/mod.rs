//! External generator seam, the Gemini client, and retry handling.

pub mod gemini;
pub mod retry;
pub mod traits;

pub use gemini::GeminiClient;
pub use retry::{RetryConfig, with_retry};
pub use traits::TextGenerator;
