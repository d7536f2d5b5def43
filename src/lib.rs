//! Casebook - session-scoped generation cache for CO-STAR prompt puzzles
//!
//! This crate backs a game that teaches the CO-STAR prompt framework
//! (Context, Objective, Style, Tone, Audience, Response). It asks an LLM for
//! puzzle artifacts (detective cases, audit cases, multiple-choice fixes,
//! mentor feedback, verdicts) and keeps the expensive ones in a per-session
//! cache with TTL expiry, burst collapsing and periodic eviction.
//!
//! The [`CaseGateway`] trait is the game-facing API; [`Casebook`] implements
//! it on top of any [`TextGenerator`](providers::TextGenerator).
//!
//! # Example
//!
//! ```rust,no_run
//! use casebook::{CaseGateway, CaseRequestOptions, Casebook};
//!
//! #[tokio::main]
//! async fn main() -> casebook::Result<()> {
//!     let casebook = Casebook::builder()
//!         .gemini("your-gemini-key")
//!         .build()?;
//!
//!     let case = casebook
//!         .generate_case(Some("session-1"), CaseRequestOptions::default())
//!         .await?;
//!     println!("Case #{}: {}", case.id, case.title);
//!
//!     // Served from cache: no second model call.
//!     let again = casebook
//!         .generate_case(Some("session-1"), CaseRequestOptions::default())
//!         .await?;
//!     assert_eq!(case, again);
//!
//!     let options = casebook
//!         .generate_rectification_options(&case, Some("session-1"))
//!         .await?;
//!     for option in &options {
//!         println!("{}: {}", option.id, option.prompt_text);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Mock mode
//!
//! `Casebook::builder().mock(true)` builds artifacts locally. Caching
//! behaves exactly as in live mode, which makes it useful for UI work and
//! tests.

pub mod cache;
pub mod convert;
pub mod error;
pub mod gateway;
pub mod mock;
pub mod prompts;
pub mod providers;
#[cfg(feature = "server")]
pub mod server;
pub mod telemetry;
pub mod traits;
pub mod types;

// Re-export main types at crate root
pub use error::{CasebookError, Result};
pub use gateway::{Casebook, CasebookBuilder};
pub use traits::{CaseGateway, CaseRequestOptions};

// Re-export all types
pub use types::{
    AuditBug, AuditCaseData, CaseData, CoStarElement, ElementFeedback, ElementScores,
    FeedbackStatus, KeyPoint, MentorFeedback, PlayerPrompt, RectificationOption, VerdictData,
};
