//! Common utilities and shared types for the survey services.
//!
//! This crate provides foundational components used across all survey crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Storage**: File storage backends for survey media
//! - **Verification cache**: TTL-bound storage for conductor verification codes
//!
//! # Example
//!
//! ```no_run
//! use survey_common::{AppResult, Config};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     println!("Participants service port: {}", config.server.participants_port);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod storage;
pub mod verification_cache;

pub use config::{AnswerEncodingPolicy, Config};
pub use error::{AppError, AppResult};
pub use storage::{LocalStorage, StorageBackend, UploadedFile, generate_media_key};
pub use verification_cache::{InMemoryCodeStore, RedisCodeStore, VerificationCodeStore};
