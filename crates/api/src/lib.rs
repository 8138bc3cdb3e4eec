//! HTTP API layer for the survey services.
//!
//! Two routers share this crate:
//!
//! - **Participants**: session start/resume, draft save, submission
//! - **Survey management**: surveys, questions, options, answers, drafts,
//!   media, results and conductors
//!
//! Built on Axum 0.8. Callers are identified by an HS256 bearer token.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::{management_router, participants_router};
pub use middleware::{Identity, ManagementState, ParticipantsState, TokenVerifier};
