//! Envelope submission - redundant channels, first-success-wins
//!
//! Public submission endpoints are rate-limited and individually flaky.
//! The router dispatches the same single-use envelope across every
//! configured channel at once and takes the first acceptance; duplicate
//! acceptance is harmless because the envelope is bound to one sequence
//! number.

pub mod channel;
pub mod router;

pub use channel::{DirectChannel, ProxyChannel, SubmissionChannel};
pub use router::{ChannelFailure, SubmissionOutcome, SubmissionRouter};
