//! Sweep engine - per-wallet pipeline and the unattended outer loop
//!
//! Each wallet goes through Derive → Load → Decide → Build&Sign → Submit →
//! Report; a failed stage terminates that wallet's pass only. The outer
//! loop visits wallets in fixed order forever with a constant delay
//! between them.

pub mod orchestrator;
pub mod pipeline;
pub mod policy;
pub mod wallets;

pub use orchestrator::SweepOrchestrator;
pub use pipeline::{PassOutcome, PassReport, SweepPipeline};
pub use policy::{AmountDecision, SkipReason, SweepMode};
