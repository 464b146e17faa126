//! Per-item pipeline stages.
//!
//! Each submodule implements one step the orchestrator drives for every
//! upload. The stages share no state, so each is tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! upload ──▶ stage ──▶ adapter ──▶ release ──▶ metrics
//! (bytes)    (tmp file) (engine)    (delete)    (size report)
//! ```
//!
//! 1. [`stage`]   write the upload to a suffixed temporary file
//! 2. [`adapter`] run the engine once and normalise its outcome
//! 3. [`stage::StagedFile::release`] delete the temporary file, best-effort
//! 4. [`metrics`] compare declared size against converted text size

pub mod adapter;
pub mod metrics;
pub mod stage;
