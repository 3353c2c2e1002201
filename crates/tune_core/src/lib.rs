//! # tune_core - NMR Probe Tuning/Matching Simulator
//!
//! Training engine for tuning and matching an NMR probe. A trainee turns two
//! knobs (tuning, matching) in small or large clicks and watches a simulated
//! reflection readout respond.
//!
//! ## Features
//! - Deterministic: same seed and command sequence = same frames
//! - Reflection field normalized once per session epoch
//! - Running best-reflection record
//! - JSON API for front ends that are not written in Rust
//!
//! ```rust
//! use tune_core::{ControlCommand, EngineConfig, TuningEngine};
//!
//! let mut engine = TuningEngine::with_origin(EngineConfig::coarse(), 7, (0.0, 0.0)).unwrap();
//! assert!(engine.current_frame().center_reflection.abs() < 1e-9);
//!
//! let frame = engine.apply(ControlCommand::TuneUp);
//! assert!(frame.center_reflection > 0.0);
//! assert!(frame.best_reflection <= frame.center_reflection);
//! ```

// Doc formatting lints - purely cosmetic
#![allow(clippy::doc_lazy_continuation)]
// Negated float comparisons are deliberate: they also reject NaN
#![allow(clippy::neg_cmp_op_on_partial_ord)]

pub mod api;
pub mod engine;
pub mod error;

pub use api::{session_request_schema_json, simulate_session_json, SessionRequest, SessionResponse};
pub use engine::{
    ControlCommand, EngineConfig, Frame, PlanePos, ReflectionGrid, SessionRegistry, TuningEngine,
};
pub use error::{Result, TuningError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;
