//! Prizebot - chat-triggered prize dispensing
//!
//! Users post a trigger phrase into a chat conversation. Prizebot checks the
//! sender's public profile against the trigger's requirement and, if it is
//! met, pays the prize through the chat gateway and records the claim so the
//! same prize is never paid twice.
//!
//! ## Components
//!
//! - **Triggers**: phrase normalization, matching and requirement table
//! - **Store**: durable duplicate-claim records (sled)
//! - **Verifier**: profile and proof lookups against the HTTP provider
//! - **Engine**: run-state gate, claim locking, eligibility, payment
//! - **Responses**: randomized reply and reaction pools
//! - **Gateway**: NATS-backed chat transport
//! - **Dispatch**: inbound message loop with concurrent handlers

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod responses;
pub mod run_state;
pub mod store;
pub mod triggers;
pub mod types;
pub mod verifier;

pub use config::Args;
pub use dispatch::Dispatcher;
pub use engine::{EngineConfig, Outcome, TriggerEngine};
pub use error::{ErrorClass, GatewayError, HandlerError, RejectionKind, StoreError, VerifyError};
pub use types::{ContentKind, IncomingMessage, ProfileSnapshot};
