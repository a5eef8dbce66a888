//! Authorization-flow state handling.
//!
//! The OAuth redirect round trip carries a short-lived, tamper-evident
//! state token; this module owns its shape and codec.

mod auth_flow_model;
mod state_token;

pub use auth_flow_model::AuthFlowState;
pub use state_token::{StateTokenCodec, STATE_TOKEN_WINDOW_SECS};
