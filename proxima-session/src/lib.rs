//! proxima-session: wires camera, depth inference and haptics together
//!
//! A [`ProximitySession`] owns the two long-running loops (camera feed and
//! inference scheduler), turns every depth map into a published
//! [`ProximityState`] and drives the haptic device from the danger level.

pub mod error;
pub mod session;
pub mod state;

pub use error::SessionError;
pub use session::ProximitySession;
pub use state::{ProximityState, SessionStatus, StatePublisher};
