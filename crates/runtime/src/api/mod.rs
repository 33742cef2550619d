//! Public client API surface.
//!
//! [`SessionClient`] is the per-client context (store connection,
//! configuration, local profile). Creating or joining a session yields a
//! [`SessionHandle`] through which every session operation is issued.

pub mod client;
pub mod errors;
pub mod handle;

pub use client::SessionClient;
pub use errors::{ClientError, Result};
pub use handle::{SessionHandle, SessionUpdates};
