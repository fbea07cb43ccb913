//! # splitkit-client
//!
//! Visitor session, variant dispatch, and assignment notification.
//!
//! - **Session**: [`Session`] resolves the visitor once at
//!   [`Session::initialize`] and serves `vary` / `ab` from then on
//! - **Dispatch**: [`VaryOptions`], [`AbOptions`] and closure [`Handlers`]
//! - **Identity**: [`Session::log_in`] / [`Session::sign_up`] link an
//!   identifier and merge server assignments
//! - **Notification**: new assignments are reported to the service and the
//!   analytics provider in the background; [`Session::flush`] awaits them
//! - **Diagnostics**: [`LoadInfo`] snapshots and operator overrides
//! - **Collaborators**: [`Transport`], [`VisitorStorage`], [`Analytics`] and
//!   [`ErrorLogger`] traits with default [`providers`]

#![deny(unsafe_code)]

pub mod diagnostics;
pub mod dispatch;
pub mod errors;
mod identity;
pub mod notification;
pub mod providers;
pub mod session;
pub mod traits;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use diagnostics::{Diagnostics, LoadInfo};
pub use dispatch::{AbOptions, Handlers, VaryOptions, VaryOutcome};
pub use errors::{AnalyticsError, ClientError, Result, StorageError};
pub use notification::OVERRIDE_CONTEXT;
pub use session::{Collaborators, Session};
pub use traits::{Analytics, ErrorLogger, VisitorStorage};
pub use transport::{HttpTransport, Transport};
