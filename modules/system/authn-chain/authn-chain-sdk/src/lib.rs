//! Authentication chain SDK
//!
//! This crate provides the public API for the `authn_chain` module:
//!
//! - [`AuthnChainClient`] - Public API trait for consumers (the request guard)
//! - [`Authenticator`] - Capability trait implemented per credential type
//! - [`AuthenticatorControl`] - PAM-style directive attached to a chain step
//! - [`AuthenticationDataSource`] - Credentials extracted from a request
//! - [`AuthenticationResult`] - Outcome of one authenticator or of the whole chain
//! - [`UserManager`] - External account store used for failed-login bookkeeping
//!
//! ## Usage
//!
//! ```ignore
//! use authn_chain_sdk::{AuthenticationDataSource, AuthnChainClient};
//!
//! let source = AuthenticationDataSource::password("alice", "s3cret");
//! let result = chain.authenticate(&source).await;
//! if result.authenticated {
//!     // proceed with result.principal
//! }
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod authenticator;
pub mod control;
pub mod error;
pub mod models;
pub mod user_manager;

// Re-export main types at crate root
pub use api::AuthnChainClient;
pub use authenticator::Authenticator;
pub use control::{AuthenticatorControl, ControlKind};
pub use error::{AuthenticationError, UserManagerError};
pub use models::{
    AuthenticationDataSource, AuthenticationFailureCause, AuthenticationResult, DataSourceKind,
    FailureCode, User,
};
pub use user_manager::UserManager;
