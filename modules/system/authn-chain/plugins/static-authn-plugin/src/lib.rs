#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static Authentication Plugin
//!
//! This plugin provides a password authenticator backed by a user table read
//! from configuration, for development and testing.
//!
//! ## Modes
//!
//! - **`accept_all`** (default): Accepts any non-empty username/password pair and
//!   authenticates as the claimed username.
//!
//! - **`static_users`**: Checks credentials against the configured users. Failed
//!   logins are counted per account and lock it after `max_failed_attempts`.
//!   The table doubles as a [`UserManager`](authn_chain_sdk::UserManager) so the
//!   chain can reset those counters after a successful login.
//!
//! ## Configuration
//!
//! ```yaml
//! static_authn_plugin:
//!   id: "static"
//!   mode: static_users
//!   max_failed_attempts: 5
//!   users:
//!     - username: "admin"
//!       password: "admin123"
//!     - username: "deployer"
//!       password: "s3cret"
//!       password_change_required: true
//! ```

pub mod config;
pub mod domain;
pub mod module;

pub use domain::Service;
pub use module::StaticAuthnPlugin;
