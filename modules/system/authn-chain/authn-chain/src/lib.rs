//! Authentication Chain Module
//!
//! Evaluates an ordered list of authenticators under PAM-style controls
//! (`REQUIRED`, `REQUISITE`, `SUFFICIENT`, `OPTIONAL`) and produces one
//! [`AuthenticationResult`](authn_chain_sdk::AuthenticationResult) per request.
//!
//! The chain is held as an immutable snapshot behind an atomically swappable
//! handle, so reconfiguration never disturbs in-flight evaluations.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;

pub use config::AuthnChainConfig;
pub use domain::{AuthnChain, ChainEntry, ChainSnapshot};
