//! # revokescan
//!
//! Discover every address an owner has approved to spend a token, and revoke
//! those approvals.
//!
//! - [`ApprovalScanner`] scans historical `Approval` logs with a full-range
//!   query, falling back to fixed-size windows when the provider rejects it
//! - [`AllowanceProbe`] reads and classifies each spender's current allowance
//! - [`RowHandle`] tracks one spender's revocation state
//! - [`BatchRevoker`] revokes every outstanding spender, one transaction at a
//!   time
//! - [`ApprovalSession`] ties these together for one owner at a time
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use revokescan::{provider::{connect_http, AlloyChain}, ApprovalSession, RevokeConfig};
//!
//! let chain = Arc::new(AlloyChain::new(connect_http(&rpc_url, Some(signer))?));
//! let session = ApprovalSession::new(chain, RevokeConfig::default());
//! session.set_owner(Some(owner));
//! let scan = session.wait_for_scan().await;
//! session.wait_for_allowances().await;
//! let report = session.revoke_all().await?;
//! ```

mod allowance;
pub mod bootstrap;
mod config;
mod errors;
mod events;
mod generation;
pub mod provider;
mod revocation;
mod session;
mod spans;
mod types;

pub use allowance::*;
pub use config::{constants, RevokeConfig, RevokeConfigBuilder};
pub use errors::*;
pub use events::*;
pub use generation::*;
pub use provider::{AllowanceSource, ApprovalLogSource, ApprovalSubmitter, ChainClient};
pub use revocation::*;
pub use session::*;
pub use types::*;
