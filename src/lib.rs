//! casebridge - turns tagged Kibana security cases into Gitea issues
//!
//! A polling bridge: cases bearing the search tag are turned into issues,
//! then re-tagged, moved to in-progress and commented with the issue URL.

pub mod config;
pub mod domain;
pub mod error;
pub mod gitea;
pub mod kibana;
pub mod logging;
pub mod reconcile;
pub mod severity;

pub use error::{BridgeError, Result};
