//! GitHub upstream data access.
//!
//! This module wraps Octocrab to validate caller tokens, read account
//! profiles, search an author's closed-unmerged pull requests, and scan
//! reviewer comments for keywords. Errors are mapped into [`GitHubError`] so
//! callers never see Octocrab internals.

pub mod error;
pub mod gateway;
pub mod models;
pub mod token;

pub use error::GitHubError;
pub use gateway::{
    ActivityGateway, GatewayFactory, OctocrabActivityGateway, OctocrabGatewayFactory,
};
pub use models::{ClosedPullRequest, GitHubUser};
pub use token::PersonalAccessToken;

#[cfg(test)]
pub use gateway::{MockActivityGateway, MockGatewayFactory};
