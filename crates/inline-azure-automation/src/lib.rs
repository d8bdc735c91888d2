//! inline-azure automation layer
//!
//! This crate provides the automation workspace abstraction used by the
//! `inline-azure` CLI: an inline program model, the stack lifecycle interface,
//! and a Pulumi CLI backed implementation of it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 inline-azure CLI                 │
//! │              (inline-azure [destroy])            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │             inline-azure-automation              │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │         Workspace / Stack traits          │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │InlineProgram │  │ UpdateSummary│            │
//! │  └──────────────┘  └──────────────┘            │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼───────┐
//! │ LocalWorkspace│ ── pulumi CLI
//! └───────────────┘
//! ```
//!
//! # Requirements
//!
//! - `pulumi` CLI must be installed and logged in to a backend
//! - Azure credentials are read by the provider plugin from the environment

pub mod error;
pub mod local;
pub mod program;
pub mod sink;
pub mod stack;
pub mod summary;

// Re-exports
pub use error::{AutomationError, Result};
pub use local::{LocalStack, LocalWorkspace, LocalWorkspaceOptions};
pub use program::{InlineProgram, InlineProgramArgs, OutputRef, ResourceDeclaration};
pub use sink::{CollectingSink, OutputSink};
pub use stack::{ConfigValue, Stack, Workspace};
pub use summary::{
    DestroyResult, OutputMap, OutputValue, RefreshResult, UpResult, UpdateKind, UpdateState,
    UpdateSummary,
};
