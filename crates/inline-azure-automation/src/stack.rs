//! Workspace and stack lifecycle traits

use crate::error::Result;
use crate::program::InlineProgramArgs;
use crate::sink::OutputSink;
use crate::summary::{DestroyResult, RefreshResult, UpResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Automation workspace abstraction
///
/// A workspace owns the project files and engine state a stack needs.
/// [`crate::LocalWorkspace`] drives the pulumi CLI; tests substitute their own.
#[async_trait]
pub trait Workspace: Send + Sync {
    type Stack: Stack;

    /// Select the stack if it exists, otherwise create it
    async fn create_or_select_stack(&self, args: &InlineProgramArgs) -> Result<Self::Stack>;
}

/// Operations on a selected stack
#[async_trait]
pub trait Stack: Send + Sync {
    /// Returns the stack name (e.g., "dev")
    fn name(&self) -> &str;

    /// Install a resource provider plugin at a pinned version
    async fn install_plugin(&self, name: &str, version: &str) -> Result<()>;

    /// Set a stack configuration value
    async fn set_config(&self, key: &str, value: &ConfigValue) -> Result<()>;

    /// Reconcile recorded state with the deployed infrastructure
    async fn refresh(&self, sink: &dyn OutputSink) -> Result<RefreshResult>;

    /// Remove every resource tracked by the stack
    async fn destroy(&self, sink: &dyn OutputSink) -> Result<DestroyResult>;

    /// Apply the program
    async fn up(&self, sink: &dyn OutputSink) -> Result<UpResult>;
}

/// Stack configuration value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigValue {
    pub value: String,
    pub secret: bool,
}

impl ConfigValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            secret: false,
        }
    }

    pub fn secret(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            secret: true,
        }
    }
}
