//! pulumi CLI backed workspace
//!
//! Wraps the pulumi CLI commands for the stack lifecycle. The inline program is
//! written to `Pulumi.yaml` inside the work directory and every command runs
//! there.

use crate::error::{AutomationError, Result};
use crate::program::InlineProgramArgs;
use crate::sink::OutputSink;
use crate::stack::{ConfigValue, Stack, Workspace};
use crate::summary::{
    DestroyResult, OutputMap, OutputValue, RefreshResult, SECRET_PLACEHOLDER, UpResult,
    UpdateSummary,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

const PROJECT_FILE: &str = "Pulumi.yaml";

/// Options for a [`LocalWorkspace`]
#[derive(Debug, Clone)]
pub struct LocalWorkspaceOptions {
    /// Directory holding the project file
    pub work_dir: PathBuf,

    /// pulumi binary (name on PATH or absolute path)
    pub pulumi_command: PathBuf,

    /// Extra environment passed to every pulumi invocation
    pub env: HashMap<String, String>,
}

impl LocalWorkspaceOptions {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            pulumi_command: PathBuf::from("pulumi"),
            env: HashMap::new(),
        }
    }

    pub fn with_pulumi_command(mut self, command: impl Into<PathBuf>) -> Self {
        self.pulumi_command = command.into();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

/// Captured output of a finished pulumi command
#[derive(Debug, Clone, Default)]
struct CommandOutput {
    stdout: String,
    stderr: String,
}

/// pulumi CLI wrapper
#[derive(Debug, Clone)]
pub struct LocalWorkspace {
    options: LocalWorkspaceOptions,
}

impl LocalWorkspace {
    pub fn new(options: LocalWorkspaceOptions) -> Self {
        Self { options }
    }

    pub fn work_dir(&self) -> &Path {
        &self.options.work_dir
    }

    /// Check that pulumi is installed and return its version
    pub async fn check_installed(&self) -> Result<String> {
        let output = self.run_command(&["version"]).await?;
        Ok(output.stdout.trim().to_string())
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.options.pulumi_command);
        cmd.args(args);
        cmd.arg("--non-interactive");
        cmd.current_dir(&self.options.work_dir);
        cmd.env("PULUMI_SKIP_UPDATE_CHECK", "true");
        cmd.envs(&self.options.env);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        tracing::debug!(
            "Running: {} {}",
            self.options.pulumi_command.display(),
            args.join(" ")
        );

        cmd
    }

    /// Run a pulumi command and return its captured output
    async fn run_command(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = self.command(args).output().await.map_err(spawn_error)?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            return Err(command_failed(args, output.status.code(), stderr));
        }

        Ok(CommandOutput { stdout, stderr })
    }

    /// Run a pulumi command, forwarding each stdout line to `sink` as it arrives
    async fn run_streaming(&self, args: &[&str], sink: &dyn OutputSink) -> Result<CommandOutput> {
        let mut child = self.command(args).spawn().map_err(spawn_error)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("pulumi stdout was not captured"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("pulumi stderr was not captured"))?;

        let read_stdout = async {
            let mut captured = String::new();
            let mut lines = BufReader::new(stdout).lines();
            while let Some(line) = lines.next_line().await? {
                sink.on_line(&line);
                captured.push_str(&line);
                captured.push('\n');
            }
            Ok::<_, std::io::Error>(captured)
        };
        let read_stderr = async {
            let mut captured = String::new();
            stderr.read_to_string(&mut captured).await?;
            Ok::<_, std::io::Error>(captured)
        };

        let (stdout, stderr) = tokio::join!(read_stdout, read_stderr);
        let (stdout, stderr) = (stdout?, stderr?);
        let status = child.wait().await?;

        if !status.success() {
            return Err(command_failed(args, status.code(), stderr));
        }

        Ok(CommandOutput { stdout, stderr })
    }

    /// Latest entry of the stack history
    async fn latest_summary(&self, stack: &str) -> Result<UpdateSummary> {
        let output = self
            .run_command(&[
                "stack",
                "history",
                "--json",
                "--show-secrets",
                "--page-size",
                "1",
                "--stack",
                stack,
            ])
            .await?;

        let mut history: Vec<UpdateSummary> = serde_json::from_str(output.stdout.trim())?;
        if history.is_empty() {
            return Err(AutomationError::HistoryUnavailable(stack.to_string()));
        }
        Ok(history.remove(0))
    }

    /// Current stack outputs; secrets are detected by comparing the masked
    /// and unmasked listings
    async fn outputs(&self, stack: &str) -> Result<OutputMap> {
        let masked = self
            .run_command(&["stack", "output", "--json", "--stack", stack])
            .await?;
        let plain = self
            .run_command(&[
                "stack",
                "output",
                "--json",
                "--show-secrets",
                "--stack",
                stack,
            ])
            .await?;

        parse_outputs(&masked.stdout, &plain.stdout)
    }
}

fn parse_outputs(masked: &str, plain: &str) -> Result<OutputMap> {
    if plain.trim().is_empty() {
        return Ok(OutputMap::new());
    }

    let masked: HashMap<String, serde_json::Value> = if masked.trim().is_empty() {
        HashMap::new()
    } else {
        serde_json::from_str(masked)?
    };
    let plain: HashMap<String, serde_json::Value> = serde_json::from_str(plain)?;

    Ok(plain
        .into_iter()
        .map(|(name, value)| {
            let secret = masked
                .get(&name)
                .and_then(|v| v.as_str())
                .is_some_and(|v| v == SECRET_PLACEHOLDER);
            (name, OutputValue { value, secret })
        })
        .collect())
}

fn spawn_error(err: std::io::Error) -> AutomationError {
    if err.kind() == ErrorKind::NotFound {
        AutomationError::PulumiNotFound
    } else {
        AutomationError::Io(err)
    }
}

fn command_failed(args: &[&str], code: Option<i32>, stderr: String) -> AutomationError {
    AutomationError::CommandFailed {
        command: args.iter().take(2).copied().collect::<Vec<_>>().join(" "),
        code,
        stderr: stderr.trim().to_string(),
    }
}

#[async_trait]
impl Workspace for LocalWorkspace {
    type Stack = LocalStack;

    async fn create_or_select_stack(&self, args: &InlineProgramArgs) -> Result<Self::Stack> {
        let project = args.program.to_project_yaml(&args.project_name)?;

        tokio::fs::create_dir_all(&self.options.work_dir).await?;
        tokio::fs::write(self.options.work_dir.join(PROJECT_FILE), project).await?;

        self.run_command(&["stack", "select", "--create", "--stack", &args.stack_name])
            .await?;

        tracing::info!(
            project = %args.project_name,
            stack = %args.stack_name,
            "Stack selected"
        );

        Ok(LocalStack {
            name: args.stack_name.clone(),
            workspace: self.clone(),
        })
    }
}

/// A stack selected in a [`LocalWorkspace`]
#[derive(Debug, Clone)]
pub struct LocalStack {
    name: String,
    workspace: LocalWorkspace,
}

#[async_trait]
impl Stack for LocalStack {
    fn name(&self) -> &str {
        &self.name
    }

    async fn install_plugin(&self, name: &str, version: &str) -> Result<()> {
        self.workspace
            .run_command(&["plugin", "install", "resource", name, version])
            .await?;
        Ok(())
    }

    async fn set_config(&self, key: &str, value: &ConfigValue) -> Result<()> {
        let secret_flag = if value.secret {
            "--secret"
        } else {
            "--plaintext"
        };
        self.workspace
            .run_command(&[
                "config",
                "set",
                "--stack",
                &self.name,
                key,
                &value.value,
                secret_flag,
            ])
            .await?;
        Ok(())
    }

    async fn refresh(&self, sink: &dyn OutputSink) -> Result<RefreshResult> {
        let output = self
            .workspace
            .run_streaming(
                &["refresh", "--yes", "--skip-preview", "--stack", &self.name],
                sink,
            )
            .await?;
        let summary = self.workspace.latest_summary(&self.name).await?;

        Ok(RefreshResult {
            stdout: output.stdout,
            stderr: output.stderr,
            summary,
        })
    }

    async fn destroy(&self, sink: &dyn OutputSink) -> Result<DestroyResult> {
        let output = self
            .workspace
            .run_streaming(
                &["destroy", "--yes", "--skip-preview", "--stack", &self.name],
                sink,
            )
            .await?;
        let summary = self.workspace.latest_summary(&self.name).await?;

        Ok(DestroyResult {
            stdout: output.stdout,
            stderr: output.stderr,
            summary,
        })
    }

    async fn up(&self, sink: &dyn OutputSink) -> Result<UpResult> {
        let output = self
            .workspace
            .run_streaming(
                &["up", "--yes", "--skip-preview", "--stack", &self.name],
                sink,
            )
            .await?;
        let outputs = self.workspace.outputs(&self.name).await?;
        let summary = self.workspace.latest_summary(&self.name).await?;

        Ok(UpResult {
            stdout: output.stdout,
            stderr: output.stderr,
            summary,
            outputs,
        })
    }
}
