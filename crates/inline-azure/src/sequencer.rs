//! Stack lifecycle: select → plugins → config → refresh → up | destroy

use crate::console::Console;
use crate::program::{
    LOCATION, LOCATION_KEY, PLUGIN_NAME, PLUGIN_VERSION, PROJECT_NAME, RESOURCE_GROUP_OUTPUT,
    STACK_NAME, resource_group_program,
};
use anyhow::Context;
use inline_azure_automation::{
    AutomationError, ConfigValue, InlineProgramArgs, Stack, UpResult, Workspace,
};

/// Which workflow runs after the refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Update,
    Destroy,
}

impl Mode {
    /// `destroy` as the first argument selects [`Mode::Destroy`]
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Self {
        match args.first() {
            Some(arg) if arg.as_ref() == "destroy" => Mode::Destroy,
            _ => Mode::Update,
        }
    }
}

pub async fn run<W, C>(workspace: &W, mode: Mode, console: &C) -> anyhow::Result<()>
where
    W: Workspace,
    C: Console,
{
    let args = InlineProgramArgs::new(PROJECT_NAME, STACK_NAME, resource_group_program());

    tracing::info!(project = PROJECT_NAME, stack = STACK_NAME, ?mode, "Initializing stack");
    let stack = workspace
        .create_or_select_stack(&args)
        .await
        .with_context(|| format!("failed to initialize stack '{}'", STACK_NAME))?;
    console.done("successfully initialized stack");

    // inline programs manage their own plugins
    console.step("installing plugins...");
    stack
        .install_plugin(PLUGIN_NAME, PLUGIN_VERSION)
        .await
        .with_context(|| format!("failed to install plugin {} {}", PLUGIN_NAME, PLUGIN_VERSION))?;
    console.done("plugins installed");

    console.step("setting up config...");
    stack
        .set_config(LOCATION_KEY, &ConfigValue::new(LOCATION))
        .await
        .with_context(|| format!("failed to set {}", LOCATION_KEY))?;
    console.done("config set");

    console.step("refreshing stack...");
    stack
        .refresh(console)
        .await
        .context("failed to refresh stack")?;
    console.done("refresh complete");

    match mode {
        Mode::Destroy => {
            console.step("destroying stack...");
            stack
                .destroy(console)
                .await
                .context("failed to destroy stack")?;
            console.done("stack destroy complete");
        }
        Mode::Update => {
            console.step("updating stack...");
            let result = stack.up(console).await.context("failed to update stack")?;
            tracing::info!(result = ?result.summary.result, "Update finished");
            print_update_result(&result, console)?;
        }
    }

    Ok(())
}

fn print_update_result<C: Console>(result: &UpResult, console: &C) -> anyhow::Result<()> {
    if let Some(changes) = &result.summary.resource_changes {
        console.heading("update summary:");
        for (action, count) in changes {
            console.line(&format!("    {}: {}", action, count));
        }
    }

    let name = result
        .outputs
        .get(RESOURCE_GROUP_OUTPUT)
        .ok_or_else(|| AutomationError::MissingOutput(RESOURCE_GROUP_OUTPUT.to_string()))?;
    console.line(&format!("resource group name: {}", name.display()));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use inline_azure_automation::{
        DestroyResult, OutputMap, OutputSink, OutputValue, RefreshResult, UpdateKind,
        UpdateState, UpdateSummary,
    };
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    /// Records sequencer and engine output in one stream
    #[derive(Default)]
    struct RecordingConsole {
        lines: Mutex<Vec<String>>,
    }

    impl RecordingConsole {
        fn push(&self, line: String) {
            self.lines.lock().unwrap().push(line);
        }

        fn lines(&self) -> Vec<String> {
            self.lines.lock().unwrap().clone()
        }

        fn count(&self, line: &str) -> usize {
            self.lines().iter().filter(|l| l.as_str() == line).count()
        }
    }

    impl OutputSink for RecordingConsole {
        fn on_line(&self, line: &str) {
            self.push(format!("engine| {}", line));
        }
    }

    impl Console for RecordingConsole {
        fn step(&self, message: &str) {
            self.push(message.to_string());
        }

        fn done(&self, message: &str) {
            self.push(message.to_string());
        }

        fn heading(&self, message: &str) {
            self.push(message.to_string());
        }

        fn line(&self, message: &str) {
            self.push(message.to_string());
        }
    }

    #[derive(Clone, Default)]
    struct FakeWorkspace {
        calls: Log,
        fail_at: Option<&'static str>,
        resource_changes: Option<BTreeMap<String, u64>>,
        outputs: OutputMap,
    }

    impl FakeWorkspace {
        fn new() -> Self {
            let mut outputs = OutputMap::new();
            outputs.insert(
                RESOURCE_GROUP_OUTPUT.to_string(),
                OutputValue {
                    value: serde_json::json!("resourceGroup1a2b3c"),
                    secret: false,
                },
            );
            Self {
                resource_changes: Some(BTreeMap::from([
                    ("create".to_string(), 1),
                    ("same".to_string(), 2),
                ])),
                outputs,
                ..Self::default()
            }
        }

        fn failing_at(mut self, step: &'static str) -> Self {
            self.fail_at = Some(step);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String, step: &str) -> inline_azure_automation::Result<()> {
            self.calls.lock().unwrap().push(call);
            if self.fail_at == Some(step) {
                return Err(AutomationError::CommandFailed {
                    command: step.to_string(),
                    code: Some(255),
                    stderr: "simulated failure".to_string(),
                });
            }
            Ok(())
        }

        fn summary(&self, kind: UpdateKind) -> UpdateSummary {
            UpdateSummary {
                kind,
                start_time: None,
                end_time: None,
                message: String::new(),
                result: UpdateState::Succeeded,
                version: 1,
                resource_changes: self.resource_changes.clone(),
                environment: Default::default(),
            }
        }
    }

    #[async_trait]
    impl Workspace for FakeWorkspace {
        type Stack = FakeWorkspace;

        async fn create_or_select_stack(
            &self,
            args: &InlineProgramArgs,
        ) -> inline_azure_automation::Result<Self::Stack> {
            args.program.validate()?;
            self.record(
                format!("select {}/{}", args.project_name, args.stack_name),
                "select",
            )?;
            Ok(self.clone())
        }
    }

    #[async_trait]
    impl Stack for FakeWorkspace {
        fn name(&self) -> &str {
            STACK_NAME
        }

        async fn install_plugin(
            &self,
            name: &str,
            version: &str,
        ) -> inline_azure_automation::Result<()> {
            self.record(format!("plugin {} {}", name, version), "plugin")
        }

        async fn set_config(
            &self,
            key: &str,
            value: &ConfigValue,
        ) -> inline_azure_automation::Result<()> {
            self.record(format!("config {}={}", key, value.value), "config")
        }

        async fn refresh(
            &self,
            sink: &dyn OutputSink,
        ) -> inline_azure_automation::Result<RefreshResult> {
            self.record("refresh".to_string(), "refresh")?;
            sink.on_line("Refreshing (dev)");
            Ok(RefreshResult {
                stdout: String::new(),
                stderr: String::new(),
                summary: self.summary(UpdateKind::Refresh),
            })
        }

        async fn destroy(
            &self,
            sink: &dyn OutputSink,
        ) -> inline_azure_automation::Result<DestroyResult> {
            self.record("destroy".to_string(), "destroy")?;
            sink.on_line("Destroying (dev)");
            Ok(DestroyResult {
                stdout: String::new(),
                stderr: String::new(),
                summary: self.summary(UpdateKind::Destroy),
            })
        }

        async fn up(&self, sink: &dyn OutputSink) -> inline_azure_automation::Result<UpResult> {
            self.record("up".to_string(), "up")?;
            sink.on_line("Updating (dev)");
            Ok(UpResult {
                stdout: String::new(),
                stderr: String::new(),
                summary: self.summary(UpdateKind::Update),
                outputs: self.outputs.clone(),
            })
        }
    }

    #[test]
    fn test_mode_from_args() {
        let empty: [&str; 0] = [];
        assert_eq!(Mode::from_args(&empty), Mode::Update);
        assert_eq!(Mode::from_args(&["destroy"]), Mode::Destroy);
        assert_eq!(Mode::from_args(&["destroy", "now"]), Mode::Destroy);
        assert_eq!(Mode::from_args(&["up"]), Mode::Update);
        assert_eq!(Mode::from_args(&["DESTROY"]), Mode::Update);
        assert_eq!(Mode::from_args(&["now", "destroy"]), Mode::Update);
        assert_eq!(Mode::from_args(&["--help"]), Mode::Update);
    }

    #[tokio::test]
    async fn test_update_workflow() {
        let workspace = FakeWorkspace::new();
        let console = RecordingConsole::default();

        run(&workspace, Mode::Update, &console).await.unwrap();

        assert_eq!(
            workspace.calls(),
            vec![
                "select inline_azure_project/dev",
                "plugin azure v5.25.0",
                "config azure:location=uksouth",
                "refresh",
                "up",
            ]
        );
        assert_eq!(
            console.lines(),
            vec![
                "successfully initialized stack",
                "installing plugins...",
                "plugins installed",
                "setting up config...",
                "config set",
                "refreshing stack...",
                "engine| Refreshing (dev)",
                "refresh complete",
                "updating stack...",
                "engine| Updating (dev)",
                "update summary:",
                "    create: 1",
                "    same: 2",
                "resource group name: resourceGroup1a2b3c",
            ]
        );
    }

    #[tokio::test]
    async fn test_update_prints_each_change_and_output_once() {
        let workspace = FakeWorkspace::new();
        let console = RecordingConsole::default();

        run(&workspace, Mode::Update, &console).await.unwrap();

        assert_eq!(console.count("    create: 1"), 1);
        assert_eq!(console.count("    same: 2"), 1);
        assert_eq!(console.count("resource group name: resourceGroup1a2b3c"), 1);
    }

    #[tokio::test]
    async fn test_destroy_workflow() {
        let workspace = FakeWorkspace::new();
        let console = RecordingConsole::default();

        run(&workspace, Mode::Destroy, &console).await.unwrap();

        assert_eq!(
            workspace.calls(),
            vec![
                "select inline_azure_project/dev",
                "plugin azure v5.25.0",
                "config azure:location=uksouth",
                "refresh",
                "destroy",
            ]
        );

        let lines = console.lines();
        assert_eq!(lines.last().map(String::as_str), Some("stack destroy complete"));
        assert!(!lines.iter().any(|l| l == "update summary:"));
        assert!(!lines.iter().any(|l| l.starts_with("resource group name")));
    }

    #[tokio::test]
    async fn test_empty_change_summary_still_prints_header() {
        let mut workspace = FakeWorkspace::new();
        workspace.resource_changes = Some(BTreeMap::new());
        let console = RecordingConsole::default();

        run(&workspace, Mode::Update, &console).await.unwrap();

        let lines = console.lines();
        let tail = &lines[lines.len() - 2..];
        assert_eq!(
            tail,
            ["update summary:", "resource group name: resourceGroup1a2b3c"]
        );
    }

    #[tokio::test]
    async fn test_missing_change_summary_skips_header() {
        let mut workspace = FakeWorkspace::new();
        workspace.resource_changes = None;
        let console = RecordingConsole::default();

        run(&workspace, Mode::Update, &console).await.unwrap();

        assert_eq!(console.count("update summary:"), 0);
        assert_eq!(
            console.lines().last().map(String::as_str),
            Some("resource group name: resourceGroup1a2b3c")
        );
    }

    #[tokio::test]
    async fn test_plugin_failure_aborts_before_config() {
        let workspace = FakeWorkspace::new().failing_at("plugin");
        let console = RecordingConsole::default();

        let err = run(&workspace, Mode::Update, &console).await.unwrap_err();
        assert!(err.to_string().contains("failed to install plugin azure v5.25.0"));

        assert_eq!(
            workspace.calls(),
            vec!["select inline_azure_project/dev", "plugin azure v5.25.0"]
        );
        assert_eq!(console.lines().last().map(String::as_str), Some("installing plugins..."));
    }

    #[tokio::test]
    async fn test_failures_before_branch_never_reach_it() {
        for step in ["select", "plugin", "config", "refresh"] {
            for mode in [Mode::Update, Mode::Destroy] {
                let workspace = FakeWorkspace::new().failing_at(step);
                let console = RecordingConsole::default();

                assert!(run(&workspace, mode, &console).await.is_err());

                let calls = workspace.calls();
                assert!(!calls.iter().any(|c| c == "up" || c == "destroy"), "{step}");
            }
        }
    }

    #[tokio::test]
    async fn test_config_set_before_refresh() {
        for mode in [Mode::Update, Mode::Destroy] {
            let workspace = FakeWorkspace::new();
            let console = RecordingConsole::default();
            run(&workspace, mode, &console).await.unwrap();

            let calls = workspace.calls();
            let position = |name: &str| calls.iter().position(|c| c.starts_with(name)).unwrap();
            assert!(position("config") < position("refresh"));
            let last = if mode == Mode::Update { "up" } else { "destroy" };
            assert!(position("refresh") < position(last));
        }
    }

    #[tokio::test]
    async fn test_missing_output_is_an_error() {
        let mut workspace = FakeWorkspace::new();
        workspace.outputs.clear();
        let console = RecordingConsole::default();

        let err = run(&workspace, Mode::Update, &console).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AutomationError>(),
            Some(AutomationError::MissingOutput(name)) if name == RESOURCE_GROUP_OUTPUT
        ));
    }
}
