mod console;
mod program;
mod sequencer;
mod settings;

use clap::Parser;
use console::StdoutConsole;
use inline_azure_automation::LocalWorkspace;
use sequencer::Mode;
use settings::Settings;
use std::io::IsTerminal;

#[derive(Parser)]
#[command(name = "inline-azure")]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// `destroy` でスタックを削除、それ以外は更新
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout は進捗表示に使うので、ログは stderr に出力
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let mode = Mode::from_args(&cli.args);
    let settings = Settings::from_env();
    tracing::debug!(?mode, ?settings, "Resolved settings");

    let workspace = LocalWorkspace::new(settings.workspace_options());
    sequencer::run(&workspace, mode, &StdoutConsole).await
}
