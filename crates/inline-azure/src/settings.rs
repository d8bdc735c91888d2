//! 実行時設定（環境変数から解決）
//!
//! | 環境変数 | 既定値 |
//! |----------|--------|
//! | `INLINE_AZURE_WORK_DIR` | `<data_local_dir>/inline-azure/inline_azure_project` |
//! | `INLINE_AZURE_PULUMI` | `pulumi` |

use crate::program::PROJECT_NAME;
use inline_azure_automation::LocalWorkspaceOptions;
use std::path::PathBuf;

pub const WORK_DIR_ENV: &str = "INLINE_AZURE_WORK_DIR";
pub const PULUMI_ENV: &str = "INLINE_AZURE_PULUMI";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Pulumi.yaml を書き出す作業ディレクトリ
    pub work_dir: PathBuf,

    /// 実行する pulumi バイナリ
    pub pulumi_command: PathBuf,
}

impl Settings {
    pub fn from_env() -> Self {
        let work_dir = env_path(WORK_DIR_ENV).unwrap_or_else(default_work_dir);
        let pulumi_command = env_path(PULUMI_ENV).unwrap_or_else(|| PathBuf::from("pulumi"));

        Self {
            work_dir,
            pulumi_command,
        }
    }

    pub fn workspace_options(&self) -> LocalWorkspaceOptions {
        LocalWorkspaceOptions::new(&self.work_dir).with_pulumi_command(&self.pulumi_command)
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// データディレクトリが取れない環境では一時ディレクトリを使う
fn default_work_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("inline-azure")
        .join(PROJECT_NAME)
}
