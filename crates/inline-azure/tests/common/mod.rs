use std::fs;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use tempfile::TempDir;

/// pulumi の代わりに呼び出しを記録するスクリプト
#[allow(dead_code)]
const FAKE_PULUMI: &str = r#"#!/bin/sh
echo "$*" >> "$FAKE_PULUMI_LOG"
if [ -n "$FAKE_PULUMI_FAIL" ]; then
  case "$*" in
    *"$FAKE_PULUMI_FAIL"*) echo "error: simulated failure" >&2; exit 255 ;;
  esac
fi
case "$*" in
  "stack output"*) echo '{"resourcegroup_name":"resourceGroup1a2b3c"}' ;;
  "stack history"*) echo '[{"kind":"update","result":"succeeded","version":1,"resourceChanges":{"create":1}}]' ;;
  "up"*) echo "Updating (dev)"; echo "    + 1 created" ;;
  "refresh"*) echo "Refreshing (dev)" ;;
  "destroy"*) echo "Destroying (dev)"; echo "    - 1 deleted" ;;
esac
exit 0
"#;

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn work_dir(&self) -> PathBuf {
        self.root.path().join("project")
    }

    pub fn log_path(&self) -> PathBuf {
        self.root.path().join("calls.log")
    }

    #[cfg(unix)]
    #[allow(dead_code)]
    pub fn install_fake_pulumi(&self) -> PathBuf {
        let script = self.root.path().join("pulumi");
        fs::write(&script, FAKE_PULUMI).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[allow(dead_code)]
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.log_path())
            .unwrap_or_default()
            .lines()
            .map(|l| l.to_string())
            .collect()
    }
}
