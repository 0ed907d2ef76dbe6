//! Integration tests for buildcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Temp workspace with a config pointing the cache at its own directories
    struct Workspace {
        temp: TempDir,
    }

    impl Workspace {
        fn new() -> Self {
            let ws = Self {
                temp: TempDir::new().unwrap(),
            };
            ws.write_config("local");
            ws
        }

        /// Rewrite the config with a different local directory, sharing the bucket
        fn write_config(&self, local: &str) {
            let config = format!(
                "[local]\ndir = {:?}\n\n[durable]\nbackend = \"filesystem\"\npath = {:?}\n",
                self.path().join(local),
                self.path().join("bucket"),
            );
            std::fs::write(self.config_path(), config).unwrap();
        }

        fn path(&self) -> &Path {
            self.temp.path()
        }

        fn config_path(&self) -> PathBuf {
            self.path().join("config.toml")
        }

        fn cmd(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("buildcache");
            cmd.arg("--config").arg(self.config_path());
            cmd
        }
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("buildcache")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Two-tier build artifact cache"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("buildcache")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("buildcache"));
    }

    #[test]
    fn manifest_miss_fails() {
        let ws = Workspace::new();
        ws.cmd()
            .args(["manifest", "get", "abc"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No cached manifest for abc"));
    }

    #[test]
    fn manifest_put_then_get() {
        let ws = Workspace::new();
        let file = ws.path().join("manifest.json");
        std::fs::write(&file, r#"{"x":1}"#).unwrap();

        ws.cmd()
            .args(["manifest", "put", "abc", "--file"])
            .arg(&file)
            .assert()
            .success()
            .stdout(predicate::str::contains("Stored manifest abc"));

        ws.cmd()
            .args(["manifest", "get", "abc"])
            .assert()
            .success()
            .stdout(r#"{"x":1}"#);

        // Write-back drained before exit, so both tiers hold it
        assert!(ws.path().join("local").join("abc").is_file());
        assert!(ws.path().join("bucket").join("manifests").join("abc").is_file());
    }

    #[test]
    fn manifest_put_from_stdin() {
        let ws = Workspace::new();

        ws.cmd()
            .args(["manifest", "put", "piped"])
            .write_stdin(r#"{"layers":[]}"#)
            .assert()
            .success();

        ws.cmd()
            .args(["manifest", "get", "piped"])
            .assert()
            .success()
            .stdout(r#"{"layers":[]}"#);
    }

    #[test]
    fn manifest_served_from_durable_after_local_loss() {
        let ws = Workspace::new();

        ws.cmd()
            .args(["manifest", "put", "abc"])
            .write_stdin("{}")
            .assert()
            .success();

        // A fresh process with an empty local tier
        ws.write_config("fresh");
        ws.cmd()
            .args(["manifest", "get", "abc"])
            .assert()
            .success()
            .stdout("{}");

        assert!(ws.path().join("fresh").join("abc").is_file());
    }

    #[test]
    fn layer_put_then_get() {
        let ws = Workspace::new();

        ws.cmd()
            .args(["layer", "put", "L1", "--digest", "deadbeef", "--size", "42"])
            .assert()
            .success();

        // Layer entries live in memory locally; a new process reads the durable copy
        ws.cmd()
            .args(["layer", "get", "L1"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""digest": "deadbeef""#))
            .stdout(predicate::str::contains(r#""size": 42"#));
    }

    #[test]
    fn layer_miss_fails() {
        let ws = Workspace::new();
        ws.cmd()
            .args(["layer", "get", "missing"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No cached layer for missing"));
    }

    #[test]
    fn invalid_key_rejected() {
        let ws = Workspace::new();
        ws.cmd()
            .args(["manifest", "put", "../escape"])
            .write_stdin("{}")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid cache key"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn unwritable_local_dir_fails() {
        let ws = Workspace::new();
        std::fs::write(ws.path().join("blocked"), "x").unwrap();
        ws.write_config("blocked");

        ws.cmd()
            .args(["manifest", "get", "abc"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to create local cache directory"));
    }

    #[test]
    fn config_path() {
        let ws = Workspace::new();
        ws.cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let ws = Workspace::new();
        ws.cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[writeback]"))
            .stdout(predicate::str::contains("filesystem"));
    }

    #[test]
    fn config_init_respects_existing_file() {
        let ws = Workspace::new();
        ws.cmd()
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));

        ws.cmd().args(["config", "init", "--force"]).assert().success();
        let written = std::fs::read_to_string(ws.config_path()).unwrap();
        assert!(written.contains("[general]"));
    }

    #[test]
    fn invalid_config_reports_hint() {
        let ws = Workspace::new();
        std::fs::write(ws.config_path(), "[durable]\nbackend = 7\n").unwrap();

        ws.cmd()
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }
}
