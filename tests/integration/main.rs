//! Integration tests for jobpvc

mod lifecycle;

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn jobpvc(config: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("jobpvc");
        cmd.env_remove("JOBPVC_CONFIG")
            .env_remove("JOBPVC_LOG_FORMAT")
            .arg("--config")
            .arg(config);
        cmd
    }

    fn config_path(dir: &TempDir) -> std::path::PathBuf {
        dir.path().join("jobpvc").join("config.toml")
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("jobpvc")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("persistent volume claims"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("jobpvc")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("jobpvc"));
    }

    #[test]
    fn name_normalizes_job() {
        cargo_bin_cmd!("jobpvc")
            .args(["name", "Team/My Job_1"])
            .assert()
            .success()
            .stdout("pvc-team-my-job-1\n");
    }

    #[test]
    fn name_rejects_empty_job() {
        cargo_bin_cmd!("jobpvc")
            .args(["name", "  "])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Job name is empty"));
    }

    #[test]
    fn config_path_uses_flag() {
        let dir = TempDir::new().unwrap();
        let path = config_path(&dir);
        jobpvc(&path)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_defaults() {
        let dir = TempDir::new().unwrap();
        jobpvc(&config_path(&dir))
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[general]"));
    }

    #[test]
    fn config_init_writes_starter_cloud() {
        let dir = TempDir::new().unwrap();
        let path = config_path(&dir);

        jobpvc(&path).args(["config", "init"]).assert().success();
        assert!(path.exists());

        jobpvc(&path)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[[clouds]]"));
    }

    #[test]
    fn invalid_config_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[[clouds]]\nname = \"a\"\n[[clouds]]\nname = \"a\"\n").unwrap();

        jobpvc(&path)
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("duplicate cloud name"));
    }

    #[test]
    fn event_without_clouds_succeeds() {
        let dir = TempDir::new().unwrap();
        let event = dir.path().join("event.json");
        std::fs::write(
            &event,
            r#"{"event":"deleted","item":{"kind":"job","full_name":"proj/app"}}"#,
        )
        .unwrap();

        jobpvc(&config_path(&dir))
            .args(["event", "--format", "json", "--file"])
            .arg(&event)
            .assert()
            .success()
            .stdout(predicate::str::contains("\"outcomes\": []"));
    }

    #[test]
    fn event_reads_stdin() {
        let dir = TempDir::new().unwrap();
        jobpvc(&config_path(&dir))
            .args(["event", "--format", "plain"])
            .write_stdin(r#"{"event":"deleted","item":{"kind":"folder","full_name":"proj"}}"#)
            .assert()
            .success();
    }

    #[test]
    fn event_rejects_malformed_json() {
        let dir = TempDir::new().unwrap();
        jobpvc(&config_path(&dir))
            .arg("event")
            .write_stdin("{not json")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Invalid item event"));
    }

    #[test]
    fn event_rejects_rename_without_old_name() {
        let dir = TempDir::new().unwrap();
        jobpvc(&config_path(&dir))
            .arg("event")
            .write_stdin(
                r#"{"event":"renamed","item":{"kind":"job","full_name":"proj/app"},"old_name":""}"#,
            )
            .assert()
            .failure()
            .stderr(predicate::str::contains("empty old name"));
    }

    #[test]
    fn provision_without_clouds_fails() {
        let dir = TempDir::new().unwrap();
        jobpvc(&config_path(&dir))
            .args(["provision", "--job", "proj/app"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("No clouds configured"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn provision_rejects_bad_access_mode_before_cloud_lookup() {
        let dir = TempDir::new().unwrap();
        jobpvc(&config_path(&dir))
            .args(["provision", "--job", "proj/app", "--access-mode", "WriteSometimes"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid access mode"));
    }

    #[test]
    fn provision_rejects_unresolved_size() {
        let dir = TempDir::new().unwrap();
        jobpvc(&config_path(&dir))
            .args(["provision", "--job", "proj/app", "--size", "${JOBPVC_TEST_UNSET_SIZE}"])
            .env_remove("JOBPVC_TEST_UNSET_SIZE")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unresolved placeholder"));
    }

    #[test]
    fn list_unknown_cloud_fails() {
        let dir = TempDir::new().unwrap();
        jobpvc(&config_path(&dir))
            .args(["list", "--cloud", "nowhere"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Cloud not configured: nowhere"));
    }
}
