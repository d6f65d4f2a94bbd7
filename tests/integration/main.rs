//! Integration tests for devid

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Isolated workspace: a config path that does not exist yet and a
    /// place for host profiles
    struct Sandbox {
        dir: TempDir,
    }

    impl Sandbox {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        fn config_path(&self) -> PathBuf {
            self.dir.path().join("config.toml")
        }

        fn profile(&self, name: &str, content: &str) -> PathBuf {
            let path = self.dir.path().join(name);
            std::fs::write(&path, content).unwrap();
            path
        }

        fn write_config(&self, content: &str) {
            std::fs::write(self.config_path(), content).unwrap();
        }

        fn devid(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("devid");
            cmd.env_remove("DEVID_PROFILE")
                .env("DEVID_CONFIG", self.config_path());
            cmd
        }

        /// Keep cache generations inside the sandbox
        fn use_local_storage(&self) {
            let storage = self.dir.path().join("caches");
            self.write_config(&format!(
                "[cache]\nstorage_dir = {:?}\n",
                storage.display().to_string()
            ));
        }
    }

    #[test]
    fn help_displays() {
        Sandbox::new()
            .devid()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("device identifier"));
    }

    #[test]
    fn version_displays() {
        Sandbox::new()
            .devid()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("devid"));
    }

    #[test]
    fn apis_lists_capabilities() {
        let sandbox = Sandbox::new();
        let profile = sandbox.profile("empty.toml", "");

        sandbox
            .devid()
            .args(["apis", "--profile"])
            .arg(&profile)
            .assert()
            .success()
            .stdout(predicate::str::contains("Android ID: not supported"))
            .stdout(predicate::str::contains("0 of 13 APIs available"));
    }

    #[test]
    fn resolve_empty_profile_falls_back() {
        let sandbox = Sandbox::new();
        let profile = sandbox.profile("empty.toml", "");

        sandbox
            .devid()
            .args(["resolve", "--json", "--profile"])
            .arg(&profile)
            .assert()
            .success()
            .stdout(predicate::str::contains("\"source\": \"fallback_generated\""))
            .stdout(predicate::str::contains("\"deviceId\": \"fallback-"));
    }

    #[test]
    fn resolve_android_profile() {
        let sandbox = Sandbox::new();
        let profile = sandbox.profile(
            "android.toml",
            "[android]\nandroid_id = \"9774d56d682e549c\"\n",
        );

        sandbox
            .devid()
            .args(["resolve", "--json", "--profile"])
            .arg(&profile)
            .assert()
            .success()
            .stdout(predicate::str::contains("\"source\": \"native_android\""))
            .stdout(predicate::str::contains("9774d56d682e549c"));
    }

    #[test]
    fn resolve_hardware_profile() {
        let sandbox = Sandbox::new();
        let profile = sandbox.profile(
            "hardware.toml",
            "[hardware]\nlogical_cores = 4\nnetwork_type = \"wifi\"\n",
        );

        sandbox
            .devid()
            .args(["resolve", "--json", "--profile"])
            .arg(&profile)
            .assert()
            .success()
            .stdout(predicate::str::contains("cores-4_network-wifi"));
    }

    #[test]
    fn resolve_profile_from_env() {
        let sandbox = Sandbox::new();
        let profile = sandbox.profile("hints.toml", "[client_hints]\nmodel = \"Pixel 7\"\n");

        sandbox
            .devid()
            .env("DEVID_PROFILE", &profile)
            .args(["resolve", "--json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"source\": \"client_hints\""));
    }

    #[test]
    fn invalid_profile_reports_error() {
        let sandbox = Sandbox::new();
        let profile = sandbox.profile("bad.toml", "[hardware\n");

        sandbox
            .devid()
            .args(["resolve", "--profile"])
            .arg(&profile)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid host profile"));
    }

    #[test]
    fn info_json() {
        let sandbox = Sandbox::new();
        let profile = sandbox.profile("hw.toml", "[hardware]\nplatform = \"MacIntel\"\n");

        sandbox
            .devid()
            .args(["info", "--json", "--profile"])
            .arg(&profile)
            .assert()
            .success()
            .stdout(predicate::str::contains("MacIntel"))
            .stdout(predicate::str::contains("\"hasAndroidBridge\": false"));
    }

    #[test]
    fn config_path() {
        let sandbox = Sandbox::new();
        sandbox
            .devid()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        Sandbox::new()
            .devid()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"))
            .stdout(predicate::str::contains("device-id-pwa-v1"));
    }

    #[test]
    fn config_set_persists() {
        let sandbox = Sandbox::new();
        sandbox
            .devid()
            .args(["config", "set", "cache.generation", "device-id-pwa-v2"])
            .assert()
            .success();

        sandbox
            .devid()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("device-id-pwa-v2"));
    }

    #[test]
    fn cache_message_skip_waiting() {
        let sandbox = Sandbox::new();
        sandbox.use_local_storage();

        sandbox
            .devid()
            .args(["cache", "message", r#"{"action":"skipWaiting"}"#])
            .assert()
            .success()
            .stdout(predicate::str::contains("skip waiting"))
            .stdout(predicate::str::contains("nothing to activate"));
    }

    #[test]
    fn cache_list_empty() {
        let sandbox = Sandbox::new();
        sandbox.use_local_storage();

        sandbox
            .devid()
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No caches found"));
    }

    #[test]
    fn cache_activate_without_install_fails() {
        let sandbox = Sandbox::new();
        sandbox.use_local_storage();

        sandbox
            .devid()
            .args(["cache", "activate"])
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "Cache device-id-pwa-v1 is not fully installed",
            ))
            .stderr(predicate::str::contains("devid cache install"));
    }
}
