//! Integration tests for Quarry

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn quarry() -> Command {
        cargo_bin_cmd!("quarry")
    }

    fn file_url(path: &Path) -> String {
        format!("file://{}", path.display())
    }

    /// Temp dirs for one test: a file:// repository, a cache, a config
    struct Fixture {
        _tmp: TempDir,
        repo: PathBuf,
        cache: PathBuf,
        config: PathBuf,
    }

    fn fixture() -> Fixture {
        let tmp = TempDir::new().unwrap();
        let repo = tmp.path().join("repo");
        let cache = tmp.path().join("cache");
        fs::create_dir_all(&repo).unwrap();
        fs::create_dir_all(&cache).unwrap();
        let config = tmp.path().join("config.toml");
        Fixture {
            repo,
            cache,
            config,
            _tmp: tmp,
        }
    }

    impl Fixture {
        /// Command with config and cache pinned inside the fixture
        fn cmd(&self) -> Command {
            let mut cmd = quarry();
            cmd.env("QUARRY_CONFIG", &self.config);
            cmd.arg("--cache-dir").arg(&self.cache);
            cmd
        }

        fn repo_url(&self) -> String {
            file_url(&self.repo)
        }

        fn seed_artifact(&self, version: &str, bytes: &[u8]) {
            let dir = self.repo.join("org/demo/app").join(version);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join(format!("app-{}.jar", version)), bytes).unwrap();
        }

        fn seed_manifest(&self, versions: &[&str]) {
            let dir = self.repo.join("org/demo/app");
            fs::create_dir_all(&dir).unwrap();
            let list = versions
                .iter()
                .map(|v| format!("\"{}\"", v))
                .collect::<Vec<_>>()
                .join(",");
            fs::write(
                dir.join("versions.json"),
                format!("{{\"versions\":[{}]}}", list),
            )
            .unwrap();
        }

        fn cached_artifact(&self, version: &str) -> PathBuf {
            self.cache
                .join("org/demo/app")
                .join(version)
                .join(format!("app-{}.jar", version))
        }
    }

    #[test]
    fn help_displays() {
        quarry()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Artifact Coordinate Resolver"));
    }

    #[test]
    fn version_displays() {
        quarry()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("quarry"));
    }

    #[test]
    fn fetch_resolves_pinned_version() {
        let fx = fixture();
        fx.seed_artifact("1.0", b"jar-bytes-1.0");

        fx.cmd()
            .args(["--repo", &fx.repo_url(), "fetch", "org.demo:app:1.0"])
            .assert()
            .success()
            .stdout(predicate::str::contains("app-1.0.jar"));

        assert_eq!(fs::read(fx.cached_artifact("1.0")).unwrap(), b"jar-bytes-1.0");
    }

    #[test]
    fn fetch_serves_from_cache_when_repo_dies() {
        let fx = fixture();
        fx.seed_artifact("1.0", b"jar-bytes-1.0");

        fx.cmd()
            .args(["--repo", &fx.repo_url(), "fetch", "org.demo:app:1.0"])
            .assert()
            .success();

        // Same coordinate again, but the only repository is gone
        fx.cmd()
            .args(["--repo", "file:///nowhere", "fetch", "org.demo:app:1.0"])
            .assert()
            .success()
            .stdout(predicate::str::contains("app-1.0.jar"));
    }

    #[test]
    fn fetch_latest_picks_highest_version() {
        let fx = fixture();
        fx.seed_artifact("1.0", b"old");
        fx.seed_artifact("1.1", b"new");
        fx.seed_manifest(&["1.0", "1.1"]);

        fx.cmd()
            .args(["--repo", &fx.repo_url(), "fetch", "org.demo:app:LATEST"])
            .assert()
            .success()
            .stdout(predicate::str::contains("app-1.1.jar"));
    }

    #[test]
    fn latest_resolves_offline_after_first_fetch() {
        let fx = fixture();
        fx.seed_artifact("1.1", b"new");
        fx.seed_manifest(&["1.0", "1.1"]);

        fx.cmd()
            .args(["--repo", &fx.repo_url(), "fetch", "org.demo:app:LATEST"])
            .assert()
            .success();

        // The manifest was cached alongside the artifact, so LATEST
        // still pins to 1.1 with every repository gone
        fx.cmd()
            .args(["--repo", "file:///nowhere", "fetch", "org.demo:app:LATEST"])
            .assert()
            .success()
            .stdout(predicate::str::contains("app-1.1.jar"));
    }

    #[test]
    fn fetch_range_respects_upper_bound() {
        let fx = fixture();
        fx.seed_artifact("1.0", b"a");
        fx.seed_artifact("1.1", b"b");
        fx.seed_artifact("2.0", b"c");
        fx.seed_manifest(&["1.0", "1.1", "2.0"]);

        fx.cmd()
            .args(["--repo", &fx.repo_url(), "fetch", "org.demo:app:[1.0,2.0)"])
            .assert()
            .success()
            .stdout(predicate::str::contains("app-1.1.jar"));
    }

    #[test]
    fn fetch_falls_back_past_dead_repository() {
        let fx = fixture();
        fx.seed_artifact("1.0", b"served");

        fx.cmd()
            .args([
                "--repo",
                "file:///nowhere",
                "--repo",
                &fx.repo_url(),
                "fetch",
                "org.demo:app:1.0",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("app-1.0.jar"));
    }

    #[test]
    fn fetch_missing_artifact_fails() {
        let fx = fixture();

        fx.cmd()
            .args(["--repo", &fx.repo_url(), "fetch", "org.demo:ghost:9.9"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to resolve"))
            .stderr(predicate::str::contains("org.demo:ghost:jar:9.9"));
    }

    #[test]
    fn fetch_rejects_bad_coordinate() {
        let fx = fixture();

        fx.cmd()
            .args(["fetch", "junk"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid coordinate"));
    }

    #[test]
    fn fetch_writes_output_file() {
        let fx = fixture();
        fx.seed_artifact("1.0", b"file-copy");
        let out = fx.cache.join("out.bin");

        fx.cmd()
            .args(["--repo", &fx.repo_url(), "fetch", "org.demo:app:1.0", "-o"])
            .arg(&out)
            .assert()
            .success()
            .stdout(predicate::str::contains("fetched"));

        assert_eq!(fs::read(&out).unwrap(), b"file-copy");
    }

    #[test]
    fn fetch_streams_to_stdout() {
        let fx = fixture();
        fx.seed_artifact("1.0", b"raw-bytes");

        fx.cmd()
            .args(["--repo", &fx.repo_url(), "fetch", "org.demo:app:1.0", "-o", "-"])
            .assert()
            .success()
            .stdout(predicate::eq(&b"raw-bytes"[..]));
    }

    #[test]
    fn missing_cache_dir_errors() {
        let fx = fixture();
        let missing = fx.cache.join("not-created");

        quarry()
            .env("QUARRY_CONFIG", &fx.config)
            .arg("--cache-dir")
            .arg(&missing)
            .args(["--repo", &fx.repo_url(), "fetch", "org.demo:app:1.0"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("does not exist"));
    }

    #[test]
    fn versions_lists_sorted_plain() {
        let fx = fixture();
        fx.seed_manifest(&["2.0", "1.0", "1.1"]);

        fx.cmd()
            .args([
                "--repo",
                &fx.repo_url(),
                "versions",
                "org.demo:app",
                "--format",
                "plain",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("1.0\n1.1\n2.0"));
    }

    #[test]
    fn versions_accepts_extension_form() {
        let fx = fixture();
        fx.seed_manifest(&["1.0", "1.1"]);

        fx.cmd()
            .args([
                "--repo",
                &fx.repo_url(),
                "versions",
                "org.demo:app:jar",
                "--format",
                "plain",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("1.0\n1.1"));
    }

    #[test]
    fn versions_json_format() {
        let fx = fixture();
        fx.seed_manifest(&["1.0"]);

        fx.cmd()
            .args([
                "--repo",
                &fx.repo_url(),
                "versions",
                "org.demo:app",
                "--format",
                "json",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"versions\""));
    }

    #[test]
    fn repos_marks_dead_repository() {
        let fx = fixture();

        fx.cmd()
            .args([
                "--repo",
                "file:///nowhere",
                "--repo",
                &fx.repo_url(),
                "repos",
                "--format",
                "plain",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("repo0 file:///nowhere unreachable"))
            .stdout(predicate::str::contains("ok"));
    }

    #[test]
    fn config_init_show_path_roundtrip() {
        let fx = fixture();

        fx.cmd()
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("initialized"));
        assert!(fx.config.exists());

        fx.cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[repositories]"));

        fx.cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));

        // A second init without --force leaves the file alone
        fx.cmd()
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));
    }

    #[test]
    fn config_set_updates_file() {
        let fx = fixture();

        fx.cmd()
            .args(["config", "set", "network.timeout_secs", "5"])
            .assert()
            .success();

        fx.cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("timeout_secs = 5"));
    }
}
