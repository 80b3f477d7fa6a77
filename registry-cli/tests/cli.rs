// registry-cli/tests/cli.rs

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

struct Env {
    _tmp: TempDir,
    dir: PathBuf,
}

impl Env {
    fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().to_path_buf();
        Self { _tmp: tmp, dir }
    }

    fn registry(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("registry"));
        cmd.current_dir(&self.dir);
        cmd.arg("--state").arg(self.dir.join("registry-state.json"));
        cmd
    }

    fn write_sdl(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }
}

#[test]
fn init_then_publish_then_check() {
    let env = Env::new();

    env.registry().args(["init", "--name", "prod", "--project-type", "single"]).assert().success();

    let v1 = env.write_sdl("v1.graphql", "type Query { hello: String }");
    env.registry()
        .args(["publish", "--sdl-file"])
        .arg(&v1)
        .assert()
        .success()
        .stdout(predicate::str::contains("published version"));

    let v2 = env.write_sdl("v2.graphql", "type Query { hello: String, world: String }");
    env.registry()
        .args(["check", "--sdl-file"])
        .arg(&v2)
        .assert()
        .success()
        .stdout(predicate::str::contains("check passed"));
}

#[test]
fn breaking_publish_without_force_is_rejected() {
    let env = Env::new();

    env.registry().args(["init", "--name", "prod", "--project-type", "single"]).assert().success();

    let v1 = env.write_sdl("v1.graphql", "type Query { hello: String, world: String }");
    env.registry().args(["publish", "--sdl-file"]).arg(&v1).assert().success();

    let v2 = env.write_sdl("v2.graphql", "type Query { hello: String }");
    env.registry()
        .args(["publish", "--sdl-file"])
        .arg(&v2)
        .assert()
        .failure()
        .stdout(predicate::str::contains("rejected"));
}

#[test]
fn composite_publish_composes_subgraphs() {
    let env = Env::new();

    env.registry().args(["init", "--name", "prod", "--project-type", "composite"]).assert().success();

    let users = env.write_sdl("users.graphql", "type Query { user: String }");
    env.registry()
        .args(["publish", "--sdl-file"])
        .arg(&users)
        .args(["--service-name", "users", "--service-url", "http://users"])
        .assert()
        .success()
        .stdout(predicate::str::contains("published version"));
}
