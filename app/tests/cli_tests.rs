use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ADMIN_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA";

fn bookshelf(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bookshelf-server").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env("DATABASE_URL", format!("sqlite:{}", dir.path().join("test.db").display()))
        .env("ADMIN_PASSWORD_HASH", ADMIN_HASH)
        .env("LOG_DIR", dir.path().join("logs"));
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    bookshelf(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("bootstrap"))
        .stdout(predicate::str::contains("hash-password"));
}

#[test]
fn test_hash_password_prints_argon2_hash() {
    let dir = TempDir::new().unwrap();
    bookshelf(&dir)
        .args(["hash-password", "s3cret-pass"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("$argon2"));
}

#[test]
fn test_hash_password_rejects_empty() {
    let dir = TempDir::new().unwrap();
    bookshelf(&dir)
        .args(["hash-password", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("password cannot be empty"));
}

#[test]
fn test_bootstrap_seeds_then_is_idempotent() {
    let dir = TempDir::new().unwrap();

    bookshelf(&dir)
        .arg("bootstrap")
        .assert()
        .success()
        .stdout(predicate::str::contains("admin account created"))
        .stdout(predicate::str::contains("24 book(s) seeded"));

    assert!(dir.path().join("test.db").exists());

    bookshelf(&dir)
        .arg("bootstrap")
        .assert()
        .success()
        .stdout(predicate::str::contains("admin account present"))
        .stdout(predicate::str::contains("0 book(s) seeded, 24 in collection"));
}

#[test]
fn test_bootstrap_respects_seed_flag() {
    let dir = TempDir::new().unwrap();
    bookshelf(&dir)
        .arg("bootstrap")
        .env("AUTO_SEED_BOOKS", "false")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 book(s) seeded, 0 in collection"));
}
