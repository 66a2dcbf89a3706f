use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const TEAM_SYNC: &str = "title = \"Team Sync\"\ndatetime = 2020-01-01T00:00:00Z\nnotes = \"\"\n";

fn stno(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("stno").unwrap();
    cmd.env("STNO_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("STNO_LOG")
        .env_remove("EDITOR")
        .env_remove("VISUAL");
    cmd
}

fn write_entry(home: &Path, uid: &str, text: &str) {
    let path = home.join("default").join(format!("{}.toml", uid));
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

#[test]
fn test_add_from_file_then_list() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("input.toml");
    fs::write(&input, TEAM_SYNC).unwrap();

    stno(temp.path())
        .arg("add")
        .arg("--file")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Entry saved: 2020-01-01T00-00-00Z-Team-Sync",
        ));

    assert!(temp
        .path()
        .join("default")
        .join("2020-01-01T00-00-00Z-Team-Sync.toml")
        .is_file());

    stno(temp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("2020-01-01T00-00-00Z-Team-Sync"));
}

#[test]
fn test_add_same_title_twice_from_stdin() {
    let temp = TempDir::new().unwrap();
    for _ in 0..2 {
        stno(temp.path())
            .args(["add", "--file", "-"])
            .write_stdin(TEAM_SYNC)
            .assert()
            .success();
    }

    stno(temp.path())
        .arg("ls")
        .assert()
        .success()
        .stdout(predicate::str::diff(
            "2020-01-01T00-00-00Z-Team-Sync\n2020-01-01T00-00-00Z-Team-Sync-0\n",
        ));
}

#[test]
fn test_add_invalid_file_fails_without_writing() {
    let temp = TempDir::new().unwrap();
    stno(temp.path())
        .args(["add", "--file", "-"])
        .write_stdin("title = ")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Invalid TOML"));

    let entries = fs::read_dir(temp.path().join("default")).unwrap().count();
    assert_eq!(entries, 0);
}

#[test]
fn test_notebook_flag_selects_directory() {
    let temp = TempDir::new().unwrap();
    stno(temp.path())
        .args(["-n", "journal", "add", "--file", "-"])
        .write_stdin(TEAM_SYNC)
        .assert()
        .success();

    assert!(temp
        .path()
        .join("journal")
        .join("2020-01-01T00-00-00Z-Team-Sync.toml")
        .is_file());
}

#[test]
fn test_list_empty_notebook() {
    let temp = TempDir::new().unwrap();
    stno(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No entries found."));
}

#[test]
fn test_query_skips_corrupt_entries() {
    let temp = TempDir::new().unwrap();
    write_entry(temp.path(), "a", "title = \"A\"\n");
    write_entry(temp.path(), "b", "title = \"B\"\n");
    write_entry(temp.path(), "broken", "title = \n");

    stno(temp.path())
        .arg("query")
        .assert()
        .success()
        .stdout(predicate::str::contains("[a]"))
        .stdout(predicate::str::contains("[b]"))
        .stdout(predicate::str::contains("broken").not())
        .stderr(predicate::str::contains("Skipped broken"));

    assert_eq!(
        fs::read_to_string(temp.path().join("default").join("broken.toml")).unwrap(),
        "title = \n"
    );
}

#[test]
fn test_query_filter_select_and_section() {
    let temp = TempDir::new().unwrap();
    write_entry(temp.path(), "a", "title = \"A\"\nkind = \"retro\"\n");
    write_entry(temp.path(), "b", "title = \"B\"\nkind = \"standup\"\n");
    write_entry(temp.path(), "work/c", "title = \"C\"\nkind = \"retro\"\n");

    stno(temp.path())
        .args(["query", "--where", "kind=retro", "--select", "title"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[a]"))
        .stdout(predicate::str::contains("[\"work/c\"]"))
        .stdout(predicate::str::contains("[b]").not())
        .stdout(predicate::str::contains("kind").not());

    stno(temp.path())
        .args(["query", "work"])
        .assert()
        .success()
        .stdout(predicate::str::contains("title = \"C\""))
        .stdout(predicate::str::contains("title = \"A\"").not());
}

#[test]
fn test_view_prints_entry() {
    let temp = TempDir::new().unwrap();
    write_entry(temp.path(), "a", "title = \"A\"\n");

    stno(temp.path())
        .args(["view", "a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("title = \"A\""));

    stno(temp.path())
        .args(["view", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Entry not found: missing"));
}

#[test]
fn test_mv_and_rm() {
    let temp = TempDir::new().unwrap();
    write_entry(temp.path(), "a", "title = \"A\"\n");
    write_entry(temp.path(), "b", "title = \"B\"\n");

    stno(temp.path())
        .args(["mv", "a", "b"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    stno(temp.path())
        .args(["mv", "a", "work/a"])
        .assert()
        .success();
    assert!(temp.path().join("default").join("work").join("a.toml").is_file());

    stno(temp.path())
        .args(["rm", "work/a", "b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Entry removed: b"));

    stno(temp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No entries found."));
}

#[test]
fn test_config_set_and_get() {
    let temp = TempDir::new().unwrap();
    stno(temp.path())
        .args(["config", "entry-id-template", "{{ title }}"])
        .assert()
        .success()
        .stdout(predicate::str::contains("entry-id-template set to {{ title }}"));

    stno(temp.path())
        .args(["config", "entry-id-template"])
        .assert()
        .success()
        .stdout(predicate::str::contains("{{ title }}"));

    stno(temp.path())
        .args(["add", "--file", "-"])
        .write_stdin(TEAM_SYNC)
        .assert()
        .success()
        .stdout(predicate::str::contains("Entry saved: Team-Sync"));
}

#[test]
fn test_config_rejects_broken_template() {
    let temp = TempDir::new().unwrap();
    stno(temp.path())
        .args(["config", "entry-template", "{{ nope() }}"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Template error"));

    assert!(!temp.path().join("config.json").exists());
}

#[cfg(unix)]
mod editor {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn editor_script(dir: &Path, body: &str) -> String {
        let script = dir.join("fake-editor");
        fs::write(&script, format!("#!/bin/sh\nsleep 1\n{}\n", body)).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script.display().to_string()
    }

    #[test]
    fn test_add_without_changes_exits_nonzero() {
        let temp = TempDir::new().unwrap();
        stno(temp.path())
            .env("EDITOR", "true")
            .arg("add")
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("Aborting due to no changes."));

        let entries = fs::read_dir(temp.path().join("default")).unwrap().count();
        assert_eq!(entries, 0);
    }

    #[test]
    fn test_add_through_editor() {
        let temp = TempDir::new().unwrap();
        let editor = editor_script(
            temp.path(),
            "printf 'title = \"Scripted\"\\ndatetime = 2020-01-01T00:00:00Z\\n' > \"$1\"",
        );

        stno(temp.path())
            .env("EDITOR", &editor)
            .arg("add")
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Entry saved: 2020-01-01T00-00-00Z-Scripted",
            ));
    }

    #[test]
    fn test_add_invalid_then_decline_retry() {
        let temp = TempDir::new().unwrap();
        let editor = editor_script(temp.path(), "printf 'title = ' > \"$1\"");

        stno(temp.path())
            .env("EDITOR", &editor)
            .arg("add")
            .write_stdin("n\n")
            .assert()
            .failure()
            .stdout(predicate::str::contains("Try again? (y/N)"))
            .stderr(predicate::str::contains("Invalid TOML"));
    }

    #[test]
    fn test_edit_keeps_identifier() {
        let temp = TempDir::new().unwrap();
        write_entry(temp.path(), "note", "title = \"old\"\n");
        let editor = editor_script(temp.path(), "printf 'title = \"new\"\\n' > \"$1\"");

        stno(temp.path())
            .env("EDITOR", &editor)
            .args(["edit", "note"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Entry updated: note"));

        assert_eq!(
            fs::read_to_string(temp.path().join("default").join("note.toml")).unwrap(),
            "title = \"new\"\n"
        );
    }

    #[test]
    fn test_configured_editor_overrides_env() {
        let temp = TempDir::new().unwrap();
        stno(temp.path())
            .args(["config", "editor", "true"])
            .assert()
            .success();

        stno(temp.path())
            .env("EDITOR", "false")
            .arg("add")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Aborting due to no changes."))
            .stderr(predicate::str::contains("Editor error").not());
    }
}
