//! Integration tests for whole generation runs.
//!
//! Each test copies `tests/fixtures/project` into a fresh temp directory,
//! then drives either the library entry points or the `apiconf` binary
//! against it.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use apiconf::artifact::render::{render, render_schema, RenderError};
use apiconf::artifact::{ArtifactError, ArtifactWriter, Outcome};
use apiconf::codegen::{Compilation, EmitOptions};
use apiconf::core::config::Config;
use apiconf::core::paths::ProjectPaths;
use apiconf::core::schema::Schema;
use apiconf::core::types::Mode;

fn fixture_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/project")
}

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
}

/// A writable copy of the fixture project.
fn project() -> (TempDir, ProjectPaths) {
    let dir = TempDir::new().unwrap();
    copy_dir(&fixture_root(), dir.path());
    fs::create_dir_all(dir.path().join("src/config")).unwrap();
    let paths = ProjectPaths::new(dir.path().to_path_buf());
    (dir, paths)
}

fn read(dir: &TempDir, rel: &str) -> String {
    fs::read_to_string(dir.path().join(rel)).unwrap()
}

fn apiconf(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("apiconf").unwrap();
    cmd.arg("--cwd")
        .arg(dir.path())
        .env_remove("APICONF_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

// =============================================================================
// Library runs
// =============================================================================

#[test]
fn primary_generation_writes_every_artifact() {
    let (dir, paths) = project();
    let config = Config::default();
    let rendered = render(&paths, &config, Mode::Primary).unwrap();
    let outcomes = ArtifactWriter::new().commit_all(&rendered.artifacts).unwrap();

    assert_eq!(
        outcomes,
        vec![
            Outcome::Updated,
            Outcome::Created,
            Outcome::Updated,
            Outcome::Updated
        ]
    );

    let tables = read(&dir, "src/config/config_def.c");
    assert!(tables.starts_with(
        "/* DO NOT EDIT: automatically built by apiconf. */\n\n#include \"wt_internal.h\"\n"
    ));
    assert!(tables.contains("static const char *confchk_verbose_choices[] = {"));
    assert!(tables.contains("static const char *confchk_verbose2_choices[] = {"));
    assert!(tables.contains("confchk_WT_CONNECTION_reconfigure_log_subconfigs[] = {"));
    assert!(tables.contains("confchk_WT_SESSION_create_log_subconfigs[] = {"));
    assert!(tables.contains("static const WT_CONFIG_ENTRY config_entries[] = {"));
    assert!(tables.contains("__wt_conn_config_match"));

    let entry = read(&dir, "src/include/config.h");
    assert!(entry.contains(
        " * configuration section: BEGIN\n */\n\
         #define WT_CONFIG_ENTRY_WT_CONNECTION_close 0\n\
         #define WT_CONFIG_ENTRY_WT_CONNECTION_reconfigure 1\n\
         #define WT_CONFIG_ENTRY_WT_SESSION_create 2\n\
         #define WT_CONFIG_ENTRY_WT_SESSION_drop 3\n\
         /*\n * configuration section: END\n"
    ));
    assert!(entry.ends_with("\tconst char *base;\n};\n"));

    let keys = read(&dir, "src/include/conf.h");
    assert!(keys.contains(
        "#define WT_CONF_KEY_Log 2ULL\n\
         #define WT_CONF_KEY_archive 4ULL\n\
         #define WT_CONF_KEY_block_compressor 6ULL\n\
         #define WT_CONF_KEY_cache_size 1ULL\n\
         #define WT_CONF_KEY_enabled 3ULL\n\
         #define WT_CONF_KEY_leak_memory 0ULL\n\
         #define WT_CONF_KEY_verbose 5ULL\n\
         \n\
         #define WT_CONF_KEY_COUNT 7\n"
    ));
    assert!(keys.contains(
        "static const struct {\n    struct {\n      uint64_t archive;\n      uint64_t enabled;\n    } Log;\n"
    ));
    assert!(keys.contains("      WT_CONF_KEY_Log | (WT_CONF_KEY_archive << 16),\n"));
    assert!(keys.contains("} WT_CONF_KEY_STRUCTURE = {\n"));
}

#[test]
fn documentation_regions_regenerated() {
    let (dir, paths) = project();
    let rendered = render(&paths, &Config::default(), Mode::Primary).unwrap();
    ArtifactWriter::new().commit_all(&rendered.artifacts).unwrap();

    let docs = read(&dir, "src/include/wiredtiger.in");
    assert!(!docs.contains("@config{stale"));
    assert!(docs.contains(
        "\t * @configstart{WT_CONNECTION.close, see dist/api_data.toml}\n\
         \t * @config{leak_memory, don't free memory during close., a boolean flag; default \\c false.}\n\
         \t * @configend\n"
    ));
    assert!(docs.contains(
        "\t * @config{log = (, enable logging., a set of related configuration options defined as\n\
         \t * follows.}\n\
         \t * @config{&nbsp;&nbsp;&nbsp;&nbsp;archive, automatically archive unneeded log files., a\n\
         \t * boolean flag; default \\c true.}\n"
    ));
    assert!(docs.contains("\t * @configempty{WT_SESSION.drop, see dist/api_data.toml}\n"));
    assert!(docs.contains("\t * @configempty{WT_SESSION.rename, see dist/api_data.toml}\n"));
    assert!(docs.contains(
        "\tint __F(create)(WT_SESSION *session, const char *name, const char *config);\n"
    ));
    assert_eq!(rendered.missing_methods, vec!["WT_SESSION.rename".to_string()]);
}

#[test]
fn second_run_changes_nothing() {
    let (_dir, paths) = project();
    let config = Config::default();
    let writer = ArtifactWriter::new();

    let first = render(&paths, &config, Mode::Primary).unwrap();
    writer.commit_all(&first.artifacts).unwrap();

    let second = render(&paths, &config, Mode::Primary).unwrap();
    assert_eq!(first.artifacts, second.artifacts);
    let outcomes = writer.commit_all(&second.artifacts).unwrap();
    assert!(outcomes.iter().all(|o| *o == Outcome::Unchanged));
}

#[test]
fn output_is_deterministic_across_projects() {
    let (_a, paths_a) = project();
    let (_b, paths_b) = project();
    let config = Config::default();

    let a = render(&paths_a, &config, Mode::Primary).unwrap();
    let b = render(&paths_b, &config, Mode::Primary).unwrap();
    let contents_a: Vec<_> = a.artifacts.iter().map(|x| &x.contents).collect();
    let contents_b: Vec<_> = b.artifacts.iter().map(|x| &x.contents).collect();
    assert_eq!(contents_a, contents_b);
}

#[test]
fn test_mode_writes_only_test_tables() {
    let (dir, paths) = project();
    let before = read(&dir, "src/include/wiredtiger.in");
    let rendered = render(&paths, &Config::default(), Mode::Test).unwrap();
    ArtifactWriter::new().commit_all(&rendered.artifacts).unwrap();

    let tables = read(&dir, "src/config/test_config.c");
    assert!(tables.contains("confchk_example_test_runtime_monitor_subconfigs"));
    assert!(tables.contains("__wt_test_config_match"));
    assert!(!tables.contains("__wt_conn_config_init"));
    assert_eq!(read(&dir, "src/include/wiredtiger.in"), before);
    assert!(!dir.path().join("src/config/config_def.c").exists());
}

#[test]
fn failed_render_writes_nothing() {
    let (dir, paths) = project();
    fs::write(dir.path().join("src/include/conf.h"), "no fragments here\n").unwrap();
    let template_before = read(&dir, "src/include/wiredtiger.in");

    let err = render(&paths, &Config::default(), Mode::Primary).unwrap_err();
    assert!(matches!(
        err,
        RenderError::Artifact(ArtifactError::MissingFragment { ref fragment, .. })
            if fragment == "API configuration keys"
    ));
    assert_eq!(read(&dir, "src/include/wiredtiger.in"), template_before);
    assert!(!dir.path().join("src/config/config_def.c").exists());
}

#[test]
fn custom_prefix_renames_symbols() {
    let (dir, paths) = project();
    fs::write(
        dir.path().join("apiconf.toml"),
        "[emit]\nprefix = \"XX\"\ninclude = \"xx_internal.h\"\n",
    )
    .unwrap();
    let config = Config::load(dir.path(), None).unwrap();

    let rendered = render(&paths, &config, Mode::Primary).unwrap();
    let tables = &rendered.artifacts[1].contents;
    assert!(tables.contains("#include \"xx_internal.h\""));
    assert!(tables.contains("static const XX_CONFIG_CHECK confchk_WT_SESSION_create[] = {"));
    assert!(tables.contains("__xx_conn_config_match"));
    assert!(rendered.artifacts[3].contents.contains("#define XX_CONF_KEY_COUNT 7"));
}

#[test]
fn kind_conflict_is_fatal() {
    let schema = Schema::from_toml_str(
        r#"
        [[methods.a.config]]
        name = "Log"
        type = "int"

        [[methods.b.config]]
        name = "log"
        type = "category"

        [[methods.b.config.subconfig]]
        name = "x"
        type = "int"
        "#,
    )
    .unwrap();
    assert!(Compilation::new(&schema, EmitOptions::default()).is_err());

    let (_dir, paths) = project();
    let err = render_schema(&schema, &paths, &Config::default(), Mode::Primary).unwrap_err();
    assert!(matches!(err, RenderError::Compile(_)));
}

// =============================================================================
// Binary
// =============================================================================

#[test]
fn generate_then_check_passes() {
    let (dir, _paths) = project();
    apiconf(&dir)
        .arg("generate")
        .assert()
        .success()
        .stdout(predicate::str::contains("created:"))
        .stderr(predicate::str::contains(
            "WT_SESSION.rename: configuration method not found",
        ));

    apiconf(&dir)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("primary configuration is up to date"));
}

#[test]
fn check_reports_stale_files_with_status_one() {
    let (dir, _paths) = project();
    apiconf(&dir)
        .args(["check"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("out of date"))
        .stderr(predicate::str::contains("config_def.c"));
    assert!(!dir.path().join("src/config/config_def.c").exists());
}

#[test]
fn quiet_generate_prints_nothing_to_stdout() {
    let (dir, _paths) = project();
    apiconf(&dir)
        .args(["generate", "--test", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert!(dir.path().join("src/config/test_config.c").exists());
}

#[test]
fn broken_schema_exits_with_two() {
    let (dir, _paths) = project();
    fs::write(
        dir.path().join("dist/api_data.toml"),
        "[[methods.m.config]]\nname = \"x\"\ntype = \"float\"\n",
    )
    .unwrap();
    apiconf(&dir)
        .arg("generate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown type 'float'"));
}

#[test]
fn keys_json_lists_registry() {
    let (dir, _paths) = project();
    let output = apiconf(&dir)
        .args(["keys", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let entries: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 7);
    assert_eq!(entries[0]["identity"], "Log");
    assert_eq!(entries[0]["id"], 2);
    assert_eq!(entries[0]["role"], "category");
}

#[test]
fn slots_listed_in_order() {
    let (dir, _paths) = project();
    apiconf(&dir)
        .arg("slots")
        .assert()
        .success()
        .stdout(predicate::str::contains("   0  WT_CONNECTION.close\n"))
        .stdout(predicate::str::contains("   3  WT_SESSION.drop\n"));
}

#[test]
fn config_prints_effective_values() {
    let (dir, _paths) = project();
    apiconf(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("# built-in defaults"))
        .stdout(predicate::str::contains("prefix = \"WT\""));
}

#[test]
fn invalid_config_exits_with_two() {
    let (dir, _paths) = project();
    fs::write(dir.path().join("apiconf.toml"), "[emit]\nprefix = \"not valid\"\n").unwrap();
    apiconf(&dir).arg("config").assert().code(2);
}

#[test]
fn completion_needs_no_project() {
    Command::cargo_bin("apiconf")
        .unwrap()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("apiconf"));
}
