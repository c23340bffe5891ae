//! Integration test: directory runs through the facade, with project config
//! and fixes written back to disk.

use ormsniff::{run, ConfigSource};
use std::fs;
use std::path::Path;

const ARTICLE: &str = include_str!("../../ormsniff-rules/tests/fixtures/Article.php");

const REPOSITORY: &str = "<?php\ninterface ArticleRepository\n{\n    public function count()\n    {\n        $n = 1;\n        return $n;\n    }\n}\n";

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project(config: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "ormsniff.toml", config);
    write(dir.path(), "src/Entity/Article.php", ARTICLE);
    write(dir.path(), "src/Repository/ArticleRepository.php", REPOSITORY);
    write(dir.path(), "vendor/acme/Broken.php", "<?php\ninterface Skipped {}\n");
    dir
}

#[test]
fn reports_with_project_config() {
    let dir = project("[sniffs.blank-line-before-return]\nenabled = false\n");
    let report = run(dir.path(), None, false).unwrap();

    assert_eq!(report.config, ConfigSource::Project(dir.path().join("ormsniff.toml")));
    assert_eq!(report.result.files_checked, 2);
    let codes: Vec<&str> = report.result.violations.iter().map(|v| v.short_code()).collect();
    assert_eq!(codes, vec!["ColumnUnderscored", "JoinColumnNameFormat", "Missing"]);
    assert!(report.written.is_empty());

    let json = report.to_json().unwrap();
    assert!(json.contains("\"source\": \"project\""));
    assert!(json.contains("Ormsniff.NamingConventions.InterfaceSuffix.Missing"));
}

#[test]
fn fix_mode_writes_files() {
    let dir = project("[analyzer]\nfix = true\n");
    let report = run(dir.path(), None, false).unwrap();
    assert_eq!(report.written.len(), 2);

    let article = fs::read_to_string(dir.path().join("src/Entity/Article.php")).unwrap();
    assert!(article.contains(r#"name="first_name""#));
    assert!(article.contains("name: 'author_id'"));

    let repository = fs::read_to_string(dir.path().join("src/Repository/ArticleRepository.php")).unwrap();
    assert!(repository.contains("interface ArticleRepositoryInterface"));
    assert!(repository.contains("$n = 1;\n\n        return $n;"));

    let rerun = run(dir.path(), None, false).unwrap();
    assert!(rerun.result.violations.is_empty(), "{:#?}", rerun.result.violations);
}

#[test]
fn explicit_config_errors_are_reported() {
    let dir = project("");
    let missing = dir.path().join("missing.toml");
    let err = run(dir.path(), Some(&missing), false).unwrap_err();
    assert!(matches!(err, ormsniff::RunError::Config(_)));
}
