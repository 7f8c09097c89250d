use std::fs;
use std::path::Path;
use tempfile::TempDir;
use termsweep::config::Config;
use termsweep::pipeline::run_scan;
use termsweep::progress::NoProgress;
use termsweep::scan::CancelToken;
use termsweep_core::error::{ConfigError, ScanError};

fn corpus(root: &Path, files: &[(&str, &str)]) {
    for (name, body) in files {
        let path = root.join("corpus").join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }
}

fn config(tmp: &TempDir, terms: &str) -> Config {
    let mut config = Config::default();
    config.scan.terms = Some(terms.to_string());
    config.scan.root = Some(tmp.path().join("corpus"));
    config.scan.jobs = 3;
    config.scan.chunk_size = 1;
    config.output.dir = tmp.path().join("out");
    config
}

fn export(tmp: &TempDir) -> std::path::PathBuf {
    tmp.path().join("out/Export")
}

#[test]
fn test_single_term_scenario() {
    let tmp = TempDir::new().unwrap();
    corpus(
        tmp.path(),
        &[("a.txt", "visit shop.example.com today\nunrelated line\n")],
    );
    fs::write(tmp.path().join("terms.txt"), "shop.example.com\nabsent.example\n").unwrap();
    let terms = tmp.path().join("terms.txt");

    let report = run_scan(
        &config(&tmp, terms.to_str().unwrap()),
        &CancelToken::new(),
        &NoProgress,
    )
    .unwrap();

    assert_eq!(report.summary.terms_total, 2);
    assert_eq!(report.summary.terms_with_matches, 1);
    assert_eq!(report.summary.total_lines, 1);
    assert_eq!(
        fs::read_to_string(export(&tmp).join("shop.example.com.txt")).unwrap(),
        "# Results for: shop.example.com\nvisit shop.example.com today\n"
    );
    assert!(!export(&tmp).join("absent.example.txt").exists());

    let absent = &report.records[1];
    assert_eq!(absent.term, "absent.example");
    assert_eq!(absent.output, None);
    assert_eq!(absent.matched_lines, 0);
}

#[test]
fn test_create_empty_writes_marker() {
    let tmp = TempDir::new().unwrap();
    corpus(tmp.path(), &[("a.txt", "nothing to see\n")]);
    let mut config = config(&tmp, "shop.example.com");
    config.output.create_empty = true;

    let report = run_scan(&config, &CancelToken::new(), &NoProgress).unwrap();
    assert_eq!(report.summary.terms_with_matches, 0);
    assert_eq!(
        fs::read_to_string(export(&tmp).join("shop.example.com.txt")).unwrap(),
        "# Results for: shop.example.com\n(no matches)\n"
    );
}

#[test]
fn test_owner_inferred_from_matched_line() {
    let tmp = TempDir::new().unwrap();
    corpus(tmp.path(), &[("creds.txt", "admin.example.org:user:pass\n")]);
    fs::write(tmp.path().join("owners.csv"), "example.org,carla\n").unwrap();
    let mut config = config(&tmp, "user:pass");
    config.owners.map = Some(tmp.path().join("owners.csv"));

    let report = run_scan(&config, &CancelToken::new(), &NoProgress).unwrap();
    assert_eq!(report.records[0].owner.as_deref(), Some("carla"));
    let text = fs::read_to_string(export(&tmp).join("user:pass.txt")).unwrap();
    assert!(text.starts_with("# Results for: user:pass\n# Owner: carla\n"));

    config.owners.infer = false;
    let report = run_scan(&config, &CancelToken::new(), &NoProgress).unwrap();
    assert_eq!(report.records[0].owner, None);
}

#[test]
fn test_missing_owner_map_is_not_fatal() {
    let tmp = TempDir::new().unwrap();
    corpus(tmp.path(), &[("a.txt", "example.com\n")]);
    let mut config = config(&tmp, "example.com");
    config.owners.map = Some(tmp.path().join("no-such-owners.csv"));

    let report = run_scan(&config, &CancelToken::new(), &NoProgress).unwrap();
    assert_eq!(report.records[0].owner, None);
    assert_eq!(report.summary.total_lines, 1);
}

#[test]
fn test_matches_are_case_insensitive_and_keep_original_text() {
    let tmp = TempDir::new().unwrap();
    corpus(
        tmp.path(),
        &[
            ("a.txt", "Login at SHOP.Example.COM\n"),
            ("b/c.log", "shop.example.com:bob@mail.test:pw\n"),
        ],
    );
    let mut config = config(&tmp, "Shop.Example.com");
    config.output.ordering = termsweep_core::aggregate::MergeOrder::Path;

    run_scan(&config, &CancelToken::new(), &NoProgress).unwrap();
    assert_eq!(
        fs::read_to_string(export(&tmp).join("shop.example.com.txt")).unwrap(),
        "# Results for: shop.example.com\n\
         Login at SHOP.Example.COM\n\
         shop.example.com:bob@mail.test:pw\n"
    );
}

#[test]
fn test_repeated_runs_give_same_result_sets() {
    let tmp = TempDir::new().unwrap();
    let files: Vec<(String, String)> = (0..20)
        .map(|i| {
            (
                format!("part{:02}.txt", i),
                format!("a.com first {i}\nb.com only {i}\na.com second {i}\n"),
            )
        })
        .collect();
    let refs: Vec<(&str, &str)> = files.iter().map(|(n, b)| (n.as_str(), b.as_str())).collect();
    corpus(tmp.path(), &refs);
    let config = config(&tmp, "a.com");

    let sorted_lines = || {
        let report = run_scan(&config, &CancelToken::new(), &NoProgress).unwrap();
        assert_eq!(report.summary.total_lines, 40);
        let text = fs::read_to_string(export(&tmp).join("a.com.txt")).unwrap();
        let lines: Vec<String> = text.lines().skip(1).map(String::from).collect();
        for i in 0..20 {
            let first = lines.iter().position(|l| *l == format!("a.com first {i}")).unwrap();
            assert_eq!(lines[first + 1], format!("a.com second {i}"));
        }
        let mut sorted = lines;
        sorted.sort();
        sorted
    };
    assert_eq!(sorted_lines(), sorted_lines());
}

#[test]
fn test_interrupted_run_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    corpus(tmp.path(), &[("a.txt", "a.com\n")]);
    let cancel = CancelToken::new();
    cancel.cancel();

    let err = run_scan(&config(&tmp, "a.com"), &cancel, &NoProgress).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ScanError>(),
        Some(ScanError::Interrupted)
    ));
    assert!(!tmp.path().join("out").exists());
}

#[test]
fn test_blank_term_is_config_error() {
    let tmp = TempDir::new().unwrap();
    corpus(tmp.path(), &[("a.txt", "a.com\n")]);
    let err = run_scan(&config(&tmp, "   "), &CancelToken::new(), &NoProgress).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::EmptyTermSet)
    ));
}

#[test]
fn test_manifest_lists_every_term() {
    let tmp = TempDir::new().unwrap();
    corpus(tmp.path(), &[("a.txt", "a.com\n")]);
    fs::write(tmp.path().join("terms.txt"), "a.com\nb.com\n").unwrap();
    let terms = tmp.path().join("terms.txt");
    let report = run_scan(
        &config(&tmp, terms.to_str().unwrap()),
        &CancelToken::new(),
        &NoProgress,
    )
    .unwrap();

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(report.manifest.unwrap()).unwrap()).unwrap();
    let records = manifest["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["matched_lines"], 1);
    assert!(records[1]["output"].is_null());
    assert_eq!(manifest["summary"]["files_considered"], 1);
}

#[test]
fn test_unwritable_result_file_does_not_abort_run() {
    let tmp = TempDir::new().unwrap();
    corpus(tmp.path(), &[("a.txt", "a.com\nb.com\n")]);
    fs::write(tmp.path().join("terms.txt"), "a.com\nb.com\n").unwrap();
    // A directory squatting on the result path makes the create fail.
    fs::create_dir_all(export(&tmp).join("b.com.txt")).unwrap();
    let terms = tmp.path().join("terms.txt");

    let report = run_scan(
        &config(&tmp, terms.to_str().unwrap()),
        &CancelToken::new(),
        &NoProgress,
    )
    .unwrap();

    assert_eq!(report.summary.outputs_failed, 1);
    assert_eq!(report.records[1].term, "b.com");
    assert_eq!(report.records[1].output, None);
    assert!(export(&tmp).join("a.com.txt").is_file());
    assert!(report.manifest.unwrap().is_file());
}

#[test]
fn test_long_term_gets_shortened_file_name() {
    let tmp = TempDir::new().unwrap();
    let long = "x".repeat(300);
    corpus(tmp.path(), &[("a.txt", &format!("a.com\nprefix {} suffix\n", long))]);
    fs::write(tmp.path().join("terms.txt"), format!("a.com\n{}\n", long)).unwrap();
    let terms = tmp.path().join("terms.txt");

    let report = run_scan(
        &config(&tmp, terms.to_str().unwrap()),
        &CancelToken::new(),
        &NoProgress,
    )
    .unwrap();

    assert_eq!(report.summary.outputs_failed, 0);
    let path = report.records[1].output.clone().unwrap();
    assert!(path.file_name().unwrap().len() < 255);
    let text = fs::read_to_string(path).unwrap();
    assert!(text.starts_with(&format!("# Results for: {}\n", long)));
    assert!(export(&tmp).join("run.json").is_file());
}

#[test]
fn test_terms_sharing_a_file_name_do_not_overwrite() {
    let tmp = TempDir::new().unwrap();
    corpus(tmp.path(), &[("a.txt", "path a/b here\nother a_b here\n")]);
    fs::write(tmp.path().join("terms.txt"), "a/b\na_b\n").unwrap();
    let terms = tmp.path().join("terms.txt");

    let report = run_scan(
        &config(&tmp, terms.to_str().unwrap()),
        &CancelToken::new(),
        &NoProgress,
    )
    .unwrap();

    let first = report.records[0].output.clone().unwrap();
    let second = report.records[1].output.clone().unwrap();
    assert_ne!(first, second);
    assert_eq!(
        fs::read_to_string(first).unwrap(),
        "# Results for: a/b\npath a/b here\n"
    );
    assert_eq!(
        fs::read_to_string(second).unwrap(),
        "# Results for: a_b\nother a_b here\n"
    );
}
