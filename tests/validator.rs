use envloader::{Dotenv, Error};
use tempfile::TempDir;

fn loaded(content: &str) -> (TempDir, Dotenv) {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join(".env"), content).expect("write .env");
    let mut dotenv = Dotenv::create([dir.path()], None);
    dotenv.load().expect("load should succeed");
    (dir, dotenv)
}

#[test]
fn chained_assertions_pass_on_valid_file() {
    let (_dir, dotenv) = loaded("PORT=8080\nDEBUG=On\nMODE=prod\n");

    dotenv
        .required(["PORT"])
        .and_then(|v| v.not_empty())
        .and_then(|v| v.is_integer())
        .expect("PORT should validate");
    dotenv
        .required(["DEBUG"])
        .and_then(|v| v.is_boolean())
        .expect("DEBUG should validate");
    dotenv
        .required(["MODE"])
        .and_then(|v| v.allowed_values(["dev", "prod"]))
        .expect("MODE should validate");
}

#[test]
fn reports_all_failures_in_one_error() {
    let (_dir, dotenv) = loaded("A=\nB=  \nC=x\n");

    let err = dotenv
        .required(["A", "B", "C"])
        .and_then(|v| v.not_empty())
        .expect_err("expected failure");

    assert_eq!(err.failures, vec!["A is empty", "B is empty"]);
    assert_eq!(
        err.to_string(),
        "one or more environment variables failed assertions: A is empty, B is empty"
    );
}

#[test]
fn missing_names_fail_before_other_assertions() {
    let (_dir, dotenv) = loaded("PRESENT=1\n");

    let err = match dotenv.required(["PRESENT", "ABSENT"]) {
        Ok(_) => panic!("expected missing variable"),
        Err(err) => err,
    };
    assert_eq!(err.failures, vec!["ABSENT is missing"]);

    let err: Error = err.into();
    assert!(!err.is_path_error());
}

#[test]
fn allowed_values_lists_choices() {
    let (_dir, dotenv) = loaded("LEVEL=verbose\n");

    let err = dotenv
        .required(["LEVEL"])
        .and_then(|v| v.allowed_values(["info", "warn"]))
        .expect_err("expected failure");
    assert_eq!(err.failures, vec!["LEVEL is not one of [info, warn]"]);
}
