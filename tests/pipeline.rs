use std::{fs, path::PathBuf};

use tiercc::driver::{self, DriverError, Options, Stage};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tiercc-{}-{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn options(dir: &PathBuf, source: &str, stage: Stage) -> Options {
    fs::create_dir_all(dir).expect("scratch directory should be creatable");
    let input_file = dir.join("input.c");
    fs::write(&input_file, source).expect("source should be writable");

    Options {
        stage,
        input_file,
        output_dir: dir.join("out"),
        verbose: false,
        help: false,
    }
}

const ALL_ARTIFACTS: [&str; 8] = [
    driver::TOKENS_TEXT,
    driver::TOKENS_JSON,
    driver::AST_TEXT,
    driver::AST_DOT,
    driver::AST_JSON,
    driver::TAC,
    driver::STACK_CODE,
    driver::TARGET_CODE,
];

#[test]
fn compile_writes_every_artifact() {
    let dir = scratch_dir("full");
    let opts = options(
        &dir,
        "int main() {\n  int x = 10;\n  return x;\n}\n",
        Stage::Compile,
    );

    driver::compile(&opts).expect("compilation should succeed");

    for name in ALL_ARTIFACTS {
        assert!(opts.output_dir.join(name).is_file(), "{name} is missing");
    }

    let tac = fs::read_to_string(opts.output_dir.join(driver::TAC)).unwrap();
    assert_eq!(tac, "function main:\nt0 = 10\nx = t0\nreturn x\nend function\n\n");

    let stack = fs::read_to_string(opts.output_dir.join(driver::STACK_CODE)).unwrap();
    assert_eq!(stack, "FUNC main\nPUSH 10\nSTORE x\nLOAD x\nRET\nEND_FUNC\n\n");

    let ast = fs::read_to_string(opts.output_dir.join(driver::AST_TEXT)).unwrap();
    assert!(ast.starts_with("PROGRAM\n  FUNCTION_DECL (main)\n"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn lex_stage_stops_after_tokens() {
    let dir = scratch_dir("lex");
    let opts = options(&dir, "int main() { return 0; }", Stage::Lex);

    driver::compile(&opts).expect("lexing never fails");

    assert!(opts.output_dir.join(driver::TOKENS_TEXT).is_file());
    assert!(opts.output_dir.join(driver::TOKENS_JSON).is_file());
    assert!(!opts.output_dir.join(driver::AST_TEXT).exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_stage_stops_after_ast() {
    let dir = scratch_dir("parse");
    let opts = options(&dir, "int main() { return 0; }", Stage::Parse);

    driver::compile(&opts).expect("the program is valid");

    assert!(opts.output_dir.join(driver::AST_JSON).is_file());
    assert!(!opts.output_dir.join(driver::TAC).exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn syntax_error_fails_without_code() {
    let dir = scratch_dir("error");
    let opts = options(&dir, "int f( { }", Stage::Compile);

    let result = driver::compile(&opts);

    assert!(matches!(result, Err(DriverError::Parser(_))));
    assert!(opts.output_dir.join(driver::TOKENS_TEXT).is_file());
    assert!(!opts.output_dir.join(driver::TAC).exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_input_is_reported() {
    let dir = scratch_dir("missing");
    let opts = Options {
        stage: Stage::Compile,
        input_file: dir.join("does-not-exist.c"),
        output_dir: dir.join("out"),
        verbose: false,
        help: false,
    };

    assert!(matches!(
        driver::compile(&opts),
        Err(DriverError::Read { .. })
    ));
}
