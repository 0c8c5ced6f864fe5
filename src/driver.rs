use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tiercc_parser::{
    lexer::{self, Lexer},
    Parser, ParserError,
};

use crate::codegen;

pub const TOKENS_TEXT: &str = "tokens.txt";
pub const TOKENS_JSON: &str = "tokens.json";
pub const AST_TEXT: &str = "ast.txt";
pub const AST_DOT: &str = "ast.dot";
pub const AST_JSON: &str = "ast.json";
pub const TAC: &str = "tac.txt";
pub const STACK_CODE: &str = "stack_code.txt";
pub const TARGET_CODE: &str = "target_code.txt";

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Unknown argument \"{0}\", see --help")]
    UnknownArgument(String),
    #[error("Unsupported parser \"{0}\", only the recursive-descent parser (rd) is available")]
    UnsupportedParser(String),
    #[error("{0} expects a value")]
    MissingValue(&'static str),
    #[error("No input file given, use --input <file>")]
    NoInput,
    #[error("Could not read {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Could not write {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Could not create the output directory {path:?}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Parsing failed")]
    Parser(#[from] ParserError),
}

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum Stage {
    #[default]
    Compile,
    Lex,
    Parse,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Options {
    pub stage: Stage,
    pub input_file: PathBuf,
    pub output_dir: PathBuf,
    pub verbose: bool,
    pub help: bool,
}

fn print_help() {
    println!(
        "tiercc --input <file> [--output-dir <dir>] [--parser rd] [--lex | --parse] [--verbose] [--help]

  --input <file>       source file to compile
  --output-dir <dir>   where the artifacts are written (default: .)
  --parser rd          parser to use, rd (recursive descent) is the only one
  --lex                stop after writing the token files
  --parse              stop after writing the AST files
  --verbose, -v        report every stage
  --help, -h           show this message"
    );
}

fn is_flag(string: &str) -> Option<Stage> {
    match string {
        "--lex" => Some(Stage::Lex),
        "--parse" => Some(Stage::Parse),
        _ => None,
    }
}

impl Options {
    /// Parses the arguments following the executable name.
    pub fn parse_args<I>(args: I) -> Result<Self, DriverError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();

        let mut stage = Stage::default();
        let mut input_file = None;
        let mut output_dir = PathBuf::from(".");
        let mut verbose = false;
        let mut help = false;

        while let Some(arg) = args.next() {
            if let Some(found_stage) = is_flag(&arg) {
                stage = found_stage;
                continue;
            }

            match arg.as_str() {
                "--input" => {
                    let path = args.next().ok_or(DriverError::MissingValue("--input"))?;
                    input_file = Some(PathBuf::from(path));
                }
                "--output-dir" => {
                    let path = args
                        .next()
                        .ok_or(DriverError::MissingValue("--output-dir"))?;
                    output_dir = PathBuf::from(path);
                }
                "--parser" => {
                    let kind = args.next().ok_or(DriverError::MissingValue("--parser"))?;
                    if kind != "rd" {
                        return Err(DriverError::UnsupportedParser(kind));
                    }
                }
                "--verbose" | "-v" => verbose = true,
                "--help" | "-h" => help = true,
                other => return Err(DriverError::UnknownArgument(other.to_owned())),
            }
        }

        let input_file = match input_file {
            Some(input_file) => input_file,
            None if help => PathBuf::new(),
            None => return Err(DriverError::NoInput),
        };

        Ok(Self {
            stage,
            input_file,
            output_dir,
            verbose,
            help,
        })
    }

    fn log(&self, message: &str) {
        if self.verbose {
            println!("{message}");
        }
    }

    fn artifact_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }

    fn write_artifact(&self, name: &str, contents: &str) -> Result<(), DriverError> {
        let path = self.artifact_path(name);
        fs::write(&path, contents).map_err(|source| DriverError::Write {
            path: path.clone(),
            source,
        })?;
        self.log(&format!("Wrote {}", path.display()));
        Ok(())
    }

    fn create_output_dir(&self) -> Result<(), DriverError> {
        if self.output_dir.is_dir() {
            return Ok(());
        }

        fs::create_dir_all(&self.output_dir).map_err(|source| DriverError::CreateDir {
            path: self.output_dir.clone(),
            source,
        })?;
        self.log(&format!(
            "Created output directory {}",
            self.output_dir.display()
        ));
        Ok(())
    }
}

/// Runs the pipeline up to the requested stage and writes every artifact of
/// the stages that ran.
pub fn compile(opts: &Options) -> Result<(), DriverError> {
    let source = read_source(&opts.input_file)?;
    opts.create_output_dir()?;

    let tokens = Lexer::new(source).tokenize();
    opts.log(&format!("Lexed {} tokens", tokens.len()));
    opts.write_artifact(TOKENS_TEXT, &lexer::tokens_to_text(&tokens))?;
    opts.write_artifact(TOKENS_JSON, &lexer::tokens_to_json(&tokens))?;

    if let Stage::Lex = opts.stage {
        return Ok(());
    }

    let program = Parser::new(tokens).parse_program()?;
    opts.log(&format!("Parsed {} function(s)", program.child_count()));
    if program.child_count() == 0 {
        eprintln!(
            "WARN: {:?} declares no functions, the generated code will be empty",
            opts.input_file
        );
    }
    opts.write_artifact(AST_TEXT, &program.to_text())?;
    opts.write_artifact(AST_DOT, &program.to_dot())?;
    opts.write_artifact(AST_JSON, &program.to_json())?;

    if let Stage::Parse = opts.stage {
        return Ok(());
    }

    let code = codegen::code_generation(&program);
    opts.write_artifact(TAC, &code.tac.to_string())?;
    opts.write_artifact(STACK_CODE, &code.stack.to_string())?;
    opts.write_artifact(TARGET_CODE, &code.target.to_string())?;

    Ok(())
}

fn read_source(path: &Path) -> Result<String, DriverError> {
    fs::read_to_string(path).map_err(|source| DriverError::Read {
        path: path.to_owned(),
        source,
    })
}

pub fn run() -> Result<(), DriverError> {
    let opts = Options::parse_args(env::args().skip(1))?;

    if opts.help {
        print_help();
        return Ok(());
    }

    compile(&opts)?;
    println!("Compilation completed successfully.");

    Ok(())
}
