//! A tree-walk interpreter for Lox, a small dynamically typed language with
//! first-class functions, lexical scoping, classes and single inheritance.
//!
//! The pipeline is strictly sequential: source text is scanned into tokens,
//! parsed into an abstract syntax tree, resolved into a variable-depth map
//! and finally evaluated against a live environment chain.
//!
//! ## Scanning
//! The [`scanner`] turns a string of characters into a flat list of tokens,
//! reporting lexical problems like unterminated strings or stray characters
//! as a [`ScanError`](error::ScanError). Scanning continues past an error so
//! that one run surfaces as many problems as possible, but a failed scan
//! stops the pipeline before parsing.
//!
//! ## Parsing
//! The [`parser`] is a hand-written recursive descent parser with one token
//! of lookahead. It builds [`Expr`](expr::Expr) and [`Stmt`](stmt::Stmt)
//! trees and reports grammar violations as a [`ParseError`](error::ParseError).
//! On an error inside a declaration it synchronizes to the next likely
//! statement boundary and keeps going, so a single run can report several
//! independent mistakes.
//!
//! ## Resolving
//! The [`resolver`] is a static pre-pass over the parsed tree. It computes,
//! for every variable reference, how many scopes lie between the reference
//! and the declaration it binds to, and it rejects code that is
//! syntactically fine but semantically broken, like `return` at the top
//! level or a class inheriting from itself, as a
//! [`ResolveError`](error::ResolveError).
//!
//! ## Interpreting
//! The [`interpreter`] walks the resolved tree and evaluates it. Runtime
//! failures such as type mismatches on operators, undefined variables or
//! calling a value that is not callable surface as a
//! [`RuntimeError`](error::RuntimeError) and abort the current batch. The
//! environment chain that backs lexical scoping lives in [`environment`];
//! values, callables and class machinery in [`object`], [`function`] and
//! [`class`].

use std::io::Write;
use std::{fs, process};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

pub mod ast;
pub mod class;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod literal;
pub mod object;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;

use interpreter::Interpreter;
use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;

/// The interpreter driver: owns one [`Interpreter`] and runs source through
/// the scan → parse → resolve → interpret pipeline. Print output goes to the
/// injected writer; diagnostics go to stderr and raise the error flags that
/// the binary turns into exit codes.
pub struct Lox<'a> {
    interpreter: Interpreter<'a>,
}

impl<'a> Lox<'a> {
    pub fn new(output: &'a mut dyn Write) -> Self {
        Lox {
            interpreter: Interpreter::new(output),
        }
    }

    /// Runs a script file.
    pub fn run_file(&mut self, path: &str) {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) => {
                eprintln!("Could not read {path}: {error}");
                process::exit(74);
            },
        };

        self.run(&contents);
    }

    /// Runs an interactive prompt until end of input, interrupt or an exit command.
    pub fn run_prompt(&mut self) {
        let mut editor = match DefaultEditor::new() {
            Ok(editor) => editor,
            Err(error) => {
                eprintln!("Could not start the prompt: {error}");
                return;
            },
        };

        let history = home::home_dir().map(|dir| dir.join(".rlox_history"));
        if let Some(path) = &history {
            let _ = editor.load_history(path);
        }

        self.interpreter.set_interactive(true);

        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let line = line.trim();

                    if line == "exit!" || line == "quit!" {
                        break;
                    }

                    if line.is_empty() {
                        continue;
                    }

                    let _ = editor.add_history_entry(line);
                    self.run(line);

                    // A failed line should not poison the next one.
                    error::reset_error();
                },
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(error) => {
                    eprintln!("{error}");
                    break;
                },
            }
        }

        if let Some(path) = &history {
            let _ = editor.save_history(path);
        }
    }

    /// Runs a batch of source through the pipeline.
    /// Each stage only runs if the previous one raised no error.
    pub fn run(&mut self, source: &str) {
        let mut scanner = Scanner::new(source);
        let tokens = scanner.scan_tokens();

        if error::did_error() {
            return;
        }

        let mut parser = Parser::new(tokens);
        let statements = parser.parse();

        if error::did_error() {
            return;
        }

        let mut resolver = Resolver::new(&mut self.interpreter);
        resolver.resolve(&statements);

        if error::did_error() {
            return;
        }

        self.interpreter.interpret(&statements);
    }
}
