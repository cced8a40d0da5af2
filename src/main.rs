use std::io;
use std::{env, process};

use rlox_lang::{error, Lox};

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut stdout = io::stdout();
    let mut lox = Lox::new(&mut stdout);

    match args.len() {
        n if n > 2 => {
            eprintln!("Usage: rlox [script]");
            process::exit(64);
        },
        2 => lox.run_file(&args[1]),
        _ => lox.run_prompt(),
    }

    if error::did_runtime_error() {
        process::exit(70);
    }
    if error::did_error() {
        process::exit(65);
    }
}
