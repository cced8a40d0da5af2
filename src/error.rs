use std::sync::atomic::{AtomicBool, Ordering};

use crate::object::Object;
use crate::token::{Location, Token, Kind};

static HAD_ERROR: AtomicBool = AtomicBool::new(false);
static HAD_RUNTIME_ERROR: AtomicBool = AtomicBool::new(false);

/// Checks if an error occurred during scanning, parsing, resolving or interpreting.
pub fn did_error() -> bool {
    HAD_ERROR.load(Ordering::Relaxed) || HAD_RUNTIME_ERROR.load(Ordering::Relaxed)
}

/// Checks if an error occurred during runtime.
pub fn did_runtime_error() -> bool {
    HAD_RUNTIME_ERROR.load(Ordering::Relaxed)
}

/// Resets the error flags.
/// This is used to reset the interpreter after an error occurs when running prompts.
pub fn reset_error() {
    HAD_ERROR.store(false, Ordering::Relaxed);
    HAD_RUNTIME_ERROR.store(false, Ordering::Relaxed);
}

/// Every error type must implement this trait.
pub trait Error {
    /// Prints the error message to stderr and sets the error flag.
    fn throw(&self);
}

/// Represents an error that occurs during scanning.
#[derive(Debug)]
pub struct ScanError {
    pub location: Location,
    pub message: String,
}

impl Error for ScanError {
    fn throw(&self) {
        eprintln!(
            "[line {location}] Error: {message}",
            location = self.location,
            message = self.message
        );

        HAD_ERROR.store(true, Ordering::Relaxed);
    }
}

/// Represents an error that occurs during parsing.
#[derive(Debug)]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl Error for ParseError {
    fn throw(&self) {
        if self.token.kind == Kind::EOF {
            eprintln!(
                "[line {location}] Error at end: {message}",
                location = self.token.location,
                message = self.message
            );
        } else {
            eprintln!(
                "[line {location}] Error at '{lexeme}': {message}",
                location = self.token.location,
                lexeme = self.token.lexeme,
                message = self.message
            );
        }

        HAD_ERROR.store(true, Ordering::Relaxed);
    }
}

/// Represents an error that occurs during resolution.
#[derive(Debug)]
pub struct ResolveError {
    pub token: Token,
    pub message: String,
}

impl Error for ResolveError {
    fn throw(&self) {
        eprintln!(
            "[line {location}] Error at '{lexeme}': {message}",
            location = self.token.location,
            lexeme = self.token.lexeme,
            message = self.message
        );

        HAD_ERROR.store(true, Ordering::Relaxed);
    }
}

/// Represents an error that occurs during runtime.
#[derive(Debug)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl Error for RuntimeError {
    fn throw(&self) {
        eprintln!(
            "[line {location}] Error at '{lexeme}': {message}",
            location = self.token.location,
            lexeme = self.token.lexeme,
            message = self.message
        );

        HAD_RUNTIME_ERROR.store(true, Ordering::Relaxed);
    }
}

/// Represents a non-local exit bubbling through statement execution.
/// A `return` statement unwinds as `Interrupt::Return` until the nearest function
/// call catches it and turns it back into that call's result. Runtime errors ride
/// the same channel so that `?` propagates both with one type.
#[derive(Debug)]
pub enum Interrupt {
    Return(Object),
    Error(RuntimeError),
}

impl From<RuntimeError> for Interrupt {
    fn from(error: RuntimeError) -> Self {
        Interrupt::Error(error)
    }
}
