use std::cell::RefCell;
use std::fmt::{Debug, Display};
use std::rc::Rc;

use crate::environment::Environment;
use crate::error::{Interrupt, RuntimeError};
use crate::interpreter::Interpreter;
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::{FunctionData, Stmt};
use crate::token::Token;

/// Represents a user-defined function together with the environment that was
/// live at its declaration. Methods are functions whose closure additionally
/// binds `this`; the one named `init` is the class initializer.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
    pub closure: Rc<RefCell<Environment>>,
    pub is_initializer: bool,
}

impl Function {
    pub fn new(declaration: &FunctionData, closure: Rc<RefCell<Environment>>, is_initializer: bool) -> Self {
        Function {
            name: declaration.name.clone(),
            params: declaration.params.clone(),
            body: declaration.body.clone(),
            closure,
            is_initializer,
        }
    }

    /// Returns a copy of this function whose closure binds `this` to the instance.
    pub fn bind(&self, instance: Object) -> Function {
        let mut environment = Environment::new(Some(Rc::clone(&self.closure)));
        environment.define("this", instance);

        Function {
            closure: Rc::new(RefCell::new(environment)),
            ..self.clone()
        }
    }
}

impl Callable for Function {
    fn call(&self, interpreter: &mut Interpreter<'_>, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        let mut environment = Environment::new(Some(Rc::clone(&self.closure)));

        for (param, argument) in self.params.iter().zip(arguments) {
            environment.define(&param.lexeme, argument);
        }

        match interpreter.execute_block(&self.body, Rc::new(RefCell::new(environment))) {
            Ok(()) => (),
            Err(Interrupt::Return(value)) => {
                if !self.is_initializer {
                    return Ok(value);
                }
                // An initializer discards the value and falls through to `this`.
            },
            Err(Interrupt::Error(error)) => return Err(error),
        }

        if self.is_initializer {
            return self.closure.borrow().get_at(0, &Token::synthetic("this"));
        }

        Ok(Object::from(Literal::Nil))
    }

    fn arity(&self) -> usize {
        self.params.len()
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.params == other.params
            && self.body == other.body
            && Rc::ptr_eq(&self.closure, &other.closure)
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<fn {}>", self.name.lexeme)
    }
}

/// Represents a built-in function backed by a Rust function pointer.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: Token,
    pub arity: usize,
    pub function: fn(&mut Interpreter<'_>, Vec<Object>) -> Result<Object, RuntimeError>,
}

impl Callable for NativeFunction {
    fn call(&self, interpreter: &mut Interpreter<'_>, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        (self.function)(interpreter, arguments)
    }

    fn arity(&self) -> usize {
        self.arity
    }
}

impl NativeFunction {
    /// Returns the built-ins installed into the global environment.
    pub fn get_globals() -> Vec<NativeFunction> {
        vec![
            NativeFunction {
                name: Token::synthetic("clock"),
                arity: 0,
                function: |_, _| {
                    let seconds = std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .map(|elapsed| elapsed.as_secs_f64())
                        .unwrap_or(0.0);
                    Ok(Object::from(seconds))
                },
            },
        ]
    }
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Display for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native fn {}>", self.name.lexeme)
    }
}

impl Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native fn {}>", self.name.lexeme)
    }
}
