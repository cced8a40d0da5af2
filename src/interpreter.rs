use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::io::Write;
use std::mem;
use std::rc::Rc;

use crate::class::Class;
use crate::environment::Environment;
use crate::error::{Error, Interrupt, RuntimeError};
use crate::expr::{Expr, ExprVisitor};
use crate::function::{Function, NativeFunction};
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::{Stmt, StmtVisitor};
use crate::token::{Token, Kind};

/// Evaluates resolved statements by walking the AST.
///
/// The interpreter owns the global environment, the currently active
/// environment and the resolution map produced by the resolver. Print output
/// goes to an injected writer so that callers (and tests) can capture it.
pub struct Interpreter<'a> {
    pub globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<Token, usize>,
    interactive: bool,
    output: &'a mut dyn Write,
}

impl<'a> Interpreter<'a> {
    pub fn new(output: &'a mut dyn Write) -> Self {
        let globals = Rc::new(RefCell::new(Environment::default()));

        for native in NativeFunction::get_globals() {
            let name = native.name.lexeme.clone();
            globals.borrow_mut().define(&name, Object::from(native));
        }

        Interpreter {
            globals: Rc::clone(&globals),
            environment: globals,
            locals: HashMap::new(),
            interactive: false,
            output,
        }
    }

    /// Sets the interactive mode. When set, expression statements print their value.
    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    /// Interprets a batch of statements. A runtime error aborts the batch.
    pub fn interpret(&mut self, statements: &[Stmt]) {
        for statement in statements {
            match self.execute(statement) {
                Ok(()) => (),
                Err(Interrupt::Error(error)) => {
                    error.throw();
                    return;
                },
                // The resolver rejects `return` outside of a function.
                Err(Interrupt::Return(_)) => unreachable!(),
            }
        }
    }

    /// Records the resolved scope distance for a variable reference.
    pub fn resolve(&mut self, name: &Token, depth: usize) {
        self.locals.insert(name.clone(), depth);
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<(), Interrupt> {
        stmt.accept(self)
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        expr.accept(self)
    }

    /// Executes statements with `environment` as the active environment.
    /// The previous environment is restored on every exit path, including a
    /// non-local return.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> Result<(), Interrupt> {
        let previous = mem::replace(&mut self.environment, environment);

        let mut result = Ok(());
        for statement in statements {
            result = self.execute(statement);
            if result.is_err() {
                break;
            }
        }

        self.environment = previous;
        result
    }

    /// Reads a variable from its resolved scope, or from globals if unresolved.
    fn look_up_variable(&self, name: &Token) -> Result<Object, RuntimeError> {
        match self.locals.get(name) {
            Some(distance) => self.environment.borrow().get_at(*distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    /// Checks the arity and invokes the callable.
    fn invoke(
        &mut self,
        callable: &dyn Callable,
        arguments: Vec<Object>,
        paren: &Token,
    ) -> Result<Object, RuntimeError> {
        if arguments.len() != callable.arity() {
            return Err(RuntimeError {
                token: paren.clone(),
                message: format!(
                    "Expected {} arguments but got {}",
                    callable.arity(),
                    arguments.len()
                ),
            });
        }

        callable.call(self, arguments)
    }
}

impl<'a> ExprVisitor<Result<Object, RuntimeError>> for Interpreter<'a> {
    fn visit_assign_expr(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        let Expr::Assign(assign) = expr else { unreachable!() };

        let value = self.evaluate(&assign.value)?;

        match self.locals.get(&assign.name) {
            Some(distance) => {
                self.environment.borrow_mut().assign_at(*distance, &assign.name, value.clone());
            },
            None => self.globals.borrow_mut().assign(&assign.name, value.clone())?,
        }

        Ok(value)
    }

    fn visit_binary_expr(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        let Expr::Binary(binary) = expr else { unreachable!() };

        let left = self.evaluate(&binary.left)?;
        let right = self.evaluate(&binary.right)?;

        let operator = &binary.operator;
        let types = (left.type_str().to_owned(), right.type_str().to_owned());

        let result = match operator.kind {
            Kind::EqualEqual => Some(Object::from(left == right)),
            Kind::BangEqual => Some(Object::from(left != right)),
            Kind::Greater => left.partial_cmp(&right)
                .map(|ordering| Object::from(ordering == Ordering::Greater)),
            Kind::GreaterEqual => left.partial_cmp(&right)
                .map(|ordering| Object::from(ordering != Ordering::Less)),
            Kind::Less => left.partial_cmp(&right)
                .map(|ordering| Object::from(ordering == Ordering::Less)),
            Kind::LessEqual => left.partial_cmp(&right)
                .map(|ordering| Object::from(ordering != Ordering::Greater)),
            Kind::Slash => {
                if let (
                    Object::Literal(Literal::Number(_)),
                    Object::Literal(Literal::Number(divisor)),
                ) = (&left, &right)
                {
                    if *divisor == 0.0 {
                        return Err(RuntimeError {
                            token: operator.clone(),
                            message: "Division by zero".to_string(),
                        });
                    }
                }

                left / right
            },
            Kind::Star => left * right,
            Kind::Minus => left - right,
            Kind::Plus => left + right,
            _ => unreachable!(),
        };

        result.ok_or_else(|| RuntimeError {
            token: operator.clone(),
            message: format!(
                "Binary operation '{}' is not supported between {} type and {} type",
                operator.lexeme, types.0, types.1
            ),
        })
    }

    fn visit_call_expr(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        let Expr::Call(call) = expr else { unreachable!() };

        let callee = self.evaluate(&call.callee)?;

        let mut arguments = Vec::with_capacity(call.arguments.len());
        for argument in &call.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        match callee {
            Object::Function(ref function) => self.invoke(function, arguments, &call.paren),
            Object::NativeFunction(ref function) => self.invoke(function, arguments, &call.paren),
            Object::Class(ref class) => {
                let class = Rc::clone(class);
                let class = class.borrow();
                self.invoke(&*class, arguments, &call.paren)
            },
            _ => Err(RuntimeError {
                token: call.paren.clone(),
                message: "Can only call functions and classes".to_string(),
            }),
        }
    }

    fn visit_get_expr(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        let Expr::Get(get) = expr else { unreachable!() };

        let object = self.evaluate(&get.object)?;

        if let Object::Instance(ref instance) = object {
            return instance.borrow().get(&get.name, &object);
        }

        Err(RuntimeError {
            token: get.name.clone(),
            message: "Only instances have properties".to_string(),
        })
    }

    fn visit_grouping_expr(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        let Expr::Grouping(grouping) = expr else { unreachable!() };

        self.evaluate(&grouping.expr)
    }

    fn visit_literal_expr(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        let Expr::Literal(literal) = expr else { unreachable!() };

        Ok(Object::from(literal.clone()))
    }

    fn visit_logical_expr(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        let Expr::Logical(logical) = expr else { unreachable!() };

        let left = self.evaluate(&logical.left)?;

        // Short-circuit: the result is the operand itself, not a coerced boolean.
        match logical.operator.kind {
            Kind::Or if left.as_bool() => Ok(left),
            Kind::And if !left.as_bool() => Ok(left),
            _ => self.evaluate(&logical.right),
        }
    }

    fn visit_set_expr(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        let Expr::Set(set) = expr else { unreachable!() };

        let object = self.evaluate(&set.object)?;

        let Object::Instance(instance) = object else {
            return Err(RuntimeError {
                token: set.name.clone(),
                message: "Only instances have fields".to_string(),
            });
        };

        let value = self.evaluate(&set.value)?;
        instance.borrow_mut().set(&set.name, value.clone());

        Ok(value)
    }

    fn visit_super_expr(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        let Expr::Super(super_expr) = expr else { unreachable!() };

        let distance = *self.locals.get(&super_expr.keyword)
            .expect("'super' to be resolved");

        // `super` lives at the resolved distance and the receiver one scope below.
        let superclass = self.environment.borrow().get_at(distance, &super_expr.keyword)?;
        let object = self.environment.borrow().get_at(distance - 1, &Token::synthetic("this"))?;

        let Object::Class(superclass) = superclass else {
            unreachable!("'super' to be bound to a class");
        };

        let method = superclass.borrow().find_method(&super_expr.method.lexeme)
            .ok_or_else(|| RuntimeError {
                token: super_expr.method.clone(),
                message: format!("Undefined property '{}'", super_expr.method.lexeme),
            })?;

        Ok(Object::from(method.bind(object)))
    }

    fn visit_this_expr(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        let Expr::This(this) = expr else { unreachable!() };

        self.look_up_variable(&this.keyword)
    }

    fn visit_unary_expr(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        let Expr::Unary(unary) = expr else { unreachable!() };

        let right = self.evaluate(&unary.expr)?;

        match unary.operator.kind {
            Kind::Minus => match right {
                Object::Literal(Literal::Number(number)) => Ok(Object::from(-number)),
                _ => Err(RuntimeError {
                    token: unary.operator.clone(),
                    message: format!(
                        "Unary operation '-' is not supported on {} type",
                        right.type_str()
                    ),
                }),
            },
            Kind::Bang => Ok(Object::from(!right.as_bool())),
            _ => unreachable!(),
        }
    }

    fn visit_variable_expr(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        let Expr::Variable(variable) = expr else { unreachable!() };

        self.look_up_variable(&variable.name)
    }
}

impl<'a> StmtVisitor<Result<(), Interrupt>> for Interpreter<'a> {
    fn visit_block_stmt(&mut self, stmt: &Stmt) -> Result<(), Interrupt> {
        let Stmt::Block(block) = stmt else { unreachable!() };

        let environment = Environment::new(Some(Rc::clone(&self.environment)));
        self.execute_block(&block.statements, Rc::new(RefCell::new(environment)))
    }

    fn visit_class_stmt(&mut self, stmt: &Stmt) -> Result<(), Interrupt> {
        let Stmt::Class(class_stmt) = stmt else { unreachable!() };

        let superclass = match &class_stmt.superclass {
            Some(expr) => {
                let Expr::Variable(variable) = expr else { unreachable!() };

                match self.evaluate(expr)? {
                    Object::Class(class) => Some(class),
                    _ => {
                        return Err(Interrupt::Error(RuntimeError {
                            token: variable.name.clone(),
                            message: "Superclass must be a class".to_string(),
                        }));
                    },
                }
            },
            None => None,
        };

        // Two-stage binding lets methods refer to the class by name.
        self.environment.borrow_mut()
            .define(&class_stmt.name.lexeme, Object::from(Literal::Nil));

        let previous = match &superclass {
            Some(class) => {
                let mut environment = Environment::new(Some(Rc::clone(&self.environment)));
                environment.define("super", Object::from(Rc::clone(class)));

                Some(mem::replace(
                    &mut self.environment,
                    Rc::new(RefCell::new(environment)),
                ))
            },
            None => None,
        };

        let mut methods = HashMap::new();
        for method in &class_stmt.methods {
            let Stmt::Function(function) = method else { unreachable!() };

            let is_initializer = function.name.lexeme == "init";
            methods.insert(
                function.name.lexeme.clone(),
                Function::new(function, Rc::clone(&self.environment), is_initializer),
            );
        }

        let class = Rc::new(RefCell::new(Class::new(
            class_stmt.name.lexeme.clone(),
            superclass,
            methods,
        )));

        if let Some(previous) = previous {
            self.environment = previous;
        }

        self.environment.borrow_mut().assign(&class_stmt.name, Object::from(class))?;

        Ok(())
    }

    fn visit_expression_stmt(&mut self, stmt: &Stmt) -> Result<(), Interrupt> {
        let Stmt::Expression(expression) = stmt else { unreachable!() };

        let value = self.evaluate(&expression.expr)?;

        if self.interactive {
            let _ = writeln!(self.output, "{value}");
        }

        Ok(())
    }

    fn visit_function_stmt(&mut self, stmt: &Stmt) -> Result<(), Interrupt> {
        let Stmt::Function(function) = stmt else { unreachable!() };

        let value = Function::new(function, Rc::clone(&self.environment), false);
        self.environment.borrow_mut().define(&function.name.lexeme, Object::from(value));

        Ok(())
    }

    fn visit_if_stmt(&mut self, stmt: &Stmt) -> Result<(), Interrupt> {
        let Stmt::If(if_stmt) = stmt else { unreachable!() };

        if self.evaluate(&if_stmt.condition)?.as_bool() {
            self.execute(&if_stmt.then_branch)?;
        } else if let Some(else_branch) = &if_stmt.else_branch {
            self.execute(else_branch)?;
        }

        Ok(())
    }

    fn visit_print_stmt(&mut self, stmt: &Stmt) -> Result<(), Interrupt> {
        let Stmt::Print(print) = stmt else { unreachable!() };

        let value = self.evaluate(&print.expr)?;
        let _ = writeln!(self.output, "{value}");

        Ok(())
    }

    fn visit_return_stmt(&mut self, stmt: &Stmt) -> Result<(), Interrupt> {
        let Stmt::Return(return_stmt) = stmt else { unreachable!() };

        let value = match &return_stmt.value {
            Some(value) => self.evaluate(value)?,
            None => Object::from(Literal::Nil),
        };

        Err(Interrupt::Return(value))
    }

    fn visit_var_stmt(&mut self, stmt: &Stmt) -> Result<(), Interrupt> {
        let Stmt::Var(var) = stmt else { unreachable!() };

        let value = match &var.initializer {
            Some(initializer) => self.evaluate(initializer)?,
            None => Object::from(Literal::Nil),
        };

        self.environment.borrow_mut().define(&var.name.lexeme, value);

        Ok(())
    }

    fn visit_while_stmt(&mut self, stmt: &Stmt) -> Result<(), Interrupt> {
        let Stmt::While(while_stmt) = stmt else { unreachable!() };

        while self.evaluate(&while_stmt.condition)?.as_bool() {
            self.execute(&while_stmt.body)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::token::Location;

    fn token(kind: Kind, lexeme: &str) -> Token {
        Token::new(kind, lexeme.to_string(), None, Location::new(1, 1))
    }

    fn number(n: f64) -> Expr {
        Expr::Literal(Literal::Number(n))
    }

    fn binary(left: Expr, kind: Kind, lexeme: &str, right: Expr) -> Expr {
        Expr::Binary(crate::expr::BinaryData {
            left: Box::new(left),
            operator: token(kind, lexeme),
            right: Box::new(right),
        })
    }

    #[test]
    fn evaluate_literal() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let expr = Expr::Literal(Literal::Nil);
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(Literal::Nil));
    }

    #[test]
    fn evaluate_arithmetic() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let expr = binary(
            number(6.0),
            Kind::Star,
            "*",
            binary(number(1.0), Kind::Plus, "+", number(0.5)),
        );
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(9.0));
    }

    #[test]
    fn evaluate_string_concat() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let expr = binary(
            Expr::Literal(Literal::from("Hello")),
            Kind::Plus,
            "+",
            Expr::Literal(Literal::from("World")),
        );
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from("HelloWorld"));
    }

    #[test]
    fn add_mismatched_types_is_an_error() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let expr = binary(
            Expr::Literal(Literal::from("Hello")),
            Kind::Plus,
            "+",
            number(1.0),
        );

        let error = interpreter.evaluate(&expr).unwrap_err();
        assert_eq!(
            error.message,
            "Binary operation '+' is not supported between string type and number type"
        );
    }

    #[test]
    fn divide_by_zero_is_an_error() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let expr = binary(number(1.0), Kind::Slash, "/", number(0.0));

        let error = interpreter.evaluate(&expr).unwrap_err();
        assert_eq!(error.message, "Division by zero");
    }

    #[test]
    fn comparison_requires_numbers() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let less = binary(number(1.0), Kind::Less, "<", number(2.0));
        assert_eq!(interpreter.evaluate(&less).unwrap(), Object::from(true));

        let invalid = binary(
            Expr::Literal(Literal::from("a")),
            Kind::Less,
            "<",
            Expr::Literal(Literal::from("b")),
        );
        assert!(interpreter.evaluate(&invalid).is_err());
    }

    #[test]
    fn equality_never_errors() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let nils = binary(
            Expr::Literal(Literal::Nil),
            Kind::EqualEqual,
            "==",
            Expr::Literal(Literal::Nil),
        );
        assert_eq!(interpreter.evaluate(&nils).unwrap(), Object::from(true));

        let mixed = binary(Expr::Literal(Literal::Nil), Kind::EqualEqual, "==", number(0.0));
        assert_eq!(interpreter.evaluate(&mixed).unwrap(), Object::from(false));
    }

    #[test]
    fn logical_returns_the_operand() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let expr = Expr::Logical(crate::expr::LogicalData {
            left: Box::new(Expr::Literal(Literal::Nil)),
            operator: token(Kind::Or, "or"),
            right: Box::new(Expr::Literal(Literal::from("fallback"))),
        });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from("fallback"));

        let expr = Expr::Logical(crate::expr::LogicalData {
            left: Box::new(number(1.0)),
            operator: token(Kind::Or, "or"),
            right: Box::new(Expr::Literal(Literal::from("unused"))),
        });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(1.0));
    }

    #[test]
    fn unary_operators() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let negate = Expr::Unary(crate::expr::UnaryData {
            operator: token(Kind::Minus, "-"),
            expr: Box::new(number(2.0)),
        });
        assert_eq!(interpreter.evaluate(&negate).unwrap(), Object::from(-2.0));

        let not = Expr::Unary(crate::expr::UnaryData {
            operator: token(Kind::Bang, "!"),
            expr: Box::new(Expr::Literal(Literal::Nil)),
        });
        assert_eq!(interpreter.evaluate(&not).unwrap(), Object::from(true));

        let invalid = Expr::Unary(crate::expr::UnaryData {
            operator: token(Kind::Minus, "-"),
            expr: Box::new(Expr::Literal(Literal::from("a"))),
        });
        assert!(interpreter.evaluate(&invalid).is_err());
    }

    #[test]
    fn clock_is_installed() {
        let mut output = Vec::new();
        let interpreter = Interpreter::new(&mut output);

        let clock = interpreter.globals.borrow().get(&Token::synthetic("clock")).unwrap();
        assert_eq!(clock.type_str(), "native function");
    }
}
