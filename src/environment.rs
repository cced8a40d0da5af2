use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::object::Object;
use crate::token::Token;

/// A mapping from identifiers to values, chained to an optional enclosing
/// environment. Environments are shared by reference: a closure keeps its
/// defining environment alive, so the chain forms a DAG rooted at the
/// interpreter's globals and never a cycle.
#[derive(Debug, Clone)]
pub struct Environment {
    pub enclosing: Option<Rc<RefCell<Environment>>>,
    pub variables: HashMap<String, Object>,
}

impl Environment {
    pub fn new(enclosing: Option<Rc<RefCell<Environment>>>) -> Self {
        Environment {
            enclosing,
            variables: HashMap::new(),
        }
    }

    /// Defines (or redefines) a name in this environment.
    pub fn define(&mut self, name: &str, value: Object) {
        self.variables.insert(name.to_string(), value);
    }

    /// Walks up the chain to the environment `distance` hops away.
    /// The resolver proved the ancestor exists; a missing one is an internal error.
    fn ancestor(&self, distance: usize) -> Rc<RefCell<Environment>> {
        let parent = self.enclosing.clone()
            .unwrap_or_else(|| panic!("enclosing environment to exist at depth {}", 1));
        let mut environment = Rc::clone(&parent);

        for i in 1..distance {
            let parent = environment.borrow().enclosing.clone()
                .unwrap_or_else(|| panic!("enclosing environment to exist at depth {}", i));
            environment = Rc::clone(&parent);
        }

        environment
    }

    /// Assigns to an existing name, walking up the chain.
    pub fn assign(&mut self, name: &Token, value: Object) -> Result<(), RuntimeError> {
        if self.variables.contains_key(&name.lexeme) {
            self.variables.insert(name.lexeme.clone(), value);
            return Ok(());
        }

        if let Some(enclosing) = &mut self.enclosing {
            return enclosing.borrow_mut().assign(name, value);
        }

        Err(RuntimeError {
            token: name.clone(),
            message: format!("Undefined variable '{}'", name.lexeme),
        })
    }

    /// Assigns to a name at a resolved distance.
    pub fn assign_at(&mut self, distance: usize, name: &Token, value: Object) {
        if distance > 0 {
            self.ancestor(distance).borrow_mut().variables.insert(name.lexeme.clone(), value);
        } else {
            self.variables.insert(name.lexeme.clone(), value);
        }
    }

    /// Looks up a name, walking up the chain.
    pub fn get(&self, name: &Token) -> Result<Object, RuntimeError> {
        if let Some(variable) = self.variables.get(&name.lexeme) {
            return Ok(variable.clone());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow().get(name);
        }

        Err(RuntimeError {
            token: name.clone(),
            message: format!("Undefined variable '{}'", name.lexeme),
        })
    }

    /// Looks up a name at a resolved distance.
    pub fn get_at(&self, distance: usize, name: &Token) -> Result<Object, RuntimeError> {
        if distance > 0 {
            match self.ancestor(distance).borrow().variables.get(&name.lexeme) {
                Some(variable) => Ok(variable.clone()),
                None => Err(RuntimeError {
                    token: name.clone(),
                    message: format!("Undefined variable '{}'", name.lexeme),
                }),
            }
        } else {
            match self.variables.get(&name.lexeme) {
                Some(variable) => Ok(variable.clone()),
                None => Err(RuntimeError {
                    token: name.clone(),
                    message: format!("Undefined variable '{}'", name.lexeme),
                }),
            }
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::literal::Literal;

    #[test]
    fn define_and_get() {
        let mut environment = Environment::default();
        environment.define("a", Object::from(1.0));

        assert_eq!(environment.get(&Token::synthetic("a")).unwrap(), Object::from(1.0));
        assert!(environment.get(&Token::synthetic("b")).is_err());
    }

    #[test]
    fn define_overwrites() {
        let mut environment = Environment::default();
        environment.define("a", Object::from(1.0));
        environment.define("a", Object::from("shadow"));

        assert_eq!(environment.get(&Token::synthetic("a")).unwrap(), Object::from("shadow"));
    }

    #[test]
    fn get_walks_the_chain() {
        let globals = Rc::new(RefCell::new(Environment::default()));
        globals.borrow_mut().define("a", Object::from("global"));

        let local = Environment::new(Some(Rc::clone(&globals)));
        assert_eq!(local.get(&Token::synthetic("a")).unwrap(), Object::from("global"));
    }

    #[test]
    fn assign_targets_the_declaring_scope() {
        let globals = Rc::new(RefCell::new(Environment::default()));
        globals.borrow_mut().define("a", Object::from(1.0));

        let mut local = Environment::new(Some(Rc::clone(&globals)));
        local.assign(&Token::synthetic("a"), Object::from(2.0)).unwrap();

        assert_eq!(globals.borrow().get(&Token::synthetic("a")).unwrap(), Object::from(2.0));
        assert!(local.assign(&Token::synthetic("missing"), Object::from(Literal::Nil)).is_err());
    }

    #[test]
    fn get_at_reads_the_resolved_scope() {
        let globals = Rc::new(RefCell::new(Environment::default()));
        globals.borrow_mut().define("a", Object::from("outer"));

        let mut inner = Environment::new(Some(Rc::clone(&globals)));
        inner.define("a", Object::from("inner"));

        assert_eq!(inner.get_at(0, &Token::synthetic("a")).unwrap(), Object::from("inner"));
        assert_eq!(inner.get_at(1, &Token::synthetic("a")).unwrap(), Object::from("outer"));
    }

    #[test]
    fn assign_at_writes_the_resolved_scope() {
        let globals = Rc::new(RefCell::new(Environment::default()));
        globals.borrow_mut().define("a", Object::from("outer"));

        let mut inner = Environment::new(Some(Rc::clone(&globals)));
        inner.define("a", Object::from("inner"));
        inner.assign_at(1, &Token::synthetic("a"), Object::from("changed"));

        assert_eq!(inner.get_at(0, &Token::synthetic("a")).unwrap(), Object::from("inner"));
        assert_eq!(globals.borrow().get(&Token::synthetic("a")).unwrap(), Object::from("changed"));
    }
}
