use crate::expr::{Expr, ExprVisitor};
use crate::stmt::{Stmt, StmtVisitor};

/// Returns a string representation of the expression in parenthesized prefix form.
macro_rules! parenthesize {
    ( $self:ident, $name:expr, $( $x:expr ),+ ) => {
        {
            let mut string = String::new();
            string += "(";
            string += $name;
            $(
                string += " ";
                string += &$x.accept($self);
            )*
            string += ")";

            string
        }
    };
}

/// Renders the AST as parenthesized prefix text, mainly for parser tests.
pub struct AstPrinter;

impl AstPrinter {
    /// Prints the expression using visitor pattern.
    pub fn print(&mut self, expr: &Expr) -> String {
        expr.accept(self)
    }

    /// Prints the statement using visitor pattern.
    pub fn print_stmt(&mut self, stmt: &Stmt) -> String {
        stmt.accept(self)
    }
}

impl ExprVisitor<String> for AstPrinter {
    fn visit_assign_expr(&mut self, expr: &Expr) -> String {
        let Expr::Assign(assign) = expr else { unreachable!() };

        parenthesize!(self, format!("= {}", assign.name.lexeme).as_str(), assign.value)
    }

    fn visit_binary_expr(&mut self, expr: &Expr) -> String {
        let Expr::Binary(binary) = expr else { unreachable!() };

        parenthesize!(self, &binary.operator.lexeme, binary.left, binary.right)
    }

    fn visit_call_expr(&mut self, expr: &Expr) -> String {
        let Expr::Call(call) = expr else { unreachable!() };

        let mut string = String::new();
        string += &call.callee.accept(self);
        string += "(";
        for argument in &call.arguments {
            string += &argument.accept(self);
            string += " ";
        }
        string = string.trim_end().to_string();
        string += ")";

        string
    }

    fn visit_get_expr(&mut self, expr: &Expr) -> String {
        let Expr::Get(get) = expr else { unreachable!() };

        parenthesize!(self, format!(". {}", get.name.lexeme).as_str(), get.object)
    }

    fn visit_grouping_expr(&mut self, expr: &Expr) -> String {
        let Expr::Grouping(grouping) = expr else { unreachable!() };

        parenthesize!(self, "group", grouping.expr)
    }

    fn visit_literal_expr(&mut self, expr: &Expr) -> String {
        let Expr::Literal(literal) = expr else { unreachable!() };

        literal.to_string()
    }

    fn visit_logical_expr(&mut self, expr: &Expr) -> String {
        let Expr::Logical(logical) = expr else { unreachable!() };

        parenthesize!(self, &logical.operator.lexeme, logical.left, logical.right)
    }

    fn visit_set_expr(&mut self, expr: &Expr) -> String {
        let Expr::Set(set) = expr else { unreachable!() };

        let target = parenthesize!(self, format!(". {}", set.name.lexeme).as_str(), set.object);
        parenthesize!(self, format!("= {target}").as_str(), set.value)
    }

    fn visit_super_expr(&mut self, expr: &Expr) -> String {
        let Expr::Super(super_expr) = expr else { unreachable!() };

        format!("(super {})", super_expr.method.lexeme)
    }

    fn visit_this_expr(&mut self, expr: &Expr) -> String {
        let Expr::This(_) = expr else { unreachable!() };

        "this".to_string()
    }

    fn visit_unary_expr(&mut self, expr: &Expr) -> String {
        let Expr::Unary(unary) = expr else { unreachable!() };

        parenthesize!(self, &unary.operator.lexeme, unary.expr)
    }

    fn visit_variable_expr(&mut self, expr: &Expr) -> String {
        let Expr::Variable(variable) = expr else { unreachable!() };

        variable.name.lexeme.clone()
    }
}

impl StmtVisitor<String> for AstPrinter {
    fn visit_block_stmt(&mut self, stmt: &Stmt) -> String {
        let Stmt::Block(block) = stmt else { unreachable!() };

        let mut string = String::new();
        string += "{";
        for statement in &block.statements {
            string += " ";
            string += &statement.accept(self);
        }
        string += " }";

        string
    }

    fn visit_class_stmt(&mut self, stmt: &Stmt) -> String {
        let Stmt::Class(class) = stmt else { unreachable!() };

        let mut string = String::new();
        string += "(class ";
        string += &class.name.lexeme;
        if let Some(superclass) = &class.superclass {
            string += " < ";
            string += &superclass.accept(self);
        }
        string += " {";
        for method in &class.methods {
            string += " ";
            string += &method.accept(self);
        }
        string += " })";

        string
    }

    fn visit_expression_stmt(&mut self, stmt: &Stmt) -> String {
        let Stmt::Expression(expression) = stmt else { unreachable!() };

        parenthesize!(self, "expr", expression.expr)
    }

    fn visit_function_stmt(&mut self, stmt: &Stmt) -> String {
        let Stmt::Function(function) = stmt else { unreachable!() };

        let mut string = String::new();
        string += "(fun ";
        string += &function.name.lexeme;
        string += "(";
        for param in &function.params {
            string += &param.lexeme;
            string += " ";
        }
        string = string.trim_end().to_string();
        string += ") { ";
        string += &function.body.iter()
            .map(|statement| statement.accept(self))
            .collect::<Vec<String>>()
            .join(" ");
        string += " })";

        string
    }

    fn visit_if_stmt(&mut self, stmt: &Stmt) -> String {
        let Stmt::If(if_stmt) = stmt else { unreachable!() };

        let mut string = String::new();
        string += "(if ";
        string += &if_stmt.condition.accept(self);
        string += " ";
        string += &if_stmt.then_branch.accept(self);
        if let Some(else_branch) = &if_stmt.else_branch {
            string += " else ";
            string += &else_branch.accept(self);
        }
        string += ")";

        string
    }

    fn visit_print_stmt(&mut self, stmt: &Stmt) -> String {
        let Stmt::Print(print) = stmt else { unreachable!() };

        parenthesize!(self, "print", print.expr)
    }

    fn visit_return_stmt(&mut self, stmt: &Stmt) -> String {
        let Stmt::Return(return_stmt) = stmt else { unreachable!() };

        match &return_stmt.value {
            Some(value) => parenthesize!(self, "return", value),
            None => "(return)".to_string(),
        }
    }

    fn visit_var_stmt(&mut self, stmt: &Stmt) -> String {
        let Stmt::Var(var) = stmt else { unreachable!() };

        let mut string = String::new();
        string += "(var ";
        string += &var.name.lexeme;
        if let Some(initializer) = &var.initializer {
            string += " = ";
            string += &initializer.accept(self);
        }
        string += ")";

        string
    }

    fn visit_while_stmt(&mut self, stmt: &Stmt) -> String {
        let Stmt::While(while_stmt) = stmt else { unreachable!() };

        parenthesize!(self, "while", while_stmt.condition, while_stmt.body)
    }
}
