use crate::error::{Error, ParseError};
use crate::expr::*;
use crate::literal::Literal;
use crate::stmt::*;
use crate::token::{Token, Kind};

type ParseResult<T> = Result<T, ParseError>;

/// Returns if the next token is any of the given types and consumes it if so.
macro_rules! matches {
    ( $self:ident, $( $type:expr ),+ ) => {
        {
            if $( $self.check($type) ) ||* {
                $self.advance();
                true
            } else {
                false
            }
        }
    }
}

/// Parses the tokens and returns the resulting statements.
///
/// - Program     -> Declaration* EOF ;
/// - Declaration -> ClassDecl | FunDecl | VarDecl | Statement ;
/// - ClassDecl   -> "class" IDENTIFIER ( "<" IDENTIFIER )? "{" Function* "}" ;
/// - FunDecl     -> "fun" Function ;
/// - VarDecl     -> "var" IDENTIFIER ( "=" Expression )? ";" ;
/// - Function    -> IDENTIFIER "(" Parameters? ")" Block ;
/// - Parameters  -> IDENTIFIER ( "," IDENTIFIER )* ;
/// - Statement   -> ExprStmt | ForStmt | IfStmt | PrintStmt | ReturnStmt | WhileStmt | Block ;
/// - Block       -> "{" Declaration* "}" ;
/// - ExprStmt    -> Expression ";" ;
/// - ForStmt     -> "for" "(" ( VarDecl | ExprStmt | ";" ) Expression? ";" Expression? ")" Statement ;
/// - IfStmt      -> "if" "(" Expression ")" Statement ( "else" Statement )? ;
/// - PrintStmt   -> "print" Expression ";" ;
/// - ReturnStmt  -> "return" Expression? ";" ;
/// - WhileStmt   -> "while" "(" Expression ")" Statement ;
/// - Expression  -> Assignment ;
/// - Assignment  -> ( Call "." )? IDENTIFIER "=" Assignment | LogicOr ;
/// - LogicOr     -> LogicAnd ( "or" LogicAnd )* ;
/// - LogicAnd    -> Equality ( "and" Equality )* ;
/// - Equality    -> Comparison ( ( "!=" | "==" ) Comparison )* ;
/// - Comparison  -> Term ( ( ">" | ">=" | "<" | "<=" ) Term )* ;
/// - Term        -> Factor ( ( "+" | "-" ) Factor )* ;
/// - Factor      -> Unary ( ( "*" | "/" ) Unary )* ;
/// - Unary       -> ( "!" | "-" ) Unary | Call ;
/// - Call        -> Primary ( "(" Arguments? ")" | "." IDENTIFIER )* ;
/// - Arguments   -> Expression ( "," Expression )* ;
/// - Primary     -> NUMBER | STRING | "false" | "true" | "nil" | "this" | "(" Expression ")" | IDENTIFIER | "super" "." IDENTIFIER ;
pub struct Parser {
    tokens: Vec<Token>,
    current: u32,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            current: 0,
        }
    }

    /// Parses the tokens and returns the resulting statements.
    /// Parse errors are reported as they are found; a raised error flag is the
    /// caller's signal to discard the returned statements.
    pub fn parse(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        statements
    }

    /// Returns the next token without consuming it.
    fn peek(&mut self) -> &Token {
        &self.tokens[self.current as usize]
    }

    /// Returns the previous token without consuming it.
    fn previous(&mut self) -> &Token {
        &self.tokens[(self.current - 1) as usize]
    }

    /// Returns if the parser has reached the end of the token stream.
    fn is_at_end(&mut self) -> bool {
        self.peek().kind == Kind::EOF
    }

    /// Returns if the next token is of the given type.
    fn check(&mut self, kind: Kind) -> bool {
        if self.is_at_end() {
            return false;
        }

        self.peek().kind == kind
    }

    /// Consumes the next token and returns it.
    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    /// Consumes the next token if it is of the given type.
    fn consume(&mut self, kind: Kind, message: &str) -> ParseResult<&Token> {
        if self.check(kind) {
            return Ok(self.advance());
        }

        Err(ParseError {
            token: self.peek().clone(),
            message: message.to_string(),
        })
    }

    /// Parses a declaration.
    fn declaration(&mut self) -> Option<Stmt> {
        let statement = if matches!(self, Kind::Class) {
            self.class_declaration()
        } else if matches!(self, Kind::Fun) {
            self.function("function")
        } else if matches!(self, Kind::Var) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match statement {
            Ok(stmt) => Some(stmt),
            Err(error) => {
                error.throw();
                self.synchronize();
                None
            }
        }
    }

    /// Parses a class declaration.
    fn class_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Kind::Identifier, "Expect class name")?.clone();

        let superclass = if matches!(self, Kind::Less) {
            self.consume(Kind::Identifier, "Expect superclass name")?;
            Some(Expr::Variable(VariableData { name: self.previous().clone() }))
        } else {
            None
        };

        self.consume(Kind::LeftBrace, "Expect '{' before class body")?;

        let mut methods: Vec<Stmt> = vec![];
        while !self.check(Kind::RightBrace) && !self.is_at_end() {
            methods.push(self.function("method")?);
        }

        self.consume(Kind::RightBrace, "Expect '}' after class body")?;

        Ok(Stmt::Class(ClassData { name, superclass, methods }))
    }

    /// Parses a variable declaration.
    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(Kind::Identifier, "Expect variable name")?.clone();

        let mut initializer: Option<Expr> = None;
        if matches!(self, Kind::Equal) {
            initializer = Some(self.expression()?);
        }

        self.consume(Kind::Semicolon, "Expect ';' after variable declaration")?;
        Ok(Stmt::Var(VarData { name, initializer }))
    }

    /// Parses an expression.
    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    /// Parses a statement.
    fn statement(&mut self) -> ParseResult<Stmt> {
        if matches!(self, Kind::For) {
            return self.for_statement();
        }

        if matches!(self, Kind::If) {
            return self.if_statement();
        }

        if matches!(self, Kind::Print) {
            return self.print_statement();
        }

        if matches!(self, Kind::Return) {
            return self.return_statement();
        }

        if matches!(self, Kind::While) {
            return self.while_statement();
        }

        if matches!(self, Kind::LeftBrace) {
            return Ok(Stmt::Block(BlockData { statements: self.block()? }));
        }

        self.expression_statement()
    }

    /// Parses a for statement by desugaring it into a while loop.
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Kind::LeftParen, "Expect '(' after 'for'")?;

        let initializer: Option<Stmt>;
        if matches!(self, Kind::Semicolon) {
            initializer = None;
        } else if matches!(self, Kind::Var) {
            initializer = Some(self.var_declaration()?);
        } else {
            initializer = Some(self.expression_statement()?);
        }

        let condition = match !self.check(Kind::Semicolon) {
            true => Some(self.expression()?),
            false => None,
        };
        self.consume(Kind::Semicolon, "Expect ';' after loop condition")?;

        let increment = match !self.check(Kind::RightParen) {
            true => Some(self.expression()?),
            false => None,
        };
        self.consume(Kind::RightParen, "Expect ')' after for clauses")?;

        let mut body = self.statement()?;

        // Execute the increment after the body.
        if let Some(increment) = increment {
            body = Stmt::Block(BlockData {
                statements: vec![
                    body,
                    Stmt::Expression(ExpressionData { expr: increment }),
                ],
            });
        }

        // Wrap the body into a while loop.
        // If there is no condition, use true.
        body = Stmt::While(WhileData {
            condition: condition.unwrap_or(Expr::Literal(Literal::Bool(true))),
            body: Box::new(body),
        });

        // Add the initializer before the loop if there is one.
        if let Some(initializer) = initializer {
            body = Stmt::Block(BlockData {
                statements: vec![initializer, body],
            });
        }

        Ok(body)
    }

    /// Parses an if statement.
    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Kind::LeftParen, "Expect '(' after 'if'")?;
        let condition = self.expression()?;
        self.consume(Kind::RightParen, "Expect ')' after if condition")?;

        let then_branch = Box::new(self.statement()?);
        let mut else_branch: Option<Box<Stmt>> = None;
        if matches!(self, Kind::Else) {
            else_branch = Some(Box::new(self.statement()?));
        }

        Ok(Stmt::If(IfData { condition, then_branch, else_branch }))
    }

    /// Parses a print statement.
    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;

        self.consume(Kind::Semicolon, "Expect ';' after value")?;

        Ok(Stmt::Print(PrintData { expr }))
    }

    /// Parses a return statement.
    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().to_owned();

        let value = match self.check(Kind::Semicolon) {
            true => None,
            false => Some(self.expression()?),
        };

        self.consume(Kind::Semicolon, "Expect ';' after return value")?;
        Ok(Stmt::Return(ReturnData { keyword, value }))
    }

    /// Parses a while statement.
    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(Kind::LeftParen, "Expect '(' after 'while'")?;
        let condition = self.expression()?;
        self.consume(Kind::RightParen, "Expect ')' after condition")?;
        let body = self.statement()?;

        Ok(Stmt::While(WhileData {
            condition,
            body: Box::new(body),
        }))
    }

    /// Parses an expression statement.
    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;

        self.consume(Kind::Semicolon, "Expect ';' after expression")?;

        Ok(Stmt::Expression(ExpressionData { expr }))
    }

    /// Parses a function declaration.
    fn function(&mut self, kind: &str) -> ParseResult<Stmt> {
        let name = self.consume(Kind::Identifier, &format!("Expect {kind} name"))?.to_owned();

        self.consume(Kind::LeftParen, &format!("Expect '(' after {kind} name"))?;

        let mut params = vec![];

        if !self.check(Kind::RightParen) {
            loop {
                if params.len() >= 255 {
                    ParseError {
                        token: self.peek().to_owned(),
                        message: "Cannot have more than 255 parameters".to_string(),
                    }.throw();
                }

                params.push(self.consume(Kind::Identifier, "Expect parameter name")?.to_owned());

                if !matches!(self, Kind::Comma) {
                    break;
                }
            }
        }

        self.consume(Kind::RightParen, "Expect ')' after parameters")?;

        self.consume(Kind::LeftBrace, &format!("Expect '{{' before {kind} body"))?;

        let body = self.block()?;

        Ok(Stmt::Function(FunctionData { name, params, body }))
    }

    /// Parses a block statement.
    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check(Kind::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(Kind::RightBrace, "Expect '}' after block")?;

        Ok(statements)
    }

    /// Parses an assignment expression.
    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or()?;

        if matches!(self, Kind::Equal) {
            let equals = self.previous().to_owned();
            let value = self.assignment()?;

            if let Expr::Variable(data) = expr {
                return Ok(Expr::Assign(AssignData {
                    name: data.name,
                    value: Box::new(value),
                }));
            } else if let Expr::Get(data) = expr {
                return Ok(Expr::Set(SetData {
                    object: data.object,
                    name: data.name,
                    value: Box::new(value),
                }));
            }

            // Report but keep the left-hand side as the expression.
            ParseError {
                token: equals,
                message: "Invalid assignment target".to_string(),
            }.throw();
        }

        Ok(expr)
    }

    /// Parses an or expression.
    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;

        while matches!(self, Kind::Or) {
            let operator = self.previous().clone();
            let right = self.and()?;
            expr = Expr::Logical(LogicalData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses an and expression.
    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;

        while matches!(self, Kind::And) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical(LogicalData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses an equality expression.
    fn equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.comparison()?;

        while matches!(self, Kind::BangEqual, Kind::EqualEqual) {
            let operator = self.previous().clone();
            let right = self.comparison()?;

            expr = Expr::Binary(BinaryData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses a comparison expression.
    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.term()?;

        while matches!(self, Kind::Greater, Kind::GreaterEqual, Kind::Less, Kind::LessEqual) {
            let operator = self.previous().clone();
            let right = self.term()?;

            expr = Expr::Binary(BinaryData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses a term expression.
    fn term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.factor()?;

        while matches!(self, Kind::Minus, Kind::Plus) {
            let operator = self.previous().clone();
            let right = self.factor()?;

            expr = Expr::Binary(BinaryData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses a factor expression.
    fn factor(&mut self) -> ParseResult<Expr> {
        let mut expr = self.unary()?;

        while matches!(self, Kind::Slash, Kind::Star) {
            let operator = self.previous().clone();
            let right = self.unary()?;

            expr = Expr::Binary(BinaryData {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    /// Parses a unary expression.
    fn unary(&mut self) -> ParseResult<Expr> {
        if matches!(self, Kind::Bang, Kind::Minus) {
            let operator = self.previous().clone();
            let right = self.unary()?;

            return Ok(Expr::Unary(UnaryData {
                operator,
                expr: Box::new(right),
            }));
        }

        self.call()
    }

    /// Parses a call's argument list.
    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = vec![];

        if !self.check(Kind::RightParen) {
            while {
                if arguments.len() >= 255 {
                    ParseError {
                        token: self.peek().to_owned(),
                        message: "Cannot have more than 255 arguments".to_string(),
                    }.throw();
                }

                arguments.push(self.expression()?);
                matches!(self, Kind::Comma)
            } {}
        }

        let paren = self.consume(Kind::RightParen, "Expect ')' after arguments")?;

        Ok(Expr::Call(CallData {
            callee: Box::new(callee),
            paren: paren.to_owned(),
            arguments,
        }))
    }

    /// Parses a call expression.
    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        loop {
            if matches!(self, Kind::LeftParen) {
                expr = self.finish_call(expr)?;
            } else if matches!(self, Kind::Dot) {
                let name = self.consume(Kind::Identifier, "Expect property name after '.'")?;
                expr = Expr::Get(GetData { object: Box::new(expr), name: name.clone() });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parses a primary expression.
    fn primary(&mut self) -> ParseResult<Expr> {
        if matches!(self, Kind::False) {
            return Ok(Expr::Literal(Literal::Bool(false)));
        }

        if matches!(self, Kind::True) {
            return Ok(Expr::Literal(Literal::Bool(true)));
        }

        if matches!(self, Kind::Nil) {
            return Ok(Expr::Literal(Literal::Nil));
        }

        if matches!(self, Kind::Number, Kind::String) {
            return Ok(Expr::Literal(self.previous().clone().literal
                .expect("number or string to have a literal value")));
        }

        if matches!(self, Kind::Super) {
            let keyword = self.previous().clone();
            self.consume(Kind::Dot, "Expect '.' after 'super'")?;
            let method = self.consume(Kind::Identifier, "Expect superclass method name")?.clone();

            return Ok(Expr::Super(SuperData { keyword, method }));
        }

        if matches!(self, Kind::This) {
            return Ok(Expr::This(ThisData { keyword: self.previous().clone() }));
        }

        if matches!(self, Kind::Identifier) {
            return Ok(Expr::Variable(VariableData {
                name: self.previous().clone(),
            }));
        }

        if matches!(self, Kind::LeftParen) {
            let expr = self.expression()?;
            self.consume(Kind::RightParen, "Expect ')' after expression")?;

            return Ok(Expr::Grouping(GroupingData { expr: Box::new(expr) }));
        }

        Err(ParseError {
            token: self.peek().clone(),
            message: "Expect expression".to_string(),
        })
    }

    /// Tries to recover from a parse error by discarding tokens until a
    /// likely statement boundary.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == Kind::Semicolon {
                return;
            }

            match self.peek().kind {
                Kind::Class => return,
                Kind::Fun => return,
                Kind::Var => return,
                Kind::For => return,
                Kind::If => return,
                Kind::While => return,
                Kind::Print => return,
                Kind::Return => return,
                _ => self.advance(),
            };
        }
    }
}
