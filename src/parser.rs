//! A Pratt (top-down operator-precedence) parser driven by one-token lookahead.
//!
//! Builds [ast] nodes directly via a `parse_precedence`-style climb over a
//! prefix/infix dispatch keyed by [TokenKind], rather than emitting bytecode.

use crate::ast::{Block, Expression, Program, Statement};
use crate::error::ParseError;
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

/// Precedence rungs, lowest to highest (spec.md §4.2).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Ord)]
enum Precedence {
    Lowest,
    Equality,
    Comparison,
    Sum,
    Product,
    Prefix,
    Call,
}

fn precedence_of(kind: TokenKind) -> Precedence {
    use TokenKind::*;
    match kind {
        Equal | EqualNot => Precedence::Equality,
        Lesser | LesserEqual | Greater | GreaterEqual => Precedence::Comparison,
        Plus | Minus => Precedence::Sum,
        Star | Slash => Precedence::Product,
        LParen | LBracket => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

/// Owns the [Lexer] and a one-token lookahead buffer (`current`, `peek`).
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    peek: Token,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        let peek = lexer.next_token();
        Parser {
            lexer,
            current,
            peek,
        }
    }

    fn advance(&mut self) {
        let next = self.lexer.next_token();
        self.current = std::mem::replace(&mut self.peek, next);
    }

    fn current_is(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.kind == kind
    }

    /// Advances past `kind` if `current` matches it, else returns an error
    /// describing what was expected. Used for the "expectPeek"-style checks
    /// spec.md §4.2 describes, here applied to `current` because this
    /// parser consumes the keyword/punctuator before validating the token
    /// that should follow it.
    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), ParseError> {
        if self.current_is(kind) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::new(format!(
                "expected {what}, got {:?} ({:?})",
                self.current.kind, self.current.literal
            )))
        }
    }

    /// Consumes an optional trailing `;`, which is accepted but never required.
    fn skip_optional_semicolon(&mut self) {
        if self.current_is(TokenKind::Semicolon) {
            self.advance();
        }
    }

    /// Parses the whole token stream into a [Program].
    ///
    /// Per spec.md §4.2/§7, a statement that fails to parse is dropped and
    /// parsing continues from wherever the failed production left the
    /// cursor; this function only returns `Err` when *no* statement could
    /// be recovered at all.
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();
        let mut any_error = false;

        while !self.current_is(TokenKind::Eof) {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(_) => {
                    any_error = true;
                    // Drop the offending statement and resynchronize at the
                    // next statement boundary, mirroring the "null
                    // statement" behavior spec.md describes for `let`.
                    while !self.current_is(TokenKind::Semicolon)
                        && !self.current_is(TokenKind::Eof)
                    {
                        self.advance();
                    }
                    self.skip_optional_semicolon();
                }
            }
        }

        if statements.is_empty() && any_error {
            return Err(ParseError::new("no statement could be parsed"));
        }

        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        match self.current.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Identifier if self.peek_is(TokenKind::Assign) => {
                self.parse_assign_statement()
            }
            _ => self.parse_expression_statement(),
        }
    }

    /// `let IDENT = EXPR ;?`
    fn parse_let_statement(&mut self) -> Result<Statement, ParseError> {
        self.advance(); // `let`

        let name = match self.current.kind {
            TokenKind::Identifier => self.current.literal.clone(),
            _ => return Err(ParseError::new("expected identifier after `let`")),
        };
        self.advance();

        self.expect(TokenKind::Assign, "`=` in let statement")?;

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();

        Ok(Statement::Let { name, value })
    }

    /// `IDENT = EXPR ;?`, parsed at statement level (spec.md §4.2 allows
    /// either this shape or a dedicated expression-level rule).
    fn parse_assign_statement(&mut self) -> Result<Statement, ParseError> {
        let name = self.current.literal.clone();
        self.advance(); // identifier
        self.advance(); // `=`

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();

        Ok(Statement::Expression(Expression::Assign {
            name,
            value: Box::new(value),
        }))
    }

    /// `return EXPR ;?`
    fn parse_return_statement(&mut self) -> Result<Statement, ParseError> {
        self.advance(); // `return`
        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();
        Ok(Statement::Return { value })
    }

    /// `while EXPR { BLOCK }`
    fn parse_while_statement(&mut self) -> Result<Statement, ParseError> {
        self.advance(); // `while`
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect(TokenKind::LBrace, "`{` to start while body")?;
        let body = self.parse_block()?;
        self.skip_optional_semicolon();
        Ok(Statement::While { condition, body })
    }

    fn parse_expression_statement(&mut self) -> Result<Statement, ParseError> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();
        Ok(Statement::Expression(expr))
    }

    /// `{ STMT* }`. Assumes the opening `{` has already been consumed.
    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let mut statements = Vec::new();

        while !self.current_is(TokenKind::RBrace) && !self.current_is(TokenKind::Eof) {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(_) => {
                    while !self.current_is(TokenKind::Semicolon)
                        && !self.current_is(TokenKind::RBrace)
                        && !self.current_is(TokenKind::Eof)
                    {
                        self.advance();
                    }
                    self.skip_optional_semicolon();
                }
            }
        }

        self.expect(TokenKind::RBrace, "`}` to close block")?;
        Ok(Block { statements })
    }

    /// The core Pratt-parsing loop: run the prefix handler for `current` to
    /// get `left`, then while `precedence` is lower than `current`'s
    /// infix-binding precedence, run that infix handler with `left`.
    fn parse_expression(&mut self, precedence: Precedence) -> Result<Expression, ParseError> {
        let mut left = self.parse_prefix()?;

        while precedence < precedence_of(self.current.kind) {
            left = self.parse_infix(left)?;
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expression, ParseError> {
        match self.current.kind {
            TokenKind::Identifier => {
                let name = self.current.literal.clone();
                self.advance();
                Ok(Expression::Identifier(name))
            }
            TokenKind::Integer => {
                let text = self.current.literal.clone();
                self.advance();
                text.parse::<i64>()
                    .map(Expression::IntegerLit)
                    .map_err(|_| ParseError::new(format!("invalid integer literal `{text}`")))
            }
            TokenKind::Floating => {
                let text = self.current.literal.clone();
                self.advance();
                text.parse::<f64>()
                    .map(Expression::FloatLit)
                    .map_err(|_| ParseError::new(format!("invalid float literal `{text}`")))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expression::BooleanLit(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expression::BooleanLit(false))
            }
            TokenKind::Str => {
                let text = self.current.literal.clone();
                self.advance();
                Ok(Expression::StringLit(text))
            }
            TokenKind::Bang | TokenKind::Minus => self.parse_prefix_expression(),
            TokenKind::LParen => self.parse_grouped_expression(),
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::LBrace => self.parse_hash_literal(),
            TokenKind::If => self.parse_if_expression(),
            TokenKind::Function => self.parse_function_literal(),
            other => Err(ParseError::new(format!(
                "no prefix parse rule for {other:?}"
            ))),
        }
    }

    fn parse_infix(&mut self, left: Expression) -> Result<Expression, ParseError> {
        match self.current.kind {
            TokenKind::LParen => self.parse_call(left),
            TokenKind::LBracket => self.parse_index(left),
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Greater
            | TokenKind::GreaterEqual
            | TokenKind::Lesser
            | TokenKind::LesserEqual
            | TokenKind::Equal
            | TokenKind::EqualNot => self.parse_infix_expression(left),
            other => Err(ParseError::new(format!(
                "no infix parse rule for {other:?}"
            ))),
        }
    }

    fn parse_prefix_expression(&mut self) -> Result<Expression, ParseError> {
        let op = operator_literal(self.current.kind);
        self.advance();
        let right = self.parse_expression(Precedence::Prefix)?;
        Ok(Expression::Prefix {
            op,
            right: Box::new(right),
        })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Result<Expression, ParseError> {
        let op = operator_literal(self.current.kind);
        let precedence = precedence_of(self.current.kind);
        self.advance();
        let right = self.parse_expression(precedence)?;
        Ok(Expression::Infix {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// `(` EXPR `)`
    fn parse_grouped_expression(&mut self) -> Result<Expression, ParseError> {
        self.advance(); // `(`
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.expect(TokenKind::RParen, "`)` to close grouping")?;
        Ok(expr)
    }

    /// `[` EXPR (`,` EXPR)* `]`
    fn parse_array_literal(&mut self) -> Result<Expression, ParseError> {
        self.advance(); // `[`
        let elements = self.parse_expression_list(TokenKind::RBracket)?;
        Ok(Expression::ArrayLit(elements))
    }

    /// `{` (EXPR `:` EXPR (`,` EXPR `:` EXPR)*)? `}`
    fn parse_hash_literal(&mut self) -> Result<Expression, ParseError> {
        self.advance(); // `{`
        let mut entries = Vec::new();

        while !self.current_is(TokenKind::RBrace) {
            let key = self.parse_expression(Precedence::Lowest)?;
            self.expect(TokenKind::Colon, "`:` between hash key and value")?;
            let value = self.parse_expression(Precedence::Lowest)?;
            entries.push((key, value));

            if self.current_is(TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        self.expect(TokenKind::RBrace, "`}` to close hash literal")?;
        Ok(Expression::HashLit(entries))
    }

    /// `if EXPR { BLOCK } (else { BLOCK })?`
    fn parse_if_expression(&mut self) -> Result<Expression, ParseError> {
        self.advance(); // `if`
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect(TokenKind::LBrace, "`{` to start if-branch")?;
        let then_branch = self.parse_block()?;

        let else_branch = if self.current_is(TokenKind::Else) {
            self.advance();
            self.expect(TokenKind::LBrace, "`{` to start else-branch")?;
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Expression::If {
            condition: Box::new(condition),
            then_branch,
            else_branch,
        })
    }

    /// `fn ( PARAM_LIST? ) { BLOCK }`
    fn parse_function_literal(&mut self) -> Result<Expression, ParseError> {
        self.advance(); // `fn`
        self.expect(TokenKind::LParen, "`(` after `fn`")?;
        let params = self.parse_param_list()?;
        self.expect(TokenKind::LBrace, "`{` to start function body")?;
        let body = self.parse_block()?;
        Ok(Expression::FunctionLit { params, body })
    }

    fn parse_param_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut params = Vec::new();

        if self.current_is(TokenKind::RParen) {
            self.advance();
            return Ok(params);
        }

        loop {
            match self.current.kind {
                TokenKind::Identifier => params.push(self.current.literal.clone()),
                _ => return Err(ParseError::new("expected parameter name")),
            }
            self.advance();

            if self.current_is(TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        self.expect(TokenKind::RParen, "`)` to close parameter list")?;
        Ok(params)
    }

    /// Infix `(` — a call on `left`.
    fn parse_call(&mut self, callee: Expression) -> Result<Expression, ParseError> {
        self.advance(); // `(`
        let args = self.parse_expression_list(TokenKind::RParen)?;
        Ok(Expression::Call {
            callee: Box::new(callee),
            args,
        })
    }

    /// Infix `[` — an index on `left`.
    fn parse_index(&mut self, collection: Expression) -> Result<Expression, ParseError> {
        self.advance(); // `[`
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect(TokenKind::RBracket, "`]` to close index")?;
        Ok(Expression::Index {
            collection: Box::new(collection),
            index: Box::new(index),
        })
    }

    /// A comma-separated expression list terminated by `terminator`.
    /// Assumes the opening delimiter has already been consumed.
    fn parse_expression_list(
        &mut self,
        terminator: TokenKind,
    ) -> Result<Vec<Expression>, ParseError> {
        let mut items = Vec::new();

        if self.current_is(terminator) {
            self.advance();
            return Ok(items);
        }

        loop {
            items.push(self.parse_expression(Precedence::Lowest)?);
            if self.current_is(TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        self.expect(terminator, "closing delimiter of expression list")?;
        Ok(items)
    }
}

fn operator_literal(kind: TokenKind) -> String {
    use TokenKind::*;
    match kind {
        Plus => "+",
        Minus => "-",
        Star => "*",
        Slash => "/",
        Bang => "!",
        Greater => ">",
        GreaterEqual => ">=",
        Lesser => "<",
        LesserEqual => "<=",
        Equal => "==",
        EqualNot => "!=",
        other => unreachable!("operator_literal called with non-operator {other:?}"),
    }
    .to_string()
}

/// Parses `source` into a complete [Program].
pub fn parse(source: &str) -> Result<Program, ParseError> {
    Parser::new(source).parse_program()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn operator_precedence() {
        let program = parse("1 + 2 * 3;").unwrap();
        assert_eq!(
            vec![Statement::Expression(Expression::Infix {
                op: "+".to_string(),
                left: Box::new(Expression::IntegerLit(1)),
                right: Box::new(Expression::Infix {
                    op: "*".to_string(),
                    left: Box::new(Expression::IntegerLit(2)),
                    right: Box::new(Expression::IntegerLit(3)),
                }),
            })],
            program.statements
        );
    }

    #[test]
    fn let_statement() {
        let program = parse("let x = 5;").unwrap();
        assert_eq!(
            vec![Statement::Let {
                name: "x".to_string(),
                value: Expression::IntegerLit(5),
            }],
            program.statements
        );
    }

    #[test]
    fn assignment_statement() {
        let program = parse("x = 5;").unwrap();
        assert_eq!(
            vec![Statement::Expression(Expression::Assign {
                name: "x".to_string(),
                value: Box::new(Expression::IntegerLit(5)),
            })],
            program.statements
        );
    }

    #[test]
    fn if_else_expression() {
        let program = parse("if (x) { 1 } else { 2 }").unwrap();
        match &program.statements[0] {
            Statement::Expression(Expression::If {
                then_branch,
                else_branch,
                ..
            }) => {
                assert_eq!(1, then_branch.statements.len());
                assert!(else_branch.is_some());
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn function_literal_and_call() {
        let program = parse("let add = fn(a, b) { a + b }; add(1, 2)").unwrap();
        match &program.statements[0] {
            Statement::Let { name, value } => {
                assert_eq!("add", name);
                match value {
                    Expression::FunctionLit { params, .. } => {
                        assert_eq!(vec!["a".to_string(), "b".to_string()], *params)
                    }
                    other => panic!("unexpected expression: {other:?}"),
                }
            }
            other => panic!("unexpected statement: {other:?}"),
        }
        match &program.statements[1] {
            Statement::Expression(Expression::Call { args, .. }) => {
                assert_eq!(2, args.len())
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn array_and_index() {
        let program = parse("let a = [1, 2, 3]; a[1]").unwrap();
        match &program.statements[1] {
            Statement::Expression(Expression::Index { .. }) => {}
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn hash_literal() {
        let program = parse(r#"{"a": 1, "b": 2}"#).unwrap();
        match &program.statements[0] {
            Statement::Expression(Expression::HashLit(entries)) => assert_eq!(2, entries.len()),
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn while_statement() {
        let program = parse("while i < 3 { i = i + 1 }").unwrap();
        match &program.statements[0] {
            Statement::While { body, .. } => assert_eq!(1, body.statements.len()),
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn semicolons_are_optional() {
        let with = parse("let x = 1; let y = 2;").unwrap();
        let without = parse("let x = 1 let y = 2").unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn parser_determinism() {
        let source = "let a = 1 + 2 * 3; if a > 5 { print(a) } else { print(0) }";
        assert_eq!(parse(source).unwrap(), parse(source).unwrap());
    }
}
