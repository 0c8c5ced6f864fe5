pub mod ast;
pub mod export;
pub mod lexer;

use thiserror::Error;

use crate::{
    ast::{AstNode, NodeKind},
    lexer::{Loc, Token, TokenKind},
};

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ParserError {
    #[error("Expected {expected} at {}, found \"{}\"", .actual.loc, .actual.text)]
    UnexpectedToken {
        expected: &'static str,
        actual: Token,
    },
    #[error("Expected expression at {}, found \"{}\"", .0.loc, .0.text)]
    ExpectedExpression(Token),
    #[error("Invalid assignment target at {0}")]
    InvalidAssignmentTarget(Loc),
    #[error("Expected function name before the argument list at {0}")]
    InvalidCallee(Loc),
    #[error("Unterminated block starting at {0}")]
    UnterminatedBlock(Loc),
}

type ParseFunction = fn(&mut Parser) -> Result<AstNode, ParserError>;

/// Recursive descent parser over an already lexed token stream.
///
/// Errors inside a function declaration abandon that declaration, the parser
/// then skips ahead to the next type keyword and carries on. Only the most
/// recent error is kept.
#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    error: Option<ParserError>,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |tok| tok.kind != TokenKind::Eof) {
            let loc = tokens
                .last()
                .map_or(Loc { line: 1, column: 1 }, |tok| tok.loc);
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                loc,
            });
        }

        Self {
            tokens,
            current: 0,
            error: None,
        }
    }

    pub fn had_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn last_error(&self) -> Option<&ParserError> {
        self.error.as_ref()
    }

    fn report(&mut self, error: ParserError) {
        self.error = Some(error);
    }

    fn cur_token(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn is_at_end(&self) -> bool {
        self.cur_token().kind == TokenKind::Eof
    }

    fn next_token(&mut self) -> Token {
        let token = self.cur_token().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    /// Steps back over the token that was just consumed.
    fn unget(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    fn peek_token(&self) -> &Token {
        self.tokens
            .get(self.current + 1)
            .unwrap_or_else(|| self.cur_token())
    }

    fn cur_token_is(&self, kind: TokenKind, text: &str) -> bool {
        self.cur_token().is(kind, text)
    }

    fn match_token(&mut self, kind: TokenKind, text: &str) -> bool {
        if self.cur_token_is(kind, text) {
            self.next_token();
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &'static str) -> ParserError {
        ParserError::UnexpectedToken {
            expected,
            actual: self.cur_token().clone(),
        }
    }

    fn expect(
        &mut self,
        kind: TokenKind,
        text: &str,
        expected: &'static str,
    ) -> Result<Token, ParserError> {
        if self.cur_token_is(kind, text) {
            Ok(self.next_token())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_kind(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token, ParserError> {
        if self.cur_token().kind == kind {
            Ok(self.next_token())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_type(&mut self, expected: &'static str) -> Result<Token, ParserError> {
        if self.cur_token().is_type_keyword() {
            Ok(self.next_token())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Parses the whole token stream. On failure the last reported error is
    /// returned and no tree is handed out.
    pub fn parse_program(&mut self) -> Result<AstNode, ParserError> {
        self.error = None;
        let mut program = AstNode::program();

        while !self.is_at_end() {
            match self.parse_function() {
                Ok(function) => program.add_child(function),
                Err(err) => {
                    self.report(err);
                    self.synchronize();
                }
            }
        }

        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(program),
        }
    }

    fn synchronize(&mut self) {
        while !self.is_at_end() && !self.cur_token().is_type_keyword() {
            self.next_token();
        }
    }

    // Declarations

    fn parse_function(&mut self) -> Result<AstNode, ParserError> {
        self.expect_type("return type for function declaration")?;
        let name = self.expect_kind(TokenKind::Identifier, "function name")?;
        self.expect(TokenKind::Punctuation, "(", "'(' after function name")?;
        let params = self.parse_param_list()?;
        self.expect(TokenKind::Punctuation, ")", "')' after parameters")?;
        let body = self.parse_block()?;

        Ok(AstNode::function(&name.text, params, body))
    }

    // Expects to be behind the (
    fn parse_param_list(&mut self) -> Result<AstNode, ParserError> {
        let mut params = AstNode::params();

        if self.cur_token_is(TokenKind::Punctuation, ")") {
            return Ok(params);
        }
        if self.cur_token_is(TokenKind::Keyword, "void")
            && self.peek_token().is(TokenKind::Punctuation, ")")
        {
            self.next_token();
            return Ok(params);
        }

        loop {
            let ty = self.expect_type("parameter type")?;
            let name = self.expect_kind(TokenKind::Identifier, "parameter name")?;
            params.add_child(AstNode::var_decl(&ty.text, &name.text, None));

            if !self.match_token(TokenKind::Punctuation, ",") {
                return Ok(params);
            }
        }
    }

    fn parse_var_declaration(&mut self) -> Result<AstNode, ParserError> {
        let ty = self.expect_type("type name")?;
        let name = self.expect_kind(TokenKind::Identifier, "variable name")?;

        let init = if self.match_token(TokenKind::Operator, "=") {
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.expect(
            TokenKind::Punctuation,
            ";",
            "';' after variable declaration",
        )?;

        Ok(AstNode::var_decl(&ty.text, &name.text, init))
    }

    fn parse_block(&mut self) -> Result<AstNode, ParserError> {
        let open = self.expect(TokenKind::Punctuation, "{", "'{' before block")?;
        let mut block = AstNode::block();

        while !self.cur_token_is(TokenKind::Punctuation, "}") {
            if self.is_at_end() {
                return Err(ParserError::UnterminatedBlock(open.loc));
            }
            block.add_child(self.parse_statement()?);
        }
        // }
        self.next_token();

        Ok(block)
    }

    // Statements

    fn parse_statement(&mut self) -> Result<AstNode, ParserError> {
        if self.cur_token().kind == TokenKind::Keyword {
            let keyword = self.next_token();
            return match keyword.text.as_str() {
                "if" => self.parse_if_statement(),
                "while" => self.parse_while_statement(),
                "for" => self.parse_for_statement(),
                "return" => self.parse_return_statement(),
                _ if keyword.is_type_keyword() => {
                    self.unget();
                    self.parse_var_declaration()
                }
                _ => Err(ParserError::ExpectedExpression(keyword)),
            };
        }

        if self.cur_token_is(TokenKind::Punctuation, "{") {
            return self.parse_block();
        }

        self.parse_expression_statement()
    }

    fn parse_expression_statement(&mut self) -> Result<AstNode, ParserError> {
        let expr = self.parse_expression()?;
        self.expect(TokenKind::Punctuation, ";", "';' after expression")?;
        Ok(expr)
    }

    fn parse_if_statement(&mut self) -> Result<AstNode, ParserError> {
        self.expect(TokenKind::Punctuation, "(", "'(' after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::Punctuation, ")", "')' after if condition")?;
        let then = self.parse_statement()?;

        let r#else = if self.match_token(TokenKind::Keyword, "else") {
            Some(self.parse_statement()?)
        } else {
            None
        };

        Ok(AstNode::if_statement(condition, then, r#else))
    }

    fn parse_while_statement(&mut self) -> Result<AstNode, ParserError> {
        self.expect(TokenKind::Punctuation, "(", "'(' after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::Punctuation, ")", "')' after while condition")?;
        let body = self.parse_statement()?;

        Ok(AstNode::while_statement(condition, body))
    }

    fn parse_for_statement(&mut self) -> Result<AstNode, ParserError> {
        self.expect(TokenKind::Punctuation, "(", "'(' after 'for'")?;

        let init = if self.match_token(TokenKind::Punctuation, ";") {
            None
        } else if self.cur_token().is_type_keyword() {
            Some(self.parse_var_declaration()?)
        } else {
            let expr = self.parse_expression()?;
            self.expect(TokenKind::Punctuation, ";", "';' after for initializer")?;
            Some(expr)
        };

        let condition = self.parse_optional_expression(";", "';' after for condition")?;
        let update = self.parse_optional_expression(")", "')' after for clauses")?;
        let body = self.parse_statement()?;

        Ok(AstNode::for_statement(init, condition, update, body))
    }

    fn parse_return_statement(&mut self) -> Result<AstNode, ParserError> {
        let expr = self.parse_optional_expression(";", "';' after return value")?;
        Ok(AstNode::return_statement(expr))
    }

    /// Parses an expression unless `end` follows directly, then eats `end`.
    fn parse_optional_expression(
        &mut self,
        end: &str,
        expected: &'static str,
    ) -> Result<Option<AstNode>, ParserError> {
        let expr = (!self.cur_token_is(TokenKind::Punctuation, end))
            .then(|| self.parse_expression())
            .transpose()?;
        self.expect(TokenKind::Punctuation, end, expected)?;
        Ok(expr)
    }

    // Expressions, lowest precedence first

    fn parse_expression(&mut self) -> Result<AstNode, ParserError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<AstNode, ParserError> {
        let expr = self.parse_equality()?;

        if self.cur_token_is(TokenKind::Operator, "=") {
            let assign = self.next_token();
            let value = self.parse_assignment()?;

            if let (NodeKind::Identifier, Some(name)) = (expr.kind(), expr.value()) {
                return Ok(AstNode::assignment(name, value));
            }

            // Not fatal, the left hand side is kept as the expression.
            self.report(ParserError::InvalidAssignmentTarget(assign.loc));
        }

        Ok(expr)
    }

    fn parse_binary_level(
        &mut self,
        operators: &[&str],
        operand: ParseFunction,
    ) -> Result<AstNode, ParserError> {
        let mut expr = operand(self)?;

        while self.cur_token().kind == TokenKind::Operator
            && operators.contains(&self.cur_token().text.as_str())
        {
            let op = self.next_token();
            let rhs = operand(self)?;
            expr = AstNode::binary_op(&op.text, expr, rhs);
        }

        Ok(expr)
    }

    fn parse_equality(&mut self) -> Result<AstNode, ParserError> {
        self.parse_binary_level(&["==", "!="], Self::parse_comparison)
    }

    fn parse_comparison(&mut self) -> Result<AstNode, ParserError> {
        self.parse_binary_level(&["<", "<=", ">", ">="], Self::parse_term)
    }

    fn parse_term(&mut self) -> Result<AstNode, ParserError> {
        self.parse_binary_level(&["+", "-"], Self::parse_factor)
    }

    fn parse_factor(&mut self) -> Result<AstNode, ParserError> {
        self.parse_binary_level(&["*", "/", "%"], Self::parse_unary)
    }

    fn parse_unary(&mut self) -> Result<AstNode, ParserError> {
        if self.cur_token_is(TokenKind::Operator, "!") || self.cur_token_is(TokenKind::Operator, "-")
        {
            let op = self.next_token();
            let operand = self.parse_unary()?;
            return Ok(AstNode::unary_op(&op.text, operand));
        }

        self.parse_call()
    }

    fn parse_call(&mut self) -> Result<AstNode, ParserError> {
        let expr = self.parse_primary()?;

        if !self.cur_token_is(TokenKind::Punctuation, "(") {
            return Ok(expr);
        }
        let open = self.next_token();

        let mut args = vec![];
        if !self.cur_token_is(TokenKind::Punctuation, ")") {
            loop {
                args.push(self.parse_expression()?);
                if !self.match_token(TokenKind::Punctuation, ",") {
                    break;
                }
            }
        }
        self.expect(
            TokenKind::Punctuation,
            ")",
            "')' after function arguments",
        )?;

        match (expr.kind(), expr.value()) {
            (NodeKind::Identifier, Some(name)) => Ok(AstNode::call(name, args)),
            _ => Err(ParserError::InvalidCallee(open.loc)),
        }
    }

    fn parse_primary(&mut self) -> Result<AstNode, ParserError> {
        let token = self.cur_token().clone();

        match token.kind {
            TokenKind::Number => {
                self.next_token();
                Ok(AstNode::number(&token.text))
            }
            TokenKind::String => {
                self.next_token();
                Ok(AstNode::string(&token.text))
            }
            TokenKind::Identifier => {
                self.next_token();
                Ok(AstNode::identifier(&token.text))
            }
            TokenKind::Punctuation if token.text == "(" => {
                self.next_token();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::Punctuation, ")", "')' after expression")?;
                Ok(expr)
            }
            _ => Err(ParserError::ExpectedExpression(token)),
        }
    }
}
