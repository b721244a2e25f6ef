use crate::ast::*;
use crate::lexer::{Span, Token, TokenKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token: expected {expected}, found {found} at position {span:?}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("Unexpected end of file")]
    UnexpectedEof,
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse(source: &str) -> Result<Program, ParseError> {
        let tokens = crate::lexer::Lexer::tokenize(source);
        let mut parser = Parser::new(tokens);
        parser.parse_program()
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    /// Blank lines and comment-only lines between statements
    fn skip_blank_lines(&mut self) {
        while matches!(
            self.peek_kind(),
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::Comment
        ) {
            self.advance();
        }
    }

    fn skip_comments(&mut self) {
        while self.peek_kind() == TokenKind::Comment {
            self.advance();
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.current() {
            Some(t) if t.kind != TokenKind::Eof => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: if t.text.is_empty() {
                    format!("{:?}", t.kind)
                } else {
                    format!("'{}'", t.text)
                },
                span: t.span,
            },
            _ => ParseError::UnexpectedEof,
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        self.skip_comments();
        if self.peek_kind() == kind {
            if let Some(token) = self.advance() {
                return Ok(token);
            }
        }
        Err(self.unexpected(&format!("{:?}", kind)))
    }

    /// Every statement ends at a newline, a semicolon or the end of input
    fn expect_line_end(&mut self) -> Result<(), ParseError> {
        self.skip_comments();
        match self.peek_kind() {
            TokenKind::Newline | TokenKind::Semicolon => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected("end of line")),
        }
    }

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut items = Vec::new();

        loop {
            self.skip_blank_lines();

            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::Maximize | TokenKind::Minimize => {
                    items.push(Item::Objective(self.parse_objective()?));
                }
                TokenKind::Subject | TokenKind::St => self.parse_header()?,
                _ => items.push(Item::Constraint(self.parse_constraint()?)),
            }

            self.expect_line_end()?;
        }

        Ok(Program { items })
    }

    fn parse_objective(&mut self) -> Result<ObjectiveDecl, ParseError> {
        let Some(keyword) = self.advance() else {
            return Err(ParseError::UnexpectedEof);
        };
        let goal = if keyword.kind == TokenKind::Maximize {
            Goal::Maximize
        } else {
            Goal::Minimize
        };

        // Optional `:` after the keyword, as in `max: x + y`
        if self.peek_kind() == TokenKind::Colon {
            self.advance();
        }

        let expr = self.parse_expr()?;
        Ok(ObjectiveDecl {
            span: keyword.span.merge(expr.span),
            goal,
            expr,
        })
    }

    /// `subject to`, `st`, each optionally followed by `:`
    fn parse_header(&mut self) -> Result<(), ParseError> {
        if self.peek_kind() == TokenKind::Subject {
            self.advance();
            self.expect(TokenKind::To)?;
        } else {
            self.expect(TokenKind::St)?;
        }
        if self.peek_kind() == TokenKind::Colon {
            self.advance();
        }
        Ok(())
    }

    fn parse_constraint(&mut self) -> Result<ConstraintDecl, ParseError> {
        let lhs = self.parse_expr()?;

        self.skip_comments();
        let op = match self.peek_kind() {
            TokenKind::Le => RelOp::Le,
            TokenKind::Ge => RelOp::Ge,
            TokenKind::Eq => RelOp::Eq,
            _ => return Err(self.unexpected("<=, >= or =")),
        };
        self.advance();

        let rhs = self.parse_expr()?;
        Ok(ConstraintDecl {
            span: lhs.span.merge(rhs.span),
            lhs,
            op,
            rhs,
        })
    }

    fn parse_expr(&mut self) -> Result<LinearExpr, ParseError> {
        let mut terms = Vec::new();

        // Leading sign is optional
        let mut sign = match self.peek_kind() {
            TokenKind::Plus => {
                self.advance();
                1.0
            }
            TokenKind::Minus => {
                self.advance();
                -1.0
            }
            _ => 1.0,
        };

        loop {
            terms.push(self.parse_term(sign)?);

            sign = match self.peek_kind() {
                TokenKind::Plus => 1.0,
                TokenKind::Minus => -1.0,
                _ => break,
            };
            self.advance();
        }

        let span = terms[0].span.merge(terms[terms.len() - 1].span);
        Ok(LinearExpr { span, terms })
    }

    /// `3`, `x`, `3x`, `3*x`, `2.5 y`
    fn parse_term(&mut self, sign: f64) -> Result<Term, ParseError> {
        match self.peek_kind() {
            TokenKind::Number => {
                let Some(token) = self.advance() else {
                    return Err(ParseError::UnexpectedEof);
                };
                let value: f64 = token
                    .text
                    .parse()
                    .map_err(|_| ParseError::InvalidNumber(token.text.clone()))?;

                let has_star = self.peek_kind() == TokenKind::Star;
                if has_star {
                    self.advance();
                }

                if self.peek_kind() == TokenKind::Ident {
                    let var = self.expect(TokenKind::Ident)?;
                    Ok(Term {
                        span: token.span.merge(var.span),
                        coefficient: sign * value,
                        variable: Some(var.text),
                    })
                } else if has_star {
                    Err(self.unexpected("variable"))
                } else {
                    Ok(Term {
                        span: token.span,
                        coefficient: sign * value,
                        variable: None,
                    })
                }
            }
            TokenKind::Ident => {
                let var = self.expect(TokenKind::Ident)?;
                Ok(Term {
                    span: var.span,
                    coefficient: sign,
                    variable: Some(var.text),
                })
            }
            _ => Err(self.unexpected("number or variable")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(expr: &LinearExpr) -> Vec<(f64, Option<&str>)> {
        expr.terms
            .iter()
            .map(|t| (t.coefficient, t.variable.as_deref()))
            .collect()
    }

    #[test]
    fn test_parse_objective() {
        let program = Parser::parse("maximize 3000x + 5000y").unwrap();
        assert_eq!(program.items.len(), 1);
        match &program.items[0] {
            Item::Objective(o) => {
                assert_eq!(o.goal, Goal::Maximize);
                assert_eq!(terms(&o.expr), vec![(3000.0, Some("x")), (5000.0, Some("y"))]);
            }
            _ => panic!("Expected objective"),
        }
    }

    #[test]
    fn test_parse_signs_and_stars() {
        let program = Parser::parse("min: -x - 2*y + 0.5 X").unwrap();
        match &program.items[0] {
            Item::Objective(o) => {
                assert_eq!(o.goal, Goal::Minimize);
                assert_eq!(
                    terms(&o.expr),
                    vec![(-1.0, Some("x")), (-2.0, Some("y")), (0.5, Some("X"))]
                );
            }
            _ => panic!("Expected objective"),
        }
    }

    #[test]
    fn test_parse_constraint() {
        let program = Parser::parse("3x + 2y <= 18").unwrap();
        match &program.items[0] {
            Item::Constraint(c) => {
                assert_eq!(c.op, RelOp::Le);
                assert_eq!(terms(&c.lhs), vec![(3.0, Some("x")), (2.0, Some("y"))]);
                assert_eq!(terms(&c.rhs), vec![(18.0, None)]);
                assert_eq!(c.span, Span::new(0, 13));
            }
            _ => panic!("Expected constraint"),
        }
    }

    #[test]
    fn test_parse_negative_rhs_and_variables_on_right() {
        let program = Parser::parse("x >= -4\nx = y + 1").unwrap();
        assert_eq!(program.items.len(), 2);
        match &program.items[1] {
            Item::Constraint(c) => {
                assert_eq!(c.op, RelOp::Eq);
                assert_eq!(terms(&c.rhs), vec![(1.0, Some("y")), (1.0, None)]);
            }
            _ => panic!("Expected constraint"),
        }
        match &program.items[0] {
            Item::Constraint(c) => assert_eq!(terms(&c.rhs), vec![(-4.0, None)]),
            _ => panic!("Expected constraint"),
        }
    }

    #[test]
    fn test_parse_full_problem() {
        let source = r#"
            # Classic product mix
            maximize 3000x + 5000y
            subject to:
              x <= 4        // plant 1
              2y <= 12
              3x + 2y <= 18
        "#;
        let program = Parser::parse(source).unwrap();
        assert_eq!(program.items.len(), 4);
        assert!(matches!(program.items[0], Item::Objective(_)));
        assert!(program.items[1..].iter().all(|i| matches!(i, Item::Constraint(_))));
    }

    #[test]
    fn test_semicolons_separate_statements() {
        let program = Parser::parse("max x + y; st; x <= 1; y <= 2").unwrap();
        assert_eq!(program.items.len(), 3);
    }

    #[test]
    fn test_missing_relation() {
        let err = Parser::parse("x + y 4").unwrap_err();
        match err {
            ParseError::UnexpectedToken { expected, found, .. } => {
                assert_eq!(expected, "<=, >= or =");
                assert_eq!(found, "'4'");
            }
            other => panic!("Expected unexpected token, got {:?}", other),
        }
    }

    #[test]
    fn test_two_statements_on_one_line() {
        let err = Parser::parse("x <= 4 y <= 2").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_dangling_operator() {
        assert_eq!(Parser::parse("x + y <=").unwrap_err(), ParseError::UnexpectedEof);
        assert!(matches!(Parser::parse("2* <= 4").unwrap_err(), ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_subject_requires_to() {
        assert!(Parser::parse("subject x <= 1").is_err());
    }
}
