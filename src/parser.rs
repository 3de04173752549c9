use crate::ast::*;
use crate::error::{Error, Result};
use crate::lexer::Token;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, current: 0 }
    }

    fn current_token(&self) -> &Token {
        self.tokens.get(self.current).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        self.current += 1;
        token
    }

    fn expect(&mut self, expected: Token, statement: &'static str) -> Result<()> {
        if *self.current_token() == expected {
            self.current += 1;
            Ok(())
        } else {
            Err(Error::malformed(
                statement,
                format!("expected {:?}, found {:?}", expected, self.current_token()),
            ))
        }
    }

    fn expect_identifier(&mut self, statement: &'static str, what: &str) -> Result<String> {
        match self.advance() {
            Token::Identifier(name) => Ok(name),
            other => Err(Error::malformed(
                statement,
                format!("expected {}, found {:?}", what, other),
            )),
        }
    }

    /// A statement may end with an optional semicolon; anything else left
    /// over means the text did not match the supported shape.
    fn expect_end(&mut self, statement: &'static str) -> Result<()> {
        if *self.current_token() == Token::Semicolon {
            self.advance();
        }
        if *self.current_token() == Token::Eof {
            Ok(())
        } else {
            Err(Error::malformed(
                statement,
                format!("unexpected trailing {:?}", self.current_token()),
            ))
        }
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.current_token() {
            Token::Select => self.parse_select(),
            Token::Insert => self.parse_insert(),
            Token::Update => self.parse_update(),
            Token::Delete => self.parse_delete(),
            other => Err(Error::UnsupportedQuery(format!(
                "statement must start with SELECT, INSERT, UPDATE, or DELETE, found {:?}",
                other
            ))),
        }
    }

    fn parse_insert(&mut self) -> Result<Statement> {
        const STMT: &str = "INSERT";
        self.expect(Token::Insert, STMT)?;
        self.expect(Token::Into, STMT)?;
        let table = self.expect_identifier(STMT, "table name")?;

        self.expect(Token::LeftParen, STMT)?;
        let mut columns = Vec::new();
        loop {
            columns.push(self.expect_identifier(STMT, "column name")?);
            if *self.current_token() == Token::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(Token::RightParen, STMT)?;

        self.expect(Token::Values, STMT)?;
        self.expect(Token::LeftParen, STMT)?;
        loop {
            match self.advance() {
                Token::Placeholder(_) => {}
                other => {
                    return Err(Error::malformed(
                        STMT,
                        format!("expected placeholder in VALUES list, found {:?}", other),
                    ));
                }
            }
            if *self.current_token() == Token::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(Token::RightParen, STMT)?;

        // ON CONFLICT and RETURNING are recognized but have no effect:
        // insertion always appends and always returns the new row.
        if *self.current_token() == Token::On {
            self.advance();
            self.expect(Token::Conflict, STMT)?;
            while !matches!(
                self.current_token(),
                Token::Returning | Token::Semicolon | Token::Eof
            ) {
                self.advance();
            }
        }
        if *self.current_token() == Token::Returning {
            while !matches!(self.current_token(), Token::Semicolon | Token::Eof) {
                self.advance();
            }
        }
        self.expect_end(STMT)?;

        Ok(Statement::Insert(InsertStatement { table, columns }))
    }

    fn parse_update(&mut self) -> Result<Statement> {
        const STMT: &str = "UPDATE";
        self.expect(Token::Update, STMT)?;
        let table = self.expect_identifier(STMT, "table name")?;
        self.expect(Token::Set, STMT)?;

        let mut assignments = Vec::new();
        loop {
            let column = self.expect_identifier(STMT, "column name")?;
            self.expect(Token::Equal, STMT)?;
            let value = match self.advance() {
                Token::Placeholder(_) => SetValue::Param,
                Token::Now => {
                    self.expect(Token::LeftParen, STMT)?;
                    self.expect(Token::RightParen, STMT)?;
                    SetValue::Now
                }
                other => {
                    return Err(Error::malformed(
                        STMT,
                        format!("expected placeholder or NOW() in SET, found {:?}", other),
                    ));
                }
            };
            assignments.push(Assignment { column, value });

            if *self.current_token() == Token::Comma {
                self.advance();
            } else {
                break;
            }
        }

        self.expect(Token::Where, STMT)?;
        let where_column = self.expect_identifier(STMT, "column name in WHERE")?;
        self.expect(Token::Equal, STMT)?;
        match self.advance() {
            Token::Placeholder(_) => {}
            other => {
                return Err(Error::malformed(
                    STMT,
                    format!("expected placeholder in WHERE, found {:?}", other),
                ));
            }
        }
        self.expect_end(STMT)?;

        Ok(Statement::Update(UpdateStatement {
            table,
            assignments,
            where_column,
        }))
    }

    fn parse_select(&mut self) -> Result<Statement> {
        const STMT: &str = "SELECT";
        self.expect(Token::Select, STMT)?;

        // The select list is not interpreted; every statement returns whole
        // rows. Skip to FROM.
        while !matches!(self.current_token(), Token::From | Token::Eof) {
            self.advance();
        }
        self.expect(Token::From, STMT)?;
        let table = self.expect_identifier(STMT, "table name")?;

        let mut joins = Vec::new();
        while *self.current_token() == Token::Left {
            self.advance();
            self.expect(Token::Join, STMT)?;
            let join_table = self.expect_identifier(STMT, "table name after JOIN")?;
            let alias = if let Token::Identifier(name) = self.current_token() {
                let name = name.clone();
                self.advance();
                Some(name)
            } else {
                None
            };
            self.expect(Token::On, STMT)?;
            let left = self.expect_identifier(STMT, "column reference in ON")?;
            self.expect(Token::Equal, STMT)?;
            let right = self.expect_identifier(STMT, "column reference in ON")?;
            joins.push(JoinClause {
                table: join_table,
                alias,
                left,
                right,
            });
        }

        let mut where_clause = Vec::new();
        if *self.current_token() == Token::Where {
            self.advance();
            where_clause = self.parse_where_terms();
        }

        let mut group_by = Vec::new();
        if *self.current_token() == Token::Group {
            self.advance();
            self.expect(Token::By, STMT)?;
            loop {
                group_by.push(self.expect_identifier(STMT, "column name in GROUP BY")?);
                if *self.current_token() == Token::Comma {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        let mut order_by = None;
        if *self.current_token() == Token::Order {
            self.advance();
            self.expect(Token::By, STMT)?;
            let column = self.expect_identifier(STMT, "column name in ORDER BY")?;
            let descending = match self.current_token() {
                Token::Asc => {
                    self.advance();
                    false
                }
                Token::Desc => {
                    self.advance();
                    true
                }
                _ => false,
            };
            order_by = Some(OrderBy { column, descending });
        }
        self.expect_end(STMT)?;

        Ok(Statement::Select(SelectStatement {
            table,
            joins,
            where_clause,
            group_by,
            order_by,
        }))
    }

    /// WHERE is split on AND. A fragment of shape `<col> = $n` becomes an
    /// equality term; any other fragment is carried as a vacuous term that
    /// filters nothing and consumes no parameter.
    fn parse_where_terms(&mut self) -> Vec<WhereTerm> {
        let mut terms = Vec::new();
        loop {
            let mut fragment = Vec::new();
            while !matches!(
                self.current_token(),
                Token::And | Token::Group | Token::Order | Token::Semicolon | Token::Eof
            ) {
                fragment.push(self.advance());
            }
            terms.push(match fragment.as_slice() {
                [Token::Identifier(column), Token::Equal, Token::Placeholder(_)] => {
                    WhereTerm::Eq {
                        column: column.clone(),
                    }
                }
                _ => WhereTerm::Vacuous,
            });
            if *self.current_token() == Token::And {
                self.advance();
            } else {
                break;
            }
        }
        terms
    }

    fn parse_delete(&mut self) -> Result<Statement> {
        const STMT: &str = "DELETE";
        self.expect(Token::Delete, STMT)?;
        self.expect(Token::From, STMT)?;
        let table = self.expect_identifier(STMT, "table name")?;

        // Only `WHERE <col> = $1` is recognized. Any other remainder is
        // swallowed and the statement deletes nothing.
        let mut rest = Vec::new();
        while !matches!(self.current_token(), Token::Semicolon | Token::Eof) {
            rest.push(self.advance());
        }
        let filter_column = match rest.as_slice() {
            [
                Token::Where,
                Token::Identifier(column),
                Token::Equal,
                Token::Placeholder(_),
            ] => Some(column.clone()),
            _ => None,
        };
        self.expect_end(STMT)?;

        Ok(Statement::Delete(DeleteStatement {
            table,
            filter_column,
        }))
    }
}

pub fn parse(tokens: Vec<Token>) -> Result<Statement> {
    let mut parser = Parser::new(tokens);
    parser.parse_statement()
}
