use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Select,
    From,
    Where,
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,
    And,
    Order,
    Group,
    By,
    Asc,
    Desc,
    Left,
    Join,
    On,
    Now,
    Conflict,
    Returning,
    Null,

    Identifier(String),
    Number(i64),
    Float(f64),
    StringLiteral(String),
    /// Positional parameter reference: `$1`, `$2`, ...
    Placeholder(u32),

    LeftParen,
    RightParen,
    Comma,
    Semicolon,
    Star,
    Dot,

    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,

    Eof,
}

pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            ' ' | '\t' | '\n' | '\r' => {
                chars.next();
            }
            '(' => {
                tokens.push(Token::LeftParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RightParen);
                chars.next();
            }
            ',' => {
                tokens.push(Token::Comma);
                chars.next();
            }
            ';' => {
                tokens.push(Token::Semicolon);
                chars.next();
            }
            '*' => {
                tokens.push(Token::Star);
                chars.next();
            }
            '=' => {
                tokens.push(Token::Equal);
                chars.next();
            }
            '<' => {
                chars.next();
                if let Some(&'=') = chars.peek() {
                    tokens.push(Token::LessThanOrEqual);
                    chars.next();
                } else if let Some(&'>') = chars.peek() {
                    tokens.push(Token::NotEqual);
                    chars.next();
                } else {
                    tokens.push(Token::LessThan);
                }
            }
            '>' => {
                chars.next();
                if let Some(&'=') = chars.peek() {
                    tokens.push(Token::GreaterThanOrEqual);
                    chars.next();
                } else {
                    tokens.push(Token::GreaterThan);
                }
            }
            '!' => {
                chars.next();
                if let Some(&'=') = chars.peek() {
                    tokens.push(Token::NotEqual);
                    chars.next();
                } else {
                    return Err(Error::UnexpectedCharacter('!'));
                }
            }
            '$' => {
                chars.next();
                let digits = read_number(&mut chars);
                match digits.parse::<u32>() {
                    Ok(n) if !digits.contains('.') => tokens.push(Token::Placeholder(n)),
                    _ => return Err(Error::UnexpectedCharacter('$')),
                }
            }
            '\'' => {
                chars.next();
                let string_val = read_string(&mut chars, '\'')?;
                tokens.push(Token::StringLiteral(string_val));
            }
            '"' => {
                chars.next();
                let string_val = read_string(&mut chars, '"')?;
                tokens.push(Token::StringLiteral(string_val));
            }
            '-' => {
                chars.next();
                match chars.peek() {
                    Some(&next_ch) if next_ch.is_ascii_digit() => {
                        let num = read_number(&mut chars);
                        push_number(&mut tokens, &num, true);
                    }
                    _ => return Err(Error::UnexpectedCharacter('-')),
                }
            }
            _ if ch.is_ascii_digit() => {
                let num = read_number(&mut chars);
                push_number(&mut tokens, &num, false);
            }
            _ if ch.is_ascii_alphabetic() || ch == '_' => {
                let ident = read_identifier(&mut chars);
                tokens.push(match_keyword(&ident));
            }
            '.' => {
                // Qualified names like `sp.session_id` fold into a single
                // identifier so join conditions stay one token per side.
                if let Some(Token::Identifier(last_ident)) = tokens.last_mut() {
                    chars.next();
                    if let Some(&next_ch) = chars.peek() {
                        if next_ch.is_ascii_alphanumeric() || next_ch == '_' {
                            let rest = read_identifier(&mut chars);
                            last_ident.push('.');
                            last_ident.push_str(&rest);
                        } else {
                            tokens.push(Token::Dot);
                        }
                    } else {
                        tokens.push(Token::Dot);
                    }
                } else {
                    tokens.push(Token::Dot);
                    chars.next();
                }
            }
            _ => {
                return Err(Error::UnexpectedCharacter(ch));
            }
        }
    }

    tokens.push(Token::Eof);
    Ok(tokens)
}

fn push_number(tokens: &mut Vec<Token>, num: &str, negative: bool) {
    let sign = if negative { -1.0 } else { 1.0 };
    if num.contains('.') {
        if let Ok(f) = num.parse::<f64>() {
            tokens.push(Token::Float(sign * f));
        }
    } else if let Ok(n) = num.parse::<i64>() {
        tokens.push(Token::Number(if negative { -n } else { n }));
    }
}

fn read_identifier(chars: &mut std::iter::Peekable<std::str::Chars>) -> String {
    let mut ident = String::new();
    while let Some(&ch) = chars.peek() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            ident.push(ch);
            chars.next();
        } else {
            break;
        }
    }
    ident
}

fn read_number(chars: &mut std::iter::Peekable<std::str::Chars>) -> String {
    let mut num = String::new();
    let mut has_dot = false;

    while let Some(&ch) = chars.peek() {
        if ch.is_ascii_digit() {
            num.push(ch);
            chars.next();
        } else if ch == '.' && !has_dot {
            has_dot = true;
            num.push(ch);
            chars.next();
        } else {
            break;
        }
    }
    num
}

fn read_string(
    chars: &mut std::iter::Peekable<std::str::Chars>,
    delimiter: char,
) -> Result<String> {
    let mut string_val = String::new();
    let mut escaped = false;

    while let Some(&ch) = chars.peek() {
        chars.next();

        if escaped {
            string_val.push(ch);
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == delimiter {
            return Ok(string_val);
        } else {
            string_val.push(ch);
        }
    }

    Err(Error::UnterminatedString)
}

fn match_keyword(ident: &str) -> Token {
    match ident.to_uppercase().as_str() {
        "SELECT" => Token::Select,
        "FROM" => Token::From,
        "WHERE" => Token::Where,
        "INSERT" => Token::Insert,
        "INTO" => Token::Into,
        "VALUES" => Token::Values,
        "UPDATE" => Token::Update,
        "SET" => Token::Set,
        "DELETE" => Token::Delete,
        "AND" => Token::And,
        "ORDER" => Token::Order,
        "GROUP" => Token::Group,
        "BY" => Token::By,
        "ASC" => Token::Asc,
        "DESC" => Token::Desc,
        "LEFT" => Token::Left,
        "JOIN" => Token::Join,
        "ON" => Token::On,
        "NOW" => Token::Now,
        "CONFLICT" => Token::Conflict,
        "RETURNING" => Token::Returning,
        "NULL" => Token::Null,
        _ => Token::Identifier(ident.to_string()),
    }
}
