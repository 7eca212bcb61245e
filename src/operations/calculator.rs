use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(Decimal),
    Plus,
    Minus,
    Star,
    Slash,
    OpenParen,
    CloseParen,
}

/// Evaluates a basic arithmetic expression (`+ - * /` and parentheses) over
/// decimal numbers. Anything outside that character set is rejected rather
/// than guessed at, and division by zero is an error, never a panic.
pub fn evaluate(input: &str) -> Result<Decimal, String> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err("Nothing to calculate.".to_string());
    }
    let mut parser = Parser {
        tokens,
        position: 0,
        depth: 0,
    };
    let value = parser.parse_expression()?;
    if parser.position != parser.tokens.len() {
        return Err("Unexpected trailing input.".to_string());
    }
    Ok(value)
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            ' ' | '\t' => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '(' => {
                chars.next();
                tokens.push(Token::OpenParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::CloseParen);
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        literal.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let number = literal
                    .parse::<Decimal>()
                    .map_err(|_| format!("Invalid number '{}'.", literal))?;
                tokens.push(Token::Number(number));
            }
            other => {
                return Err(format!("Unsupported character '{}'.", other));
            }
        }
    }

    Ok(tokens)
}

// Keeps pathological nesting a reported error instead of a stack overflow.
const MAX_DEPTH: usize = 100;

struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn enter(&mut self) -> Result<(), String> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err("Expression is nested too deeply.".to_string());
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn parse_expression(&mut self) -> Result<Decimal, String> {
        let mut value = self.parse_term()?;
        while let Some(token) = self.peek() {
            match token {
                Token::Plus => {
                    self.next();
                    let rhs = self.parse_term()?;
                    value = value
                        .checked_add(rhs)
                        .ok_or_else(|| "Result out of range.".to_string())?;
                }
                Token::Minus => {
                    self.next();
                    let rhs = self.parse_term()?;
                    value = value
                        .checked_sub(rhs)
                        .ok_or_else(|| "Result out of range.".to_string())?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn parse_term(&mut self) -> Result<Decimal, String> {
        let mut value = self.parse_factor()?;
        while let Some(token) = self.peek() {
            match token {
                Token::Star => {
                    self.next();
                    let rhs = self.parse_factor()?;
                    value = value
                        .checked_mul(rhs)
                        .ok_or_else(|| "Result out of range.".to_string())?;
                }
                Token::Slash => {
                    self.next();
                    let rhs = self.parse_factor()?;
                    if rhs.is_zero() {
                        return Err("Division by zero.".to_string());
                    }
                    value = value
                        .checked_div(rhs)
                        .ok_or_else(|| "Result out of range.".to_string())?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn parse_factor(&mut self) -> Result<Decimal, String> {
        self.enter()?;
        let result = match self.next() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::Minus) => self.parse_factor().map(|value| -value),
            Some(Token::OpenParen) => {
                let value = self.parse_expression()?;
                match self.next() {
                    Some(Token::CloseParen) => Ok(value),
                    _ => Err("Missing closing parenthesis.".to_string()),
                }
            }
            Some(token) => Err(format!("Unexpected token {:?}.", token)),
            None => Err("Expression ended unexpectedly.".to_string()),
        };
        self.leave();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn eval(input: &str) -> Decimal {
        evaluate(input).unwrap()
    }

    #[test]
    fn test_precedence_and_parentheses() {
        assert_eq!(eval("2+3*4"), Decimal::from_str("14").unwrap());
        assert_eq!(eval("(2+3)*4"), Decimal::from_str("20").unwrap());
        assert_eq!(eval("10 - 2 - 3"), Decimal::from_str("5").unwrap());
    }

    #[test]
    fn test_decimal_division() {
        assert_eq!(eval("10/4"), Decimal::from_str("2.5").unwrap());
        assert_eq!(eval("1.5 * 2"), Decimal::from_str("3.0").unwrap());
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(eval("-3 + 5"), Decimal::from_str("2").unwrap());
        assert_eq!(eval("2 * -4"), Decimal::from_str("-8").unwrap());
    }

    #[test]
    fn test_division_by_zero() {
        let result = evaluate("1/0");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Division by zero"));
    }

    #[test]
    fn test_rejects_unsupported_characters() {
        let result = evaluate("1 + x");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Unsupported character"));
    }

    #[test]
    fn test_rejects_excessive_nesting() {
        let deep_parens = format!("{}1{}", "(".repeat(5000), ")".repeat(5000));
        let result = evaluate(&deep_parens);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("nested too deeply"));

        let deep_negation = format!("{}1", "-".repeat(5000));
        let result = evaluate(&deep_negation);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("nested too deeply"));

        // Ordinary nesting still well within the limit.
        assert_eq!(evaluate("((((1+2))))").unwrap(), Decimal::from_str("3").unwrap());
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert!(evaluate("").is_err());
        assert!(evaluate("1.2.3").is_err());
        assert!(evaluate("(1+2").is_err());
        assert!(evaluate("1 2").is_err());
        assert!(evaluate("+").is_err());
    }
}
