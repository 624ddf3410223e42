use crate::ast::Operator;

use super::SyntaxError;

/// One postfix item before operand names are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Item {
    Operator(Operator),
    Operand(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Open,
    Operator(Operator),
}

/// Shunting-yard conversion of one infix expression to postfix.
///
/// Operators have no precedence: a binary operator flushes every pending
/// operator down to the nearest open parenthesis, so `a OR b AND c` groups
/// as `(a OR b) AND c`. `NOT` is a prefix operator and never flushes.
#[derive(Debug, Default)]
pub(crate) struct ExpressionParser {
    output: Vec<Item>,
    pending: Vec<Pending>,
}

impl ExpressionParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(&mut self, token: &str) -> Result<(), SyntaxError> {
        // Parentheses may be glued to operands: `(a`, `b)`, `((a`.
        if token.len() > 1 && token.starts_with('(') {
            self.ingest("(")?;
            return self.ingest(&token[1..]);
        }
        if token.len() > 1 && token.ends_with(')') {
            self.ingest(&token[..token.len() - 1])?;
            return self.ingest(")");
        }

        match token {
            "(" => self.pending.push(Pending::Open),
            ")" => loop {
                match self.pending.pop() {
                    Some(Pending::Operator(op)) => self.output.push(Item::Operator(op)),
                    Some(Pending::Open) => break,
                    None => return Err(SyntaxError::MismatchedParentheses),
                }
            },
            _ => match Operator::from_mnemonic(token) {
                Some(op) => {
                    if op.arity() == 2 {
                        self.flush();
                    }
                    self.pending.push(Pending::Operator(op));
                }
                None => self.output.push(Item::Operand(token.to_owned())),
            },
        }
        Ok(())
    }

    fn flush(&mut self) {
        while let Some(&Pending::Operator(op)) = self.pending.last() {
            self.pending.pop();
            self.output.push(Item::Operator(op));
        }
    }

    pub fn finish(mut self) -> Result<Vec<Item>, SyntaxError> {
        while let Some(pending) = self.pending.pop() {
            match pending {
                Pending::Operator(op) => self.output.push(Item::Operator(op)),
                Pending::Open => return Err(SyntaxError::MismatchedParentheses),
            }
        }
        Ok(self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postfix(source: &str) -> Result<String, SyntaxError> {
        let mut parser = ExpressionParser::new();
        for token in source.split_whitespace() {
            parser.ingest(token)?;
        }
        Ok(parser
            .finish()?
            .into_iter()
            .map(|item| match item {
                Item::Operator(op) => op.mnemonic().to_owned(),
                Item::Operand(name) => name,
            })
            .collect::<Vec<_>>()
            .join(" "))
    }

    #[test]
    fn test_binary_operators_group_left_to_right() {
        assert_eq!(postfix("a OR b AND c").unwrap(), "a b OR c AND");
    }

    #[test]
    fn test_not_is_prefix() {
        assert_eq!(postfix("NOT a AND b").unwrap(), "a NOT b AND");
        assert_eq!(postfix("a AND NOT b").unwrap(), "a b NOT AND");
        assert_eq!(postfix("NOT NOT a").unwrap(), "a NOT NOT");
    }

    #[test]
    fn test_parentheses() {
        assert_eq!(postfix("a OR (b AND c)").unwrap(), "a b c AND OR");
        assert_eq!(postfix("((a XOR b)) NAND c").unwrap(), "a b XOR c NAND");
        assert_eq!(postfix("NOT (a NOR b)").unwrap(), "a b NOR NOT");
    }

    #[test]
    fn test_mismatched_parentheses() {
        assert_eq!(
            postfix("a AND b)"),
            Err(SyntaxError::MismatchedParentheses)
        );
        assert_eq!(
            postfix("(a AND b"),
            Err(SyntaxError::MismatchedParentheses)
        );
    }
}
