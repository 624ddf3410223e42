use std::mem;

use crate::HashMap;
use crate::ast::{Expression, Flipflop, Input, LValue, ModuleDecl, Output, Token};

use super::expression::{ExpressionParser, Item};
use super::{ParserError, SyntaxError};

#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    ModuleName,
    Parameters,
    Inputs,
    Outputs,
    Body,
    AssignTarget,
    Equals(LValue),
    Expression(LValue, ExpressionParser),
}

/// Line-oriented state machine building a [`ModuleDecl`].
///
/// Tokens are whitespace separated; a declaration list (`input ...` or
/// `output ...`) and an assignment body both run to the end of their line.
#[derive(Debug, Default)]
pub(crate) struct ModuleParser {
    state: State,
    decl: ModuleDecl,
    inputs: HashMap<String, Input>,
    outputs: HashMap<String, Output>,
    flipflops: HashMap<u16, Flipflop>,
}

impl ModuleParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest_line(&mut self, line: &str) -> Result<(), SyntaxError> {
        if line.trim_start().starts_with("//") {
            return Ok(());
        }
        for token in line.split([' ', '\t']).filter(|t| !t.is_empty()) {
            self.ingest(token)?;
        }
        self.ingest_newline()
    }

    pub fn finish(self) -> Result<ModuleDecl, ParserError> {
        match self.state {
            State::Idle => Ok(self.decl),
            _ => Err(ParserError::UnexpectedEof),
        }
    }

    fn ingest(&mut self, token: &str) -> Result<(), SyntaxError> {
        match mem::take(&mut self.state) {
            State::Idle => {
                if token != "module" {
                    return Err(SyntaxError::UnexpectedToken(token.to_owned()));
                }
                self.state = State::ModuleName;
            }
            State::ModuleName => {
                self.decl.name = token.trim_end_matches('(').to_owned();
                self.state = State::Parameters;
            }
            State::Parameters => {
                self.state = State::Parameters;
                match token.strip_prefix('(').unwrap_or(token) {
                    "" => {}
                    "clk" => self.decl.clocked = true,
                    "input" => self.state = State::Inputs,
                    "output" => self.state = State::Outputs,
                    ");" => self.state = State::Body,
                    other => return Err(SyntaxError::UnexpectedToken(other.to_owned())),
                }
            }
            State::Inputs => {
                self.declare_input(token.trim_end_matches(','))?;
                self.state = State::Inputs;
            }
            State::Outputs => {
                self.declare_output(token.trim_end_matches(','))?;
                self.state = State::Outputs;
            }
            State::Body => {
                self.state = match token {
                    "endmodule" => State::Idle,
                    "assign" => State::AssignTarget,
                    _ => match flipflop_id(token)? {
                        Some(id) => {
                            if !self.decl.clocked {
                                return Err(SyntaxError::FlipflopInCombinational);
                            }
                            State::Equals(LValue::Flipflop(self.flipflop(id)))
                        }
                        None => return Err(SyntaxError::UnexpectedToken(token.to_owned())),
                    },
                };
            }
            State::AssignTarget => {
                let output = self
                    .outputs
                    .get(token)
                    .copied()
                    .ok_or_else(|| SyntaxError::UnknownOutput(token.to_owned()))?;
                self.state = State::Equals(LValue::Output(output));
            }
            State::Equals(lvalue) => {
                if token != "=" {
                    return Err(SyntaxError::UnexpectedToken(token.to_owned()));
                }
                self.state = State::Expression(lvalue, ExpressionParser::new());
            }
            State::Expression(lvalue, mut parser) => {
                parser.ingest(token)?;
                self.state = State::Expression(lvalue, parser);
            }
        }
        Ok(())
    }

    fn ingest_newline(&mut self) -> Result<(), SyntaxError> {
        match mem::take(&mut self.state) {
            State::Inputs | State::Outputs => self.state = State::Parameters,
            State::Expression(lvalue, parser) => {
                let expression = self.compile(parser.finish()?)?;
                self.decl.assignments.push((lvalue, expression));
                self.state = State::Body;
            }
            other => self.state = other,
        }
        Ok(())
    }

    fn declare_input(&mut self, name: &str) -> Result<(), SyntaxError> {
        if name.is_empty() {
            return Ok(());
        }
        self.check_undeclared(name)?;
        self.inputs
            .insert(name.to_owned(), Input(self.decl.input_names.len()));
        self.decl.input_names.push(name.to_owned());
        Ok(())
    }

    fn declare_output(&mut self, name: &str) -> Result<(), SyntaxError> {
        if name.is_empty() {
            return Ok(());
        }
        self.check_undeclared(name)?;
        self.outputs
            .insert(name.to_owned(), Output(self.decl.output_names.len()));
        self.decl.output_names.push(name.to_owned());
        Ok(())
    }

    fn check_undeclared(&self, name: &str) -> Result<(), SyntaxError> {
        if self.inputs.contains_key(name) || self.outputs.contains_key(name) {
            return Err(SyntaxError::DuplicateDeclaration(name.to_owned()));
        }
        Ok(())
    }

    /// Flip-flops are declared by their first mention.
    fn flipflop(&mut self, id: u16) -> Flipflop {
        let next = Flipflop(self.decl.flipflop_ids.len());
        *self.flipflops.entry(id).or_insert_with(|| {
            self.decl.flipflop_ids.push(id);
            next
        })
    }

    fn compile(&mut self, items: Vec<Item>) -> Result<Expression, SyntaxError> {
        items
            .into_iter()
            .map(|item| match item {
                Item::Operator(op) => Ok(Token::Operator(op)),
                Item::Operand(name) => self.resolve_operand(&name),
            })
            .collect()
    }

    fn resolve_operand(&mut self, name: &str) -> Result<Token, SyntaxError> {
        if let Some(id) = flipflop_id(name)? {
            if !self.decl.clocked {
                return Err(SyntaxError::FlipflopInCombinational);
            }
            return Ok(Token::Flipflop(self.flipflop(id)));
        }
        if let Some(input) = self.inputs.get(name) {
            return Ok(Token::Input(*input));
        }
        if let Some(output) = self.outputs.get(name) {
            return Ok(Token::Output(*output));
        }
        Err(SyntaxError::UnknownVariable(name.to_owned()))
    }
}

/// `FF<digits>` names a flip-flop; `Ok(None)` for any other name.
fn flipflop_id(name: &str) -> Result<Option<u16>, SyntaxError> {
    match name.strip_prefix("FF") {
        Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => digits
            .parse()
            .map(Some)
            .map_err(|_| SyntaxError::InvalidFlipflop(name.to_owned())),
        _ => Ok(None),
    }
}
