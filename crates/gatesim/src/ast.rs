use std::fmt;

use thiserror::Error;

use crate::HashSet;
use crate::scheduler::{self, SchedulerError};

/// Single-bit logic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Not,
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Xnor,
}

impl Operator {
    pub const ALL: [Operator; 7] = [
        Operator::Not,
        Operator::And,
        Operator::Or,
        Operator::Xor,
        Operator::Nand,
        Operator::Nor,
        Operator::Xnor,
    ];

    /// Number of operands popped when the operator is evaluated.
    pub fn arity(self) -> usize {
        match self {
            Operator::Not => 1,
            Operator::And
            | Operator::Or
            | Operator::Xor
            | Operator::Nand
            | Operator::Nor
            | Operator::Xnor => 2,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Operator::Not => "NOT",
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Xor => "XOR",
            Operator::Nand => "NAND",
            Operator::Nor => "NOR",
            Operator::Xnor => "XNOR",
        }
    }

    /// Resolves an upper-case mnemonic such as `XNOR`.
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.mnemonic() == name)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Index into the input list of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Input(pub usize);

/// Index into the output list of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Output(pub usize);

/// Index into the flip-flop list of a module. This is the slot, not the
/// numeric id that appears in `FF<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Flipflop(pub usize);

/// One element of a postfix expression.
///
/// References of different kinds never compare equal, even when they share
/// the same index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Operator(Operator),
    Input(Input),
    Output(Output),
    Flipflop(Flipflop),
}

impl From<Operator> for Token {
    fn from(op: Operator) -> Self {
        Token::Operator(op)
    }
}

impl From<Input> for Token {
    fn from(input: Input) -> Self {
        Token::Input(input)
    }
}

impl From<Output> for Token {
    fn from(output: Output) -> Self {
        Token::Output(output)
    }
}

impl From<Flipflop> for Token {
    fn from(ff: Flipflop) -> Self {
        Token::Flipflop(ff)
    }
}

impl From<LValue> for Token {
    fn from(lvalue: LValue) -> Self {
        match lvalue {
            LValue::Output(output) => Token::Output(output),
            LValue::Flipflop(ff) => Token::Flipflop(ff),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Operator(op) => write!(f, "{op}"),
            Token::Input(Input(idx)) => write!(f, "input #{idx}"),
            Token::Output(Output(idx)) => write!(f, "output #{idx}"),
            Token::Flipflop(Flipflop(idx)) => write!(f, "flip-flop #{idx}"),
        }
    }
}

/// The assignable subset of [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LValue {
    Output(Output),
    Flipflop(Flipflop),
}

impl From<Output> for LValue {
    fn from(output: Output) -> Self {
        LValue::Output(output)
    }
}

impl From<Flipflop> for LValue {
    fn from(ff: Flipflop) -> Self {
        LValue::Flipflop(ff)
    }
}

/// Postfix token sequence, evaluated front to back.
pub type Expression = Vec<Token>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub lvalue: LValue,
    pub expression: Expression,
}

impl Assignment {
    pub fn new(lvalue: impl Into<LValue>, expression: Expression) -> Self {
        Self {
            lvalue: lvalue.into(),
            expression,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModuleError {
    #[error("`{0}` was already declared")]
    DuplicateDeclaration(String),

    #[error("`{0}` is assigned more than once")]
    DuplicateAssignment(String),

    #[error("reference to undeclared {0}")]
    UnknownReference(Token),

    #[error("output `{0}` is never assigned")]
    UnassignedOutput(String),

    #[error("the expression assigned to `{0}` is empty")]
    EmptyExpression(String),

    #[error("flip-flop found in a combinational (unclocked) module")]
    FlipflopInCombinational,

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

/// A circuit description before its assignments have been ordered.
///
/// This is what a front end produces; [`Module::resolve`] validates it and
/// turns it into an evaluable [`Module`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleDecl {
    pub name: String,
    pub clocked: bool,
    pub input_names: Vec<String>,
    pub flipflop_ids: Vec<u16>,
    pub output_names: Vec<String>,
    pub assignments: Vec<(LValue, Expression)>,
}

/// Immutable circuit description whose assignment list is in evaluation
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    name: String,
    clocked: bool,
    input_names: Vec<String>,
    flipflop_ids: Vec<u16>,
    output_names: Vec<String>,
    assignments: Vec<Assignment>,
}

impl Module {
    /// Validates a declaration and orders its assignments.
    ///
    /// Every declared output must be assigned exactly once; flip-flops may be
    /// left undriven, in which case they hold their value across ticks.
    pub fn resolve(decl: ModuleDecl) -> Result<Self, ModuleError> {
        let ModuleDecl {
            name,
            clocked,
            input_names,
            flipflop_ids,
            output_names,
            assignments,
        } = decl;

        let mut module = Module {
            name,
            clocked,
            input_names,
            flipflop_ids,
            output_names,
            assignments: Vec::new(),
        };
        module.check_declarations()?;

        let mut assigned: HashSet<LValue> = HashSet::default();
        for (lvalue, expression) in &assignments {
            module.check_reference(Token::from(*lvalue))?;
            if !assigned.insert(*lvalue) {
                return Err(ModuleError::DuplicateAssignment(
                    module.name_of(Token::from(*lvalue)),
                ));
            }
            if expression.is_empty() {
                return Err(ModuleError::EmptyExpression(
                    module.name_of(Token::from(*lvalue)),
                ));
            }
            for token in expression {
                module.check_reference(*token)?;
            }
        }
        if let Some(unassigned) = (0..module.output_size())
            .map(Output)
            .find(|output| !assigned.contains(&LValue::Output(*output)))
        {
            return Err(ModuleError::UnassignedOutput(
                module.output_names[unassigned.0].clone(),
            ));
        }

        module.assignments = scheduler::schedule(
            module.input_size(),
            module.state_size(),
            assignments,
        )?;
        Ok(module)
    }

    fn check_declarations(&self) -> Result<(), ModuleError> {
        if !self.clocked && !self.flipflop_ids.is_empty() {
            return Err(ModuleError::FlipflopInCombinational);
        }
        let mut names: HashSet<&str> = HashSet::default();
        for name in self.input_names.iter().chain(&self.output_names) {
            if !names.insert(name.as_str()) {
                return Err(ModuleError::DuplicateDeclaration(name.clone()));
            }
        }
        let mut ids: HashSet<u16> = HashSet::default();
        for &id in &self.flipflop_ids {
            if !ids.insert(id) {
                return Err(ModuleError::DuplicateDeclaration(format!("FF{id}")));
            }
        }
        Ok(())
    }

    fn check_reference(&self, token: Token) -> Result<(), ModuleError> {
        let in_bounds = match token {
            Token::Operator(_) => true,
            Token::Input(Input(idx)) => idx < self.input_size(),
            Token::Output(Output(idx)) => idx < self.output_size(),
            Token::Flipflop(Flipflop(idx)) => idx < self.state_size(),
        };
        if in_bounds {
            Ok(())
        } else {
            Err(ModuleError::UnknownReference(token))
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_clocked(&self) -> bool {
        self.clocked
    }

    pub fn input_names(&self) -> &[String] {
        &self.input_names
    }

    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    pub fn flipflop_ids(&self) -> &[u16] {
        &self.flipflop_ids
    }

    /// Assignments in evaluation order.
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn input_size(&self) -> usize {
        self.input_names.len()
    }

    pub fn state_size(&self) -> usize {
        self.flipflop_ids.len()
    }

    pub fn output_size(&self) -> usize {
        self.output_names.len()
    }

    /// Human-readable name of a token: the declared input/output name,
    /// `FF<id>` for flip-flops and the mnemonic for operators.
    pub fn name_of(&self, token: Token) -> String {
        match token {
            Token::Operator(op) => op.mnemonic().to_owned(),
            Token::Input(Input(idx)) => self.input_names[idx].clone(),
            Token::Output(Output(idx)) => self.output_names[idx].clone(),
            Token::Flipflop(Flipflop(idx)) => format!("FF{}", self.flipflop_ids[idx]),
        }
    }
}
