use std::fmt;

use log::trace;
use thiserror::Error;

use crate::ast::{Flipflop, Input, LValue, Module, Operator, Output, Token};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("Input size mismatch: expected {expected} values, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("The operand stack is empty")]
    StackUnderflow,

    #[error("The operand stack contains {0} items instead of one")]
    StackNotSingleton(usize),

    #[error("Output #{0} was read before being assigned")]
    UnassignedOutput(usize),

    #[error("Reference to undeclared {0}")]
    UnknownReference(Token),
}

/// The value domain a [`Circuit`] computes over.
///
/// An interpretation decides what a flip-flop holds before the first tick
/// and what an operator does to its operands; everything else (evaluation
/// order, operand lookup and the clock-tick boundary) is shared.
pub trait Interpretation {
    type Value: Clone;

    /// Starting value of each of the `state_size` flip-flops.
    fn initialize(&mut self, state_size: usize) -> Vec<Self::Value>;

    /// Output values reported before the first tick.
    fn initialize_outputs(&mut self, output_size: usize) -> Vec<Self::Value>;

    /// Pops `op.arity()` operands and pushes exactly one result.
    fn on_operator(
        &mut self,
        op: Operator,
        stack: &mut OperandStack<Self::Value>,
    ) -> Result<(), EvalError>;
}

#[derive(Debug, Clone)]
pub struct OperandStack<V> {
    items: Vec<V>,
}

impl<V> OperandStack<V> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, value: V) {
        self.items.push(value);
    }

    pub fn pop(&mut self) -> Result<V, EvalError> {
        self.items.pop().ok_or(EvalError::StackUnderflow)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The single value left once an expression has been consumed.
    fn into_result(mut self) -> Result<V, EvalError> {
        match self.items.len() {
            0 => Err(EvalError::StackUnderflow),
            1 => self.pop(),
            len => Err(EvalError::StackNotSingleton(len)),
        }
    }
}

impl<V> Default for OperandStack<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluates one postfix expression.
pub struct StackMachine<'a, I: Interpretation> {
    expression: &'a [Token],
    stack: OperandStack<I::Value>,
    interpretation: &'a mut I,
}

impl<'a, I: Interpretation> StackMachine<'a, I> {
    pub fn new(expression: &'a [Token], interpretation: &'a mut I) -> Self {
        Self {
            expression,
            stack: OperandStack::new(),
            interpretation,
        }
    }

    /// `outputs` holds the outputs assigned so far in the current tick.
    pub fn evaluate(
        mut self,
        inputs: &[I::Value],
        state: &[I::Value],
        outputs: &[Option<I::Value>],
    ) -> Result<I::Value, EvalError> {
        for &token in self.expression {
            let value = match token {
                Token::Input(Input(idx)) => inputs.get(idx),
                Token::Flipflop(Flipflop(idx)) => state.get(idx),
                Token::Output(Output(idx)) => outputs
                    .get(idx)
                    .map(|value| value.as_ref().ok_or(EvalError::UnassignedOutput(idx)))
                    .transpose()?,
                Token::Operator(op) => {
                    self.interpretation.on_operator(op, &mut self.stack)?;
                    continue;
                }
            };
            let value = value.ok_or(EvalError::UnknownReference(token))?;
            self.stack.push(value.clone());
        }
        self.stack.into_result()
    }
}

/// A resolved [`Module`] together with its runtime state.
///
/// `state` holds the current flip-flop values and persists across ticks;
/// `outputs` is recomputed from scratch by every [`Circuit::evaluate`] call.
/// Both start out as supplied by the [`Interpretation`].
pub struct Circuit<I: Interpretation> {
    module: Module,
    state: Vec<I::Value>,
    outputs: Vec<I::Value>,
    interpretation: I,
}

impl<I: Interpretation> fmt::Debug for Circuit<I>
where
    I::Value: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Circuit")
            .field("module", &self.module.name())
            .field("state", &self.state)
            .field("outputs", &self.outputs)
            .finish()
    }
}

impl<I: Interpretation> Circuit<I> {
    pub fn new(module: Module, mut interpretation: I) -> Self {
        let state = interpretation.initialize(module.state_size());
        let outputs = interpretation.initialize_outputs(module.output_size());
        Self {
            module,
            state,
            outputs,
            interpretation,
        }
    }

    /// Runs one tick.
    ///
    /// Assignments are evaluated in module order against the pre-tick
    /// flip-flop values; the next state only becomes visible once every
    /// assignment has been evaluated. On error neither the state nor the
    /// outputs are modified.
    pub fn evaluate(&mut self, inputs: &[I::Value]) -> Result<(), EvalError> {
        if inputs.len() != self.module.input_size() {
            return Err(EvalError::SizeMismatch {
                expected: self.module.input_size(),
                actual: inputs.len(),
            });
        }

        let mut next_state = self.state.clone();
        let mut outputs: Vec<Option<I::Value>> = vec![None; self.module.output_size()];
        for assignment in self.module.assignments() {
            trace!("evaluating {}", self.module.name_of(assignment.lvalue.into()));
            let value = StackMachine::new(&assignment.expression, &mut self.interpretation)
                .evaluate(inputs, &self.state, &outputs)?;
            match assignment.lvalue {
                LValue::Output(Output(idx)) => outputs[idx] = Some(value),
                LValue::Flipflop(Flipflop(idx)) => next_state[idx] = value,
            }
        }

        self.outputs = outputs
            .into_iter()
            .enumerate()
            .map(|(idx, value)| value.ok_or(EvalError::UnassignedOutput(idx)))
            .collect::<Result<_, _>>()?;
        // Clock tick: latch every flip-flop at once.
        self.state = next_state;
        Ok(())
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn state(&self) -> &[I::Value] {
        &self.state
    }

    /// One value per declared output: the last tick's results, or the
    /// interpretation's initial outputs before the first tick.
    pub fn outputs(&self) -> &[I::Value] {
        &self.outputs
    }

    pub fn interpretation(&self) -> &I {
        &self.interpretation
    }

    pub fn into_interpretation(self) -> I {
        self.interpretation
    }
}
