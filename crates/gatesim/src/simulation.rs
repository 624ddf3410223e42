use std::io::{BufRead, Write};

use log::debug;
use thiserror::Error;

use crate::TruthValue;
use crate::ast::{Module, Operator};
use crate::engine::{Circuit, EvalError, Interpretation, OperandStack};

/// Bit-level simulation over [`TruthValue`]. Flip-flops power up as `X`, and
/// so do the outputs until the first tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeValued;

impl Interpretation for ThreeValued {
    type Value = TruthValue;

    fn initialize(&mut self, state_size: usize) -> Vec<TruthValue> {
        vec![TruthValue::X; state_size]
    }

    fn initialize_outputs(&mut self, output_size: usize) -> Vec<TruthValue> {
        vec![TruthValue::X; output_size]
    }

    fn on_operator(
        &mut self,
        op: Operator,
        stack: &mut OperandStack<TruthValue>,
    ) -> Result<(), EvalError> {
        let result = match op {
            Operator::Not => !stack.pop()?,
            Operator::And => stack.pop()? & stack.pop()?,
            Operator::Or => stack.pop()? | stack.pop()?,
            Operator::Xor => stack.pop()? ^ stack.pop()?,
            Operator::Nand => !(stack.pop()? & stack.pop()?),
            Operator::Nor => !(stack.pop()? | stack.pop()?),
            Operator::Xnor => !(stack.pop()? ^ stack.pop()?),
        };
        stack.push(result);
        Ok(())
    }
}

pub type Simulator = Circuit<ThreeValued>;

impl Circuit<ThreeValued> {
    pub fn simulator(module: Module) -> Self {
        Circuit::new(module, ThreeValued)
    }
}

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid input vector (line {line}): {source}")]
    InvalidVector {
        line: usize,
        #[source]
        source: VectorError,
    },

    #[error("Evaluation failed (line {line}): {source}")]
    Eval {
        line: usize,
        #[source]
        source: EvalError,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VectorError {
    #[error("expected {expected} bits, got {actual}")]
    Width { expected: usize, actual: usize },

    #[error("unexpected character {0:?}, inputs are `0` or `1`")]
    InvalidBit(char),
}

/// Parses one input vector: one `0`/`1` character per input.
pub fn parse_vector(line: &str, width: usize) -> Result<Vec<TruthValue>, VectorError> {
    let line = line.trim_end_matches('\r');
    let actual = line.chars().count();
    if actual != width {
        return Err(VectorError::Width {
            expected: width,
            actual,
        });
    }
    line.chars()
        .map(|c| match c {
            '0' => Ok(TruthValue::False),
            '1' => Ok(TruthValue::True),
            other => Err(VectorError::InvalidBit(other)),
        })
        .collect()
}

/// Runs one tick per line of `vectors`, writing one line of output bits per
/// tick. Returns the number of ticks simulated.
pub fn simulate<R: BufRead, W: Write>(
    module: Module,
    vectors: R,
    out: &mut W,
) -> Result<usize, SimulationError> {
    let width = module.input_size();
    let mut sim = Simulator::simulator(module);
    let mut ticks = 0;
    for (idx, line) in vectors.lines().enumerate() {
        let line_number = idx + 1;
        let line = line?;
        let inputs =
            parse_vector(&line, width).map_err(|source| SimulationError::InvalidVector {
                line: line_number,
                source,
            })?;
        sim.evaluate(&inputs)
            .map_err(|source| SimulationError::Eval {
                line: line_number,
                source,
            })?;
        let bits: String = sim.outputs().iter().map(|v| v.to_char()).collect();
        writeln!(out, "{bits}")?;
        ticks += 1;
    }
    debug!("simulated {ticks} ticks");
    Ok(ticks)
}
