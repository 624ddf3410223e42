//! Gate-level modelling of small single-bit circuits.
//!
//! A circuit is described by a [`Module`]: named inputs and outputs, a set of
//! flip-flops and one postfix [`Expression`] per output or flip-flop. The
//! assignments of a module are kept in a valid evaluation order, established
//! once by [`schedule`] when the module is resolved.
//!
//! The same resolved module drives two interpretations of the generic
//! [`Circuit`] engine:
//!
//! - [`ThreeValued`] simulates the circuit over `{0, 1, X}` one tick per
//!   input vector.
//! - [`GraphBuilder`] materializes the expression graph, which
//!   [`analyze`] walks to compute logic cones and extremal paths.
//!
//! ```
//! use gatesim::{Simulator, TruthValue};
//!
//! let module = gatesim::parse(
//!     "module top (\n\
//!      input a, b\n\
//!      output y\n\
//!      );\n\
//!      assign y = a AND b\n\
//!      endmodule\n",
//! )
//! .unwrap();
//!
//! let mut sim = Simulator::simulator(module);
//! sim.evaluate(&[TruthValue::False, TruthValue::True]).unwrap();
//! assert_eq!(sim.outputs(), &[TruthValue::False]);
//! ```

mod analysis;
mod ast;
mod engine;
mod parser;
mod scheduler;
mod simulation;
mod truth_value;

pub(crate) use fxhash::FxHashMap as HashMap;
pub(crate) use fxhash::FxHashSet as HashSet;

pub use analysis::{
    Analysis, GraphBuilder, GraphWalker, LogicCone, Node, NodeArena, NodeId, Path,
    PathExtremes, analyze,
};
pub use ast::{
    Assignment, Expression, Flipflop, Input, LValue, Module, ModuleDecl, ModuleError, Operator,
    Output, Token,
};
pub use engine::{Circuit, EvalError, Interpretation, OperandStack, StackMachine};
pub use parser::{ParserError, SyntaxError, parse, parse_decl};
pub use scheduler::{SchedulerError, schedule};
pub use simulation::{
    SimulationError, Simulator, ThreeValued, VectorError, parse_vector, simulate,
};
pub use truth_value::TruthValue;
