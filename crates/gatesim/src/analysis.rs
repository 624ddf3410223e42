mod graph;
mod walker;

use itertools::Itertools;
use log::debug;

pub use graph::{GraphBuilder, Node, NodeArena, NodeId};
pub use walker::{GraphWalker, LogicCone, Path, PathExtremes};

use crate::HashMap;
use crate::ast::{Input, LValue, Module, Output};
use crate::engine::{Circuit, EvalError};

/// Result of a structural analysis pass.
#[derive(Debug, Clone)]
pub struct Analysis {
    logic_cones: HashMap<LValue, LogicCone>,
    extremes: PathExtremes,
}

/// Materializes the expression graph of `module` and walks it from every
/// output, in declaration order.
pub fn analyze(module: &Module) -> Result<Analysis, EvalError> {
    let mut builder = GraphBuilder::new();
    let inputs = builder.input_nodes(module.input_size());
    let mut circuit = Circuit::new(module.clone(), builder);
    circuit.evaluate(&inputs)?;

    let mut extremes = PathExtremes::default();
    let mut walker = GraphWalker::new(
        circuit.interpretation().arena(),
        circuit.outputs(),
        circuit.state(),
    );
    for idx in 0..module.output_size() {
        walker.walk_output(Output(idx), &mut extremes);
    }
    let logic_cones = walker.into_logic_cones();
    debug!(
        "analyzed {} graph nodes, longest path {}, shortest path {}",
        circuit.interpretation().arena().len(),
        extremes.longest.len(),
        extremes.shortest.len()
    );

    Ok(Analysis {
        logic_cones,
        extremes,
    })
}

impl Analysis {
    /// Inputs influencing `lvalue`. Empty for lvalues no input reaches.
    pub fn logic_cone(&self, lvalue: impl Into<LValue>) -> LogicCone {
        self.logic_cones
            .get(&lvalue.into())
            .cloned()
            .unwrap_or_default()
    }

    pub fn logic_cones(&self) -> &HashMap<LValue, LogicCone> {
        &self.logic_cones
    }

    pub fn longest(&self) -> &Path {
        &self.extremes.longest
    }

    pub fn shortest(&self) -> &Path {
        &self.extremes.shortest
    }

    /// Human-readable summary: both extremal paths, then the logic cone of
    /// every output.
    pub fn report(&self, module: &Module) -> String {
        let cones = (0..module.output_size()).map(Output).format_with("", |output, f| {
            f(&format_args!("Logic cone for {}:\n", module.name_of(output.into())))?;
            self.logic_cone(output).iter().try_for_each(|input| {
                f(&format_args!("  - {}\n", module.name_of(Input(input).into())))
            })
        });
        format!(
            "Shortest path: {}\nLongest path: {}\n{cones}",
            self.shortest().render(module),
            self.longest().render(module),
        )
    }
}
