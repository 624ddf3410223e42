use smallvec::SmallVec;

use crate::HashMap;
use crate::ast::{Flipflop, Input, Operator, Output, Token};
use crate::engine::{EvalError, Interpretation, OperandStack};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

/// A vertex of the materialized expression graph.
///
/// Leaves are inputs and flip-flop outputs; operator nodes own one child per
/// operand, the first popped operand first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    pub token: Token,
    pub children: SmallVec<[NodeId; 2]>,
}

impl Node {
    pub fn leaf(token: impl Into<Token>) -> Self {
        Self {
            token: token.into(),
            children: SmallVec::new(),
        }
    }
}

/// Owns every node of one graph. Structurally identical nodes are shared.
#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
    cache: HashMap<Node, NodeId>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.cache.get(&node) {
            return *id;
        }
        let id = NodeId(self.nodes.len());
        self.cache.insert(node.clone(), id);
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Interpretation whose values are graph nodes: evaluating a module once
/// yields, for every output and flip-flop, the root of its driving
/// expression tree.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    arena: NodeArena,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// One leaf per primary input, to be fed to [`Circuit::evaluate`].
    ///
    /// [`Circuit::evaluate`]: crate::Circuit::evaluate
    pub fn input_nodes(&mut self, input_size: usize) -> Vec<NodeId> {
        (0..input_size)
            .map(|idx| self.arena.alloc(Node::leaf(Input(idx))))
            .collect()
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn into_arena(self) -> NodeArena {
        self.arena
    }
}

impl Interpretation for GraphBuilder {
    type Value = NodeId;

    fn initialize(&mut self, state_size: usize) -> Vec<NodeId> {
        (0..state_size)
            .map(|idx| self.arena.alloc(Node::leaf(Flipflop(idx))))
            .collect()
    }

    /// Placeholder leaves, replaced by expression roots on the first tick.
    fn initialize_outputs(&mut self, output_size: usize) -> Vec<NodeId> {
        (0..output_size)
            .map(|idx| self.arena.alloc(Node::leaf(Output(idx))))
            .collect()
    }

    fn on_operator(
        &mut self,
        op: Operator,
        stack: &mut OperandStack<NodeId>,
    ) -> Result<(), EvalError> {
        let mut children = SmallVec::new();
        for _ in 0..op.arity() {
            children.push(stack.pop()?);
        }
        let id = self.arena.alloc(Node {
            token: Token::Operator(op),
            children,
        });
        stack.push(id);
        Ok(())
    }
}
