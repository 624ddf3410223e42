use bit_set::BitSet;
use itertools::Itertools;

use super::graph::{NodeArena, NodeId};
use crate::ast::{Flipflop, Input, LValue, Module, Output, Token};
use crate::{HashMap, HashSet};

/// Indices of the primary inputs that influence an lvalue.
pub type LogicCone = BitSet;

/// Tokens met on one root-to-leaf traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    tokens: Vec<Token>,
}

impl Path {
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// `AND -> a`-style rendering, `(none)` for an empty path.
    pub fn render(&self, module: &Module) -> String {
        if self.tokens.is_empty() {
            return "(none)".to_owned();
        }
        self.tokens
            .iter()
            .map(|token| module.name_of(*token))
            .join(" -> ")
    }
}

/// Longest and shortest input-terminated paths seen so far.
///
/// Only strictly better paths replace a recorded one, so among paths of
/// equal length the first one walked wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathExtremes {
    pub longest: Path,
    pub shortest: Path,
}

impl PathExtremes {
    fn record(&mut self, path: &[Token]) {
        if path.len() > self.longest.len() {
            self.longest.tokens = path.to_vec();
        }
        if self.shortest.is_empty() || path.len() < self.shortest.len() {
            self.shortest.tokens = path.to_vec();
        }
    }
}

/// Depth-first walk over a materialized graph that accumulates logic cones.
///
/// Every lvalue currently being walked (the output the walk started from
/// plus every flip-flop entered on the way) receives each input reached.
/// A flip-flop is entered at most once, which bounds the walk on feedback
/// loops. Later references record that the referencing lvalues read the
/// flip-flop's cone; since that cone may still be growing, these edges are
/// closed over once walking is done, in [`GraphWalker::into_logic_cones`].
pub struct GraphWalker<'a> {
    arena: &'a NodeArena,
    outputs: &'a [NodeId],
    flipflops: &'a [NodeId],
    path: Vec<Token>,
    hierarchy: Vec<LValue>,
    visited: HashSet<Flipflop>,
    logic_cones: HashMap<LValue, LogicCone>,
    reuses: HashSet<(Flipflop, LValue)>,
}

impl<'a> GraphWalker<'a> {
    /// `outputs[i]` and `flipflops[i]` are the roots driving output `i` and
    /// the next value of flip-flop `i`.
    pub fn new(arena: &'a NodeArena, outputs: &'a [NodeId], flipflops: &'a [NodeId]) -> Self {
        Self {
            arena,
            outputs,
            flipflops,
            path: Vec::new(),
            hierarchy: Vec::new(),
            visited: HashSet::default(),
            logic_cones: HashMap::default(),
            reuses: HashSet::default(),
        }
    }

    pub fn walk_output(&mut self, output: Output, extremes: &mut PathExtremes) {
        self.hierarchy.push(LValue::Output(output));
        self.walk(self.outputs[output.0], extremes);
        self.hierarchy.pop();
    }

    /// Final cones of every lvalue reached by the walks so far.
    pub fn into_logic_cones(mut self) -> HashMap<LValue, LogicCone> {
        let mut changed = true;
        while changed {
            changed = false;
            for &(ff, lvalue) in &self.reuses {
                let Some(cone) = self.logic_cones.get(&LValue::Flipflop(ff)).cloned() else {
                    continue;
                };
                let target = self.logic_cones.entry(lvalue).or_default();
                if !cone.is_subset(target) {
                    target.union_with(&cone);
                    changed = true;
                }
            }
        }
        self.logic_cones
    }

    fn walk(&mut self, id: NodeId, extremes: &mut PathExtremes) {
        let arena = self.arena;
        let node = arena.get(id);
        self.path.push(node.token);
        match node.token {
            Token::Input(input) => self.visit_input(input, extremes),
            Token::Flipflop(ff) => self.visit_flipflop(ff, extremes),
            Token::Operator(_) | Token::Output(_) => {}
        }
        for &child in &node.children {
            self.walk(child, extremes);
        }
        self.path.pop();
    }

    fn visit_input(&mut self, input: Input, extremes: &mut PathExtremes) {
        for lvalue in &self.hierarchy {
            self.logic_cones.entry(*lvalue).or_default().insert(input.0);
        }
        extremes.record(&self.path);
    }

    fn visit_flipflop(&mut self, ff: Flipflop, extremes: &mut PathExtremes) {
        if !self.visited.insert(ff) {
            let cone = self.logic_cones.get(&LValue::Flipflop(ff)).cloned();
            for lvalue in &self.hierarchy {
                if *lvalue != LValue::Flipflop(ff) {
                    self.reuses.insert((ff, *lvalue));
                }
                if let Some(cone) = &cone {
                    self.logic_cones.entry(*lvalue).or_default().union_with(cone);
                }
            }
            return;
        }
        self.hierarchy.push(LValue::Flipflop(ff));
        self.walk(self.flipflops[ff.0], extremes);
        self.hierarchy.pop();
    }
}
