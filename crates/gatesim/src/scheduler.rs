use itertools::Itertools;
use log::{debug, trace};
use thiserror::Error;

use crate::ast::{Assignment, Expression, Flipflop, Input, LValue, Output, Token};
use crate::{HashMap, HashSet};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Combinational loop detected: {}", .lvalues.iter().map(|v| format!("{}", Token::from(*v))).join(", "))]
    CombinationalLoop { lvalues: Vec<LValue> },
}

/// A value an expression can read.
///
/// A flip-flop appears here with its *output* side only: reading `FFn`
/// yields the value latched at the previous tick, independent of the
/// expression driving its next value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Source {
    Input(Input),
    Output(Output),
    Flipflop(Flipflop),
}

impl Source {
    fn of(token: Token) -> Option<Self> {
        match token {
            Token::Operator(_) => None,
            Token::Input(input) => Some(Source::Input(input)),
            Token::Output(output) => Some(Source::Output(output)),
            Token::Flipflop(ff) => Some(Source::Flipflop(ff)),
        }
    }
}

/// Orders assignments so that every output is computed before any
/// expression reads it.
///
/// This is Kahn's algorithm over the operand graph with each flip-flop split
/// in two unconnected halves. The output half (its current value) is a
/// source seeded next to the primary inputs; the input half (the assignment
/// computing its next value) is a sink that is emitted once all of its
/// operands are available, but never re-enters the worklist. Loops running
/// through a flip-flop are therefore always broken, while purely
/// combinational loops leave unresolved assignments behind and are reported
/// as [`SchedulerError::CombinationalLoop`].
pub fn schedule(
    input_count: usize,
    flipflop_count: usize,
    assignments: Vec<(LValue, Expression)>,
) -> Result<Vec<Assignment>, SchedulerError> {
    // Direct (non-transitive) operands of every assignment.
    let mut pending: Vec<HashSet<Source>> = assignments
        .iter()
        .map(|(_, expression)| expression.iter().copied().filter_map(Source::of).collect())
        .collect();

    let mut dependents: HashMap<Source, Vec<usize>> = HashMap::default();
    for (idx, sources) in pending.iter().enumerate() {
        for source in sources {
            dependents.entry(*source).or_default().push(idx);
        }
    }

    let mut ready: Vec<Source> = (0..input_count)
        .map(|idx| Source::Input(Input(idx)))
        .chain((0..flipflop_count).map(|idx| Source::Flipflop(Flipflop(idx))))
        .collect();

    let mut order = Vec::with_capacity(assignments.len());
    let place = |idx: usize, order: &mut Vec<usize>, ready: &mut Vec<Source>| {
        let lvalue = assignments[idx].0;
        if let LValue::Output(output) = lvalue {
            ready.push(Source::Output(output));
        }
        trace!("scheduled {} at position {}", Token::from(lvalue), order.len());
        order.push(idx);
    };

    // Operand-free expressions depend on nothing; evaluation rejects them.
    for (idx, sources) in pending.iter().enumerate() {
        if sources.is_empty() {
            place(idx, &mut order, &mut ready);
        }
    }
    while let Some(source) = ready.pop() {
        let Some(parents) = dependents.get(&source) else {
            continue;
        };
        for &idx in parents {
            if pending[idx].remove(&source) && pending[idx].is_empty() {
                place(idx, &mut order, &mut ready);
            }
        }
    }

    let unresolved: Vec<LValue> = pending
        .iter()
        .enumerate()
        .filter(|(_, sources)| !sources.is_empty())
        .map(|(idx, _)| assignments[idx].0)
        .collect();
    if !unresolved.is_empty() {
        return Err(SchedulerError::CombinationalLoop {
            lvalues: unresolved,
        });
    }

    debug!("scheduled {} assignments", order.len());
    let mut slots: Vec<Option<(LValue, Expression)>> = assignments.into_iter().map(Some).collect();
    Ok(order
        .into_iter()
        .filter_map(|idx| slots[idx].take())
        .map(|(lvalue, expression)| Assignment { lvalue, expression })
        .collect())
}
