use gatesim::{
    Flipflop, Input, LValue, Module, ModuleDecl, ModuleError, Operator, Output, SchedulerError,
    Token,
};
use proptest::prelude::*;

fn input(idx: usize) -> Token {
    Token::Input(Input(idx))
}

fn output(idx: usize) -> Token {
    Token::Output(Output(idx))
}

fn ff(idx: usize) -> Token {
    Token::Flipflop(Flipflop(idx))
}

fn op(op: Operator) -> Token {
    Token::Operator(op)
}

fn names(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|idx| format!("{prefix}{idx}")).collect()
}

/// Every output read by an assignment has been assigned earlier in the list.
fn assert_topological(module: &Module) {
    let mut assigned = vec![false; module.output_size()];
    for assignment in module.assignments() {
        for token in &assignment.expression {
            if let Token::Output(Output(idx)) = token {
                assert!(
                    assigned[*idx],
                    "{} reads output #{idx} before it is assigned",
                    module.name_of(assignment.lvalue.into())
                );
            }
        }
        if let LValue::Output(Output(idx)) = assignment.lvalue {
            assigned[idx] = true;
        }
    }
}

#[test]
fn test_chain_declared_backwards() {
    // o2 = o1, o1 = o0, o0 = NOT i0, declared last-to-first.
    let module = Module::resolve(ModuleDecl {
        name: "chain".to_owned(),
        input_names: names("i", 1),
        output_names: names("o", 3),
        assignments: vec![
            (LValue::Output(Output(2)), vec![output(1)]),
            (LValue::Output(Output(1)), vec![output(0)]),
            (LValue::Output(Output(0)), vec![input(0), op(Operator::Not)]),
        ],
        ..Default::default()
    })
    .unwrap();

    let order: Vec<LValue> = module.assignments().iter().map(|a| a.lvalue).collect();
    assert_eq!(
        order,
        vec![
            LValue::Output(Output(0)),
            LValue::Output(Output(1)),
            LValue::Output(Output(2)),
        ]
    );
    assert_topological(&module);
}

#[test]
fn test_combinational_loop_is_rejected() {
    // o0 = o1 AND i0, o1 = o0 OR i0
    let result = Module::resolve(ModuleDecl {
        name: "loop".to_owned(),
        input_names: names("i", 1),
        output_names: names("o", 2),
        assignments: vec![
            (
                LValue::Output(Output(0)),
                vec![output(1), input(0), op(Operator::And)],
            ),
            (
                LValue::Output(Output(1)),
                vec![output(0), input(0), op(Operator::Or)],
            ),
        ],
        ..Default::default()
    });

    match result {
        Err(ModuleError::Scheduler(SchedulerError::CombinationalLoop { lvalues })) => {
            assert_eq!(
                lvalues,
                vec![LValue::Output(Output(0)), LValue::Output(Output(1))]
            );
        }
        other => panic!("Expected CombinationalLoop error, but got: {:?}", other),
    }
}

#[test]
fn test_loop_downstream_outputs_are_reported() {
    // o0 <-> o1 loop, o2 only reads o1 but can never be scheduled either.
    let result = Module::resolve(ModuleDecl {
        name: "loop".to_owned(),
        input_names: names("i", 1),
        output_names: names("o", 3),
        assignments: vec![
            (LValue::Output(Output(0)), vec![output(1)]),
            (LValue::Output(Output(1)), vec![output(0)]),
            (
                LValue::Output(Output(2)),
                vec![output(1), input(0), op(Operator::Xor)],
            ),
        ],
        ..Default::default()
    });

    match result {
        Err(ModuleError::Scheduler(SchedulerError::CombinationalLoop { lvalues })) => {
            assert_eq!(lvalues.len(), 3);
        }
        other => panic!("Expected CombinationalLoop error, but got: {:?}", other),
    }
}

#[test]
fn test_flipflop_cross_reference_resolves() {
    // FF0 <- FF1, FF1 <- FF0: a swap register.
    let module = Module::resolve(ModuleDecl {
        name: "swap".to_owned(),
        clocked: true,
        flipflop_ids: vec![0, 1],
        output_names: names("o", 1),
        assignments: vec![
            (LValue::Flipflop(Flipflop(0)), vec![ff(1)]),
            (LValue::Flipflop(Flipflop(1)), vec![ff(0)]),
            (
                LValue::Output(Output(0)),
                vec![ff(0), ff(1), op(Operator::Xnor)],
            ),
        ],
        ..Default::default()
    })
    .unwrap();
    assert_eq!(module.assignments().len(), 3);
}

#[test]
fn test_loop_through_flipflop_resolves() {
    // o0 = i0 AND FF0, FF0 = NOT o0
    let module = Module::resolve(ModuleDecl {
        name: "toggle".to_owned(),
        clocked: true,
        input_names: names("i", 1),
        flipflop_ids: vec![0],
        output_names: names("o", 1),
        assignments: vec![
            (
                LValue::Flipflop(Flipflop(0)),
                vec![output(0), op(Operator::Not)],
            ),
            (
                LValue::Output(Output(0)),
                vec![input(0), ff(0), op(Operator::And)],
            ),
        ],
        ..Default::default()
    })
    .unwrap();

    let order: Vec<LValue> = module.assignments().iter().map(|a| a.lvalue).collect();
    assert_eq!(
        order,
        vec![LValue::Output(Output(0)), LValue::Flipflop(Flipflop(0))]
    );
}

/// Builds a random acyclic module: output `i` may read inputs, flip-flops
/// and outputs `< i`; flip-flops may read anything. Assignments are
/// declared in reverse.
fn random_decl(inputs: usize, outputs: usize, ffs: usize, seeds: &[Vec<u32>]) -> ModuleDecl {
    let mut assignments = Vec::new();
    let operand = |seed: u32, outputs_visible: usize| -> Token {
        let pick = seed as usize % (inputs + outputs_visible + ffs);
        if pick < inputs {
            input(pick)
        } else if pick < inputs + outputs_visible {
            output(pick - inputs)
        } else {
            ff(pick - inputs - outputs_visible)
        }
    };
    let expression = |seeds: &[u32], outputs_visible: usize| -> Vec<Token> {
        let mut tokens = vec![operand(seeds[0], outputs_visible)];
        for (n, seed) in seeds[1..].iter().enumerate() {
            tokens.push(operand(*seed, outputs_visible));
            tokens.push(op(Operator::ALL[1 + n % 6]));
        }
        tokens
    };
    for idx in 0..outputs {
        assignments.push((LValue::Output(Output(idx)), expression(&seeds[idx], idx)));
    }
    for idx in 0..ffs {
        assignments.push((
            LValue::Flipflop(Flipflop(idx)),
            expression(&seeds[outputs + idx], outputs),
        ));
    }
    assignments.reverse();

    ModuleDecl {
        name: "random".to_owned(),
        clocked: true,
        input_names: names("i", inputs),
        flipflop_ids: (0..ffs as u16).collect(),
        output_names: names("o", outputs),
        assignments,
    }
}

proptest! {
    #[test]
    fn test_schedule_is_topological(
        inputs in 1usize..4,
        outputs in 1usize..6,
        ffs in 0usize..3,
        seeds in prop::collection::vec(prop::collection::vec(any::<u32>(), 1..4), 8),
    ) {
        let decl = random_decl(inputs, outputs, ffs, &seeds);
        let count = decl.assignments.len();
        let module = Module::resolve(decl).expect("acyclic module must resolve");
        prop_assert_eq!(module.assignments().len(), count);
        assert_topological(&module);
    }
}
