use deltalog_core::{DeltalogError, Model, ModelList, Probability, Symbol};
use deltalog_engine::{EngineOutcome, Program, ScriptedEngine, SmartRepeat};
use deltalog_terms::{DeltaRequest, DeltaTermsContext};

fn result_model(value: Symbol) -> EngineOutcome {
    EngineOutcome {
        satisfiable: true,
        models: ModelList::of([Model::of([Symbol::function("res", vec![value])])]),
    }
}

/// One anonymous choice over weights (1, 1, 2).
fn three_way_program(seed: u64) -> Program {
    let engine = ScriptedEngine::new(|_code, context: &mut DeltaTermsContext<'_>| {
        let value = context.evaluate(
            DeltaRequest::smart(vec![
                Symbol::number(1),
                Symbol::number(1),
                Symbol::number(2),
            ]),
            vec![],
        )?;
        Ok(result_model(value))
    });
    Program::new("res(@delta((1,1,2), ())).", Box::new(engine), seed)
}

#[test]
fn three_outcomes_are_enumerated_in_exactly_three_runs() {
    let mut scheduler = SmartRepeat::on(three_way_program(41));
    assert!(scheduler.repeat(10).unwrap());
    assert!(scheduler.is_exhausted());
    assert_eq!(scheduler.total_runs(), 3);
    assert_eq!(scheduler.distinct_traces(), 3);

    let sets = scheduler.sets_of_stable_models_frequency().unwrap();
    assert_eq!(sets.len(), 3);

    // Masses are exact: 1/4, 1/4 and 2/4, summing to one.
    let mut total = Probability::impossible();
    for (_, probability) in sets.iter() {
        total = total.add(probability).unwrap();
    }
    assert_eq!(total, Probability::certain());

    let heavy = ModelList::of([Model::of([Symbol::function(
        "res",
        vec![Symbol::number(2)],
    )])]);
    assert_eq!(sets.get(&heavy), Some(&Probability::of(2, 4).unwrap()));
}

#[test]
fn repeating_after_exhaustion_is_a_no_op() {
    let mut scheduler = SmartRepeat::on(three_way_program(13));
    assert!(scheduler.repeat(10).unwrap());
    assert!(scheduler.repeat(10).unwrap());
    assert_eq!(scheduler.total_runs(), 3);
}

#[test]
fn constrained_outcome_contributes_exact_incoherent_mass() {
    // Fair anonymous coin; outcome 1 violates a constraint.
    let engine = ScriptedEngine::new(|_code, context: &mut DeltaTermsContext<'_>| {
        let flip = context.evaluate(
            DeltaRequest::smart(vec![Symbol::number(1), Symbol::number(1)]),
            vec![],
        )?;
        if flip == Symbol::number(1) {
            Ok(EngineOutcome {
                satisfiable: false,
                models: ModelList::empty(),
            })
        } else {
            Ok(result_model(flip))
        }
    });
    let program = Program::new(
        "coin(@delta((1,1), ())). :- coin(1).",
        Box::new(engine),
        8,
    );

    let scheduler = SmartRepeat::run(program, 2).unwrap();
    assert!(scheduler.is_exhausted());
    assert_eq!(scheduler.total_runs(), 2);
    assert_eq!(
        scheduler.no_stable_model_frequency().unwrap(),
        Probability::of(1, 2).unwrap()
    );
}

#[test]
fn named_only_programs_cannot_be_enumerated() {
    let engine = ScriptedEngine::new(|_code, context: &mut DeltaTermsContext<'_>| {
        let request =
            DeltaRequest::named("flip", vec![Symbol::number(1), Symbol::number(2)])?;
        let face = context.evaluate(request, vec![])?;
        Ok(result_model(face))
    });
    let program = Program::new("res(@delta(flip, (1,2), ())).", Box::new(engine), 6);

    // Only two traces exist, so some trace repeats within a handful of runs.
    let err = SmartRepeat::run(program, 10).unwrap_err();
    match err {
        DeltalogError::Invariant(info) => assert_eq!(info.code, "trace-revisited"),
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn named_call_below_an_open_branch_point_is_an_invariant_error() {
    // A named draw followed by a single-outcome (hence exhausted) smart
    // call: the backward walk stops on the named call.
    let engine = ScriptedEngine::new(|_code, context: &mut DeltaTermsContext<'_>| {
        let request =
            DeltaRequest::named("flip", vec![Symbol::number(1), Symbol::number(2)])?;
        let face = context.evaluate(request, vec![])?;
        let only = context.evaluate(
            DeltaRequest::smart(vec![Symbol::number(1)]),
            vec![face.clone()],
        )?;
        Ok(result_model(only))
    });
    let program = Program::new(
        "res(@delta(flip, (1,2), ()), @delta((1), (F))).",
        Box::new(engine),
        6,
    );

    let err = SmartRepeat::run(program, 10).unwrap_err();
    match err {
        DeltalogError::Invariant(info) => {
            assert_eq!(info.code, "named-call-at-branch-point")
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn deterministic_programs_exhaust_after_a_single_run() {
    let engine = ScriptedEngine::new(|_code, _context: &mut DeltaTermsContext<'_>| {
        Ok(result_model(Symbol::number(42)))
    });
    let program = Program::new("res(42).", Box::new(engine), 1);

    let mut scheduler = SmartRepeat::on(program);
    assert!(scheduler.repeat(5).unwrap());
    assert_eq!(scheduler.total_runs(), 1);

    let sets = scheduler.sets_of_stable_models_frequency().unwrap();
    assert_eq!(sets.len(), 1);
    let (_, probability) = sets.iter().next().unwrap();
    assert_eq!(probability, &Probability::certain());
}

#[test]
fn nested_choices_enumerate_every_leaf_with_exact_masses() {
    // Root coin; on 0 a second three-way uniform choice. Four leaves with
    // masses 1/6, 1/6, 1/6 and 1/2.
    let engine = ScriptedEngine::new(|_code, context: &mut DeltaTermsContext<'_>| {
        let first = context.evaluate(
            DeltaRequest::smart(vec![Symbol::number(1), Symbol::number(1)]),
            vec![Symbol::constant("root")],
        )?;
        if first == Symbol::number(0) {
            let second = context.evaluate(
                DeltaRequest::smart(vec![
                    Symbol::number(1),
                    Symbol::number(1),
                    Symbol::number(1),
                ]),
                vec![Symbol::constant("inner")],
            )?;
            Ok(result_model(Symbol::tuple(vec![first, second])))
        } else {
            Ok(result_model(first))
        }
    });
    let program = Program::new(
        "root(@delta((1,1), (root))). inner(@delta((1,1,1), (inner))) :- root(0).",
        Box::new(engine),
        77,
    );

    let mut scheduler = SmartRepeat::on(program);
    assert!(scheduler.repeat(10).unwrap());
    assert_eq!(scheduler.total_runs(), 4);
    assert_eq!(scheduler.distinct_traces(), 4);

    let sets = scheduler.sets_of_stable_models_frequency().unwrap();
    assert_eq!(sets.len(), 4);

    let lone = ModelList::of([Model::of([Symbol::function(
        "res",
        vec![Symbol::number(1)],
    )])]);
    assert_eq!(sets.get(&lone), Some(&Probability::of(1, 2).unwrap()));

    let mut total = Probability::impossible();
    for (_, probability) in sets.iter() {
        total = total.add(probability).unwrap();
    }
    assert_eq!(total, Probability::certain());
}
