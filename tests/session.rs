use dice_roller::{format_trace, roll, Error, Interpreter, ParseErrorKind, Reply, RollError, RollSession, NO_ROLL_YET};
use pretty_assertions::assert_eq;
use rand::{rngs::StdRng, SeedableRng};

#[test]
fn seeded_rolls_repeat() {
    let input = "top 3 4d6 + max 2d20, 1d12 - 1d4 * 2";
    let (expr, first) = roll(input, &mut StdRng::seed_from_u64(1234)).unwrap();
    let (_, second) = roll(input, &mut StdRng::seed_from_u64(1234)).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        format_trace(&expr, &first.records).unwrap(),
        format_trace(&expr, &second.records).unwrap()
    );
}

#[test]
fn trace_total_matches_value() {
    let mut rng = StdRng::seed_from_u64(99);
    for input in ["3d6 + 2", "max 2d20", "bottom 2 5d8, 3", "count 1 10d4 * 10", "(2d6 - 1) / 2"] {
        let (expr, eval) = roll(input, &mut rng).unwrap();
        let trace = format_trace(&expr, &eval.records).unwrap();
        let first_line = trace.lines().next().unwrap();
        assert_eq!(first_line, format!("{} = {}", input, eval.value));
    }
}

#[test]
fn interpreter_flow() {
    let mut interp = Interpreter::new(StdRng::seed_from_u64(5));
    assert_eq!(interp.execute("?").unwrap(), Reply::Trace(NO_ROLL_YET.to_string()));

    let total = match interp.execute("4d6 + 1").unwrap() {
        Reply::Total(total) => total,
        other => panic!("expected a total, got {:?}", other),
    };
    assert!((5..=25).contains(&total));

    let Reply::Trace(trace) = interp.execute("?").unwrap() else {
        panic!("expected a trace");
    };
    assert!(trace.starts_with(&format!("4d6 + 1 = {}", total)));
    assert!(trace.contains("4d6 : "));

    let before = interp.session().clone();
    assert!(matches!(
        interp.execute("1d6 / 0"),
        Err(Error::Roll(RollError::DivideByZero { .. }))
    ));
    assert_eq!(interp.session(), &before);
    assert_eq!(interp.execute("?").unwrap(), Reply::Trace(trace));
}

#[test]
fn errors_report_positions() {
    let mut interp = Interpreter::new(StdRng::seed_from_u64(0));

    let err = interp.execute("2d6 + 0d4").unwrap_err();
    assert!(matches!(&err, Error::Parse(e) if e.kind == ParseErrorKind::ZeroCount), "{:?}", err);
    assert_eq!(err.position(), Some(6));

    let err = interp.execute("2d6 ! 1").unwrap_err();
    assert!(matches!(err, Error::Lex(_)));
    assert_eq!(err.position(), Some(4));

    assert_eq!(interp.session(), &RollSession::Empty);
}
