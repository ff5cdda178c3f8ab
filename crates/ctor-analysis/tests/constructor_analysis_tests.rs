use ctor_analysis::{
    analyze_all, analyze_constructor, AnalysisError, AnalysisResult, AnalyzerOptions,
    FieldBinding,
};
use ctor_bytecode::{BinOp, BodyBuilder, ConstructorBody, TypeKind};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

const OBJECT: &str = "java.lang.Object";

fn string() -> TypeKind {
    TypeKind::reference("java.lang.String")
}

/// `this.<field_i> = <param_i>` for every parameter, after `super()`.
fn direct_assignments(class: &str, params: &[(&str, TypeKind)]) -> ConstructorBody {
    let mut builder =
        BodyBuilder::new(class, OBJECT).params(params.iter().map(|(_, kind)| kind.clone()));
    builder.super_init();
    for (index, (field, _)) in params.iter().enumerate() {
        let slot = builder.slot_of(index);
        builder.load_this().load(slot).putfield(*field);
    }
    builder.return_void();
    builder.build()
}

fn binding(parameter: usize, kind: TypeKind) -> FieldBinding {
    FieldBinding { parameter, kind }
}

#[test]
fn int_and_string_fields_map_to_their_parameters() {
    let body = direct_assignments("Foo", &[("bar", TypeKind::Int), ("foo", string())]);
    let result = analyze_constructor(&body).unwrap();
    assert_eq!(
        result,
        AnalysisResult {
            fields: BTreeMap::from([
                ("bar".to_string(), binding(0, TypeKind::Int)),
                ("foo".to_string(), binding(1, string())),
            ]),
            parameter_names: None,
        }
    );
}

#[test]
fn direct_assignments_yield_a_bijection_across_slot_widths() {
    let params = [
        ("flag", TypeKind::Boolean),
        ("big", TypeKind::Long),
        ("name", string()),
        ("ratio", TypeKind::Double),
        ("small", TypeKind::Byte),
        ("letter", TypeKind::Char),
        ("half", TypeKind::Short),
        ("real", TypeKind::Float),
    ];
    let body = direct_assignments("Wide", &params);
    let result = analyze_constructor(&body).unwrap();
    assert_eq!(result.fields.len(), params.len());
    for (index, (field, kind)) in params.iter().enumerate() {
        assert_eq!(result.fields[*field], binding(index, kind.clone()));
    }
}

#[test]
fn arithmetic_on_a_parameter_is_rejected_with_its_rendering() {
    let mut b = BodyBuilder::new("Foo", OBJECT).param(TypeKind::Int);
    b.super_init()
        .load_this()
        .load(1)
        .iconst(9)
        .binop(BinOp::Add)
        .putfield("foo")
        .return_void();
    let err = analyze_constructor(&b.build()).unwrap_err();
    assert_eq!(
        err,
        AnalysisError::NonIdempotentFieldAssignment {
            rendered: "p0 + 9".to_string(),
            field: "foo".to_string(),
        }
    );
    assert!(err.to_string().contains("p0 + 9"));
}

#[test]
fn second_assignment_of_a_field_is_rejected() {
    let mut b = BodyBuilder::new("Foo", OBJECT)
        .param(TypeKind::Int)
        .param(TypeKind::Int);
    b.super_init()
        .load_this()
        .load(2)
        .putfield("a")
        .load_this()
        .load(1)
        .putfield("a")
        .return_void();
    assert_eq!(
        analyze_constructor(&b.build()).unwrap_err(),
        AnalysisError::DuplicateFieldAssignment {
            field: "a".to_string()
        }
    );
}

#[test]
fn duplicate_assignment_wins_even_for_constant_values() {
    let mut b = BodyBuilder::new("Foo", OBJECT);
    b.super_init()
        .load_this()
        .iconst(1)
        .putfield("a")
        .load_this()
        .aconst_null()
        .putfield("a")
        .return_void();
    assert!(matches!(
        analyze_constructor(&b.build()).unwrap_err(),
        AnalysisError::DuplicateFieldAssignment { .. }
    ));
}

#[test]
fn boxing_and_unboxing_idioms_are_trivial_for_every_wrapper() {
    let pairs = [
        (TypeKind::Boolean, "java/lang/Boolean", "Z", "booleanValue"),
        (TypeKind::Byte, "java/lang/Byte", "B", "byteValue"),
        (TypeKind::Char, "java/lang/Character", "C", "charValue"),
        (TypeKind::Short, "java/lang/Short", "S", "shortValue"),
        (TypeKind::Int, "java/lang/Integer", "I", "intValue"),
        (TypeKind::Long, "java/lang/Long", "J", "longValue"),
        (TypeKind::Float, "java/lang/Float", "F", "floatValue"),
        (TypeKind::Double, "java/lang/Double", "D", "doubleValue"),
    ];
    for (primitive, wrapper, descriptor, accessor) in pairs {
        let wrapper_kind = TypeKind::reference(wrapper.replace('/', "."));

        // this.boxed = Wrapper.valueOf(p1), with p0 a filler int
        let mut b = BodyBuilder::new("Boxing", OBJECT)
            .param(TypeKind::Int)
            .param(primitive.clone());
        b.super_init().load_this().load(2);
        b.invokestatic(wrapper, "valueOf", &format!("({})L{};", descriptor, wrapper))
            .unwrap();
        b.putfield("boxed").return_void();
        let result = analyze_constructor(&b.build()).unwrap();
        assert_eq!(result.parameter_of("boxed"), Some(1), "{} boxing", wrapper);

        // this.unboxed = p1.accessor()
        let mut b = BodyBuilder::new("Unboxing", OBJECT)
            .param(TypeKind::Int)
            .param(wrapper_kind.clone());
        b.super_init().load_this().load(2);
        b.invokevirtual(wrapper, accessor, &format!("(){}", descriptor))
            .unwrap();
        b.putfield("unboxed").return_void();
        let result = analyze_constructor(&b.build()).unwrap();
        assert_eq!(
            result.fields["unboxed"],
            binding(1, wrapper_kind),
            "{} unboxing",
            wrapper
        );
    }
}

#[test]
fn mismatched_unboxing_accessor_is_rejected() {
    let mut b = BodyBuilder::new("Bad", OBJECT).param(TypeKind::reference("java.lang.Integer"));
    b.super_init().load_this().load(1);
    b.invokevirtual("java/lang/Integer", "longValue", "()J").unwrap();
    b.putfield("value").return_void();
    match analyze_constructor(&b.build()).unwrap_err() {
        AnalysisError::NonIdempotentFieldAssignment { rendered, field } => {
            assert_eq!(rendered, "p0.longValue()");
            assert_eq!(field, "value");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn non_idiomatic_static_call_is_rejected() {
    let mut b = BodyBuilder::new("Bad", OBJECT).param(string());
    b.super_init().load_this().load(1);
    b.invokestatic(
        "java/util/Objects",
        "requireNonNull",
        "(Ljava/lang/Object;)Ljava/lang/Object;",
    )
    .unwrap();
    b.putfield("value").return_void();
    match analyze_constructor(&b.build()).unwrap_err() {
        AnalysisError::NonIdempotentFieldAssignment { rendered, .. } => {
            assert_eq!(rendered, "java/util/Objects.requireNonNull(p0)");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn parameter_free_fields_are_excluded_silently() {
    let mut b = BodyBuilder::new("Mixed", OBJECT).param(TypeKind::Int);
    b.super_init()
        .load_this()
        .new_object("java/lang/Object")
        .dup();
    b.invokespecial("java/lang/Object", "<init>", "()V").unwrap();
    b.putfield("lock").load_this();
    b.invokestatic("java/lang/System", "nanoTime", "()J").unwrap();
    b.putfield("created")
        .load_this()
        .iconst(7)
        .putfield("seven")
        .load_this()
        .load(1)
        .putfield("value")
        .return_void();
    let result = analyze_constructor(&b.build()).unwrap();
    assert_eq!(
        result.fields,
        BTreeMap::from([("value".to_string(), binding(0, TypeKind::Int))])
    );
}

#[test]
fn delegation_errors_ignore_the_rest_of_the_body() {
    let mut b = BodyBuilder::new("Child", "Parent").param(TypeKind::Int);
    b.load_this().load(1);
    b.invokespecial("Parent", "<init>", "(I)V").unwrap();
    b.load_this().load(1).putfield("x").return_void();
    assert_eq!(
        analyze_constructor(&b.build()).unwrap_err(),
        AnalysisError::IllegalSuperDelegationWithArguments
    );

    let mut b = BodyBuilder::new("Child", "Parent").param(TypeKind::Int);
    b.load_this().load(1);
    b.invokespecial("Child", "<init>", "(I)V").unwrap();
    b.load_this().load(1).putfield("x").return_void();
    assert_eq!(
        analyze_constructor(&b.build()).unwrap_err(),
        AnalysisError::IllegalSelfDelegation
    );
}

#[test]
fn control_flow_is_unsupported_even_without_field_writes() {
    for mnemonic in ["ifnull", "goto", "lookupswitch", "athrow", "anewarray", "iastore", "invokedynamic"] {
        let mut b = BodyBuilder::new("Plain", OBJECT);
        b.super_init().other(mnemonic).return_void();
        assert!(matches!(
            analyze_constructor(&b.build()).unwrap_err(),
            AnalysisError::UnsupportedConstruct { .. }
        ));
    }
}

#[test]
fn debug_names_are_reported_per_parameter() {
    let mut b = BodyBuilder::new("Named", OBJECT)
        .param(TypeKind::Long)
        .param(string());
    b.super_init()
        .load_this()
        .load(1)
        .putfield("id")
        .load_this()
        .load(3)
        .putfield("label")
        .local_name(0, "this")
        .local_name(1, "id")
        .local_name(3, "label")
        .return_void();
    let body = b.build();

    let result = analyze_constructor(&body).unwrap();
    assert_eq!(
        result.parameter_names,
        Some(vec!["id".to_string(), "label".to_string()])
    );
    assert_eq!(result.parameter_of("label"), Some(1));
}

#[test]
fn analysis_is_deterministic() {
    let mut b = BodyBuilder::new("Foo", OBJECT)
        .param(TypeKind::Int)
        .param(string());
    b.super_init()
        .load_this()
        .load(2)
        .putfield("b")
        .load_this()
        .load(1)
        .iconst(1)
        .binop(BinOp::Xor)
        .putfield("a")
        .return_void();
    let body = b.build();
    let first = analyze_constructor(&body);
    for _ in 0..5 {
        assert_eq!(analyze_constructor(&body), first);
    }

    let ok = direct_assignments("Ok", &[("x", TypeKind::Int), ("y", string())]);
    let first = serde_json::to_string(&analyze_constructor(&ok).unwrap()).unwrap();
    let second = serde_json::to_string(&analyze_constructor(&ok).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn batch_accumulates_failures_per_class() {
    let ok = direct_assignments("Ok", &[("x", TypeKind::Int)]);

    let mut bad = BodyBuilder::new("Bad", OBJECT).param(TypeKind::Int);
    bad.super_init()
        .load_this()
        .load(1)
        .iconst(1)
        .binop(BinOp::Sub)
        .putfield("x")
        .return_void();

    let twice = direct_assignments("Twice", &[]);

    let bodies = vec![ok, bad.build(), twice.clone(), twice];
    let report = analyze_all(&bodies, &AnalyzerOptions::default());
    assert!(!report.is_success());
    assert_eq!(
        report.results.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["Ok"]
    );
    let failed: Vec<&str> = report
        .failures
        .iter()
        .map(|failure| failure.declaring_class.as_str())
        .collect();
    assert_eq!(failed, vec!["Bad", "Twice"]);

    let errors = report.into_result().unwrap_err();
    let text = errors.to_string();
    assert!(text.starts_with("2 constructor(s) failed analysis:"));
    assert!(text.contains("Bad: non-idempotent expression p0 - 1 assigned to field x"));
}

#[test]
fn boxing_a_reference_parameter_maps_the_field() {
    let mut b = BodyBuilder::new("Parsed", OBJECT).param(string());
    b.super_init().load_this().load(1);
    b.invokestatic(
        "java/lang/Integer",
        "valueOf",
        "(Ljava/lang/String;)Ljava/lang/Integer;",
    )
    .unwrap();
    b.putfield("n").return_void();
    let result = analyze_constructor(&b.build()).unwrap();
    assert_eq!(
        result.fields,
        BTreeMap::from([("n".to_string(), binding(0, string()))])
    );
}

#[test]
fn doubling_chains_are_analyzed_within_the_default_limit() {
    let mut b = BodyBuilder::new("Doubling", OBJECT).param(TypeKind::Int);
    b.super_init().load_this().load(1);
    for _ in 0..64 {
        b.dup().binop(BinOp::Add);
    }
    b.putfield("total").return_void();
    let body = b.build();
    assert!(body.instructions.len() < AnalyzerOptions::default().max_instructions);

    match analyze_constructor(&body).unwrap_err() {
        AnalysisError::NonIdempotentFieldAssignment { rendered, field } => {
            assert_eq!(field, "total");
            assert!(rendered.starts_with("p0 + p0 + p0"));
            assert!(rendered.ends_with("..."));
        }
        other => panic!("unexpected error {:?}", other),
    }
}
