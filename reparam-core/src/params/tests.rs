//! Tests for parameter desugaring

#[cfg(test)]
mod params_tests {
    use crate::ast::{DefaultValue, Pattern};
    use crate::destructure::{
        Accessor, NestedDefinition, PatternUnwrapper, SourceExpr, Unwrapped, Unwrapper,
    };
    use crate::diagnostics::{Diagnostics, Warning, WarningKind};
    use crate::discover::{discover_functions, Discovery};
    use crate::error::DesugarError;
    use crate::idents::IdentifierSet;
    use crate::params::{classify, FunctionOutcome, ParamPass, PassOptions, Rewrite};
    use crate::parser::parse_source;
    use crate::patch::{apply_edits, ChangeSet, Edit, EditKind};
    use crate::scope::{DeclKind, Position, ScopeRegistry};
    use crate::span::SourceSpan;
    use crate::transform::transform_source;
    use swc_common::{sync::Lrc, SourceMap};

    struct Run {
        output: String,
        edits: Vec<Edit>,
        outcomes: Vec<FunctionOutcome>,
        warnings: Vec<Warning>,
        identifiers: IdentifierSet,
        discovery: Discovery,
    }

    fn discover(src: &str) -> (Discovery, IdentifierSet, Diagnostics) {
        let cm: Lrc<SourceMap> = Default::default();
        let parsed = parse_source(src, &cm, "test.js").unwrap();
        let mut identifiers = IdentifierSet::new();
        let mut diagnostics = Diagnostics::new();
        let discovery = discover_functions(
            &parsed.module,
            0,
            parsed.base(),
            &cm,
            &mut identifiers,
            &mut diagnostics,
        );
        (discovery, identifiers, diagnostics)
    }

    fn desugar_with(src: &str, options: &PassOptions) -> Run {
        let (mut discovery, mut identifiers, mut diagnostics) = discover(src);
        let mut unwrapper = PatternUnwrapper::new(src, options.temp_prefix.clone());
        let mut changes = ChangeSet::new();
        let mut outcomes = Vec::new();
        {
            let mut pass = ParamPass::new(
                src,
                &mut discovery.scopes,
                &mut identifiers,
                &mut diagnostics,
                &mut unwrapper,
                options,
            );
            for function in &discovery.functions {
                outcomes.push(pass.run(function, &mut changes).unwrap());
            }
        }
        let edits = changes.into_vec();
        let output = apply_edits(src, &edits).unwrap();
        Run {
            output,
            edits,
            outcomes,
            warnings: diagnostics.into_warnings(),
            identifiers,
            discovery,
        }
    }

    fn desugar(src: &str) -> Run {
        desugar_with(src, &PassOptions::default())
    }

    /// Always yields a nested definition whose target is itself a pattern
    struct MalformedUnwrapper;

    impl Unwrapper for MalformedUnwrapper {
        fn unwrap(
            &mut self,
            pattern: &Pattern,
            _source: &SourceExpr,
            _identifiers: &mut IdentifierSet,
        ) -> Result<Unwrapped, DesugarError> {
            Ok(Unwrapped {
                bindings: Vec::new(),
                definitions: vec![NestedDefinition {
                    target: pattern.clone(),
                    temporary: "t".to_string(),
                    accessor: Accessor::Index(0),
                }],
            })
        }
    }

    #[test]
    fn test_plain_parameters_produce_no_edits() {
        let src = "function f(a, b) { return a + b; }";
        let run = desugar(src);
        assert!(run.edits.is_empty());
        assert_eq!(run.output, src);
        assert!(run.outcomes[0].is_unchanged());
        assert!(run.outcomes[0].registered.is_empty());
    }

    #[test]
    fn test_object_pattern_after_plain_parameter() {
        let run = desugar("function f(a, {b, c}) { return b + c; }");
        assert_eq!(
            run.output,
            "function f(a) { var b = arguments[1].b, c = arguments[1].c; return b + c; }"
        );
        assert_eq!(
            run.edits,
            vec![
                Edit::insert(24, "var b = arguments[1].b, c = arguments[1].c; ", EditKind::Prologue),
                Edit::delete(SourceSpan::new(12, 20), EditKind::Removal),
            ]
        );
        assert_eq!(run.outcomes[0].replaced, vec![1]);
        assert_eq!(run.outcomes[0].registered, vec!["b", "c"]);
    }

    #[test]
    fn test_plain_default_is_guarded_read() {
        let run = desugar("function f(a, b = 1) { return b; }");
        assert_eq!(
            run.output,
            "function f(a) { var b = arguments[1]; if (b === void 0) b = 1; return b; }"
        );
        // `, b = 1` is removed and `a` is untouched
        assert_eq!(run.edits[1], Edit::delete(SourceSpan::new(12, 19), EditKind::Removal));
    }

    #[test]
    fn test_rest_slices_from_its_position() {
        let run = desugar("function f(...rest) { return rest; }");
        assert_eq!(
            run.output,
            "function f() { var rest = [].slice.call(arguments, 0); return rest; }"
        );
        assert!(run.outcomes[0].rest_replaced);

        let run = desugar("function f(a, ...rest) { return rest; }");
        assert_eq!(
            run.output,
            "function f(a) { var rest = [].slice.call(arguments, 1); return rest; }"
        );
    }

    #[test]
    fn test_rest_counts_defaulted_parameters() {
        let run = desugar("function f(a, b = 2, ...rest) { return rest; }");
        assert_eq!(
            run.output,
            "function f(a) { var b = arguments[1]; if (b === void 0) b = 2; var rest = [].slice.call(arguments, 2); return rest; }"
        );
    }

    #[test]
    fn test_self_referential_default_warns_and_still_rewrites() {
        let run = desugar("\nfunction f(x = x) { return x; }");
        assert_eq!(
            run.output,
            "\nfunction f() { var x = arguments[0]; if (x === void 0) x = x; return x; }"
        );
        assert_eq!(run.warnings.len(), 1);
        assert_eq!(run.warnings[0].line, 2);
        assert_eq!(
            run.warnings[0].kind,
            WarningKind::SelfReferentialDefault {
                name: "x".to_string()
            }
        );
    }

    #[test]
    fn test_rewriting_output_again_is_a_no_op() {
        let src = "function f(a, {b}, [c], d = 1, ...e) { return [a, b, c, d, e]; }";
        let first = desugar(src);
        let second = desugar(&first.output);
        assert!(second.edits.is_empty());
        assert_eq!(second.output, first.output);
    }

    #[test]
    fn test_every_parameter_kind_in_one_list() {
        let src = "function f({a}, [b], c = 1, ...d) { }";
        let run = desugar(src);
        assert_eq!(
            run.output,
            "function f() {var a = arguments[0].a;var b = arguments[1][0];var c = arguments[2]; if (c === void 0) c = 1;var d = [].slice.call(arguments, 3); }"
        );

        let insertions = run.edits.iter().filter(|e| e.kind == EditKind::Prologue).count();
        let removals: Vec<SourceSpan> = run
            .edits
            .iter()
            .filter(|e| e.kind == EditKind::Removal)
            .map(Edit::span)
            .collect();
        assert_eq!(insertions, 4);
        assert_eq!(removals.len(), 4);
        for (i, first) in removals.iter().enumerate() {
            for second in &removals[i + 1..] {
                assert!(!first.overlaps(second), "{:?} overlaps {:?}", first, second);
            }
        }
        assert_eq!(run.outcomes[0].replaced, vec![0, 1, 2]);
    }

    #[test]
    fn test_insertions_reuse_body_indentation() {
        let run = desugar("function f(a = 1) {\n    return a;\n}");
        assert_eq!(
            run.output,
            "function f() {\n    var a = arguments[0]; if (a === void 0) a = 1;\n    return a;\n}"
        );
    }

    #[test]
    fn test_trailing_comma_goes_with_the_last_removed_parameter() {
        let run = desugar("function f({a},) { return a; }");
        assert_eq!(run.output, "function f() { var a = arguments[0].a; return a; }");

        let run = desugar("function g(x = 1,) { return x; }");
        assert_eq!(
            run.output,
            "function g() { var x = arguments[0]; if (x === void 0) x = 1; return x; }"
        );

        let run = desugar("function h(a, {b},) { return a + b; }");
        assert_eq!(
            run.output,
            "function h(a) { var b = arguments[1].b; return a + b; }"
        );
    }

    #[test]
    fn test_trailing_comma_on_its_own_line() {
        let run = desugar("function f(\n  {a, b},\n) {\n  return a + b;\n}");
        assert_eq!(
            run.output,
            "function f(\n  \n) {\n  var a = arguments[0].a, b = arguments[0].b;\n  return a + b;\n}"
        );
    }

    #[test]
    fn test_trailing_comma_after_kept_parameter_is_left_alone() {
        let run = desugar("function k({a}, b,) { return a + b; }");
        assert_eq!(
            run.output,
            "function k($D0, b,) { var a = arguments[0].a; return a + b; }"
        );
    }

    #[test]
    fn test_this_parameter_precedes_the_first_removal() {
        let options = PassOptions::default();
        let src = "function f(this: Window, a = 1) { return a; }\nfunction g(this: Window, {b}) { return b; }\nfunction h(this: Window, ...r) { return r; }";
        let result = transform_source(src, "test.ts", &options).unwrap();
        assert_eq!(
            result.output,
            "function f(this: Window) { var a = arguments[0]; if (a === void 0) a = 1; return a; }\nfunction g(this: Window) { var b = arguments[0].b; return b; }\nfunction h(this: Window) { var r = [].slice.call(arguments, 0); return r; }"
        );
    }

    #[test]
    fn test_later_default_sees_nested_leaf() {
        let run = desugar("function f({a: {b}, c = b}) { return c; }");
        assert_eq!(
            run.output,
            "function f() { var $D0 = arguments[0].a, b = $D0.b, $D1 = arguments[0].c, c = $D1 === void 0 ? b : $D1;$D0 = null;$D1 = null; return c; }"
        );
    }

    #[test]
    fn test_leading_body_comment_is_not_repeated() {
        let run = desugar("function f(...r) { // keep\n  return r;\n}");
        assert_eq!(
            run.output,
            "function f() { // keep\n  var r = [].slice.call(arguments, 0);\n  return r;\n}"
        );
    }

    #[test]
    fn test_pattern_before_kept_parameter_becomes_placeholder() {
        let run = desugar("function f({a}, b) { return a + b; }");
        assert_eq!(
            run.output,
            "function f($D0, b) { var a = arguments[0].a; return a + b; }"
        );

        let function = &run.discovery.functions[0];
        let scope = run.discovery.scopes.scope_of(function.id).unwrap();
        let placeholder = run.discovery.scopes.scope(scope).get("$D0").unwrap();
        assert_eq!(placeholder.kind, DeclKind::Param);
        assert_eq!(placeholder.position, Some(Position::Index(0)));
    }

    #[test]
    fn test_defaulted_pattern_reads_argument_once() {
        let run = desugar("function f({a} = {}) { return a; }");
        assert_eq!(
            run.output,
            "function f() { var $D0 = arguments[0] !== void 0 ? arguments[0] : {}, a = $D0.a;$D0 = null; return a; }"
        );
        assert_eq!(run.outcomes[0].registered, vec!["a"]);
    }

    #[test]
    fn test_cleanup_can_be_disabled() {
        let options = PassOptions {
            cleanup_temporaries: false,
            ..PassOptions::default()
        };
        let run = desugar_with("function f({a: {b}}) { return b; }", &options);
        assert_eq!(
            run.output,
            "function f() { var $D0 = arguments[0].a, b = $D0.b; return b; }"
        );
    }

    #[test]
    fn test_temporaries_avoid_names_in_the_file() {
        let run = desugar("var $D0 = 1; function f({a: {b}}) { return b + $D0; }");
        assert_eq!(
            run.output,
            "var $D0 = 1; function f() { var $D1 = arguments[0].a, b = $D1.b;$D1 = null; return b + $D0; }"
        );
    }

    #[test]
    fn test_leaves_are_registered_in_hoist_scope_and_identifier_set() {
        let run = desugar("function f(a, {b}, ...c) { { let d; } }");
        let function = &run.discovery.functions[0];
        let scope = run.discovery.scopes.scope_of(function.id).unwrap();
        let scopes = &run.discovery.scopes;

        let b = scopes.scope(scope).get("b").unwrap();
        assert_eq!(b.kind, DeclKind::Var);
        assert_eq!(b.position, Some(Position::Index(1)));
        let c = scopes.scope(scope).get("c").unwrap();
        assert_eq!(c.position, Some(Position::Rest));
        assert!(run.identifiers.contains("b"));
        assert!(run.identifiers.contains("c"));
    }

    #[test]
    fn test_methods_are_rewritten() {
        let run = desugar("class A { m(a = 1) { return a; } }\nvar o = { n(...r) { return r; } };");
        assert_eq!(
            run.output,
            "class A { m() { var a = arguments[0]; if (a === void 0) a = 1; return a; } }\nvar o = { n() { var r = [].slice.call(arguments, 0); return r; } };"
        );
    }

    #[test]
    fn test_malformed_unwrapper_output_aborts_function() {
        let src = "function f(a, {b}) {}";
        let (mut discovery, mut identifiers, mut diagnostics) = discover(src);
        let mut unwrapper = MalformedUnwrapper;
        let options = PassOptions::default();
        let mut changes = ChangeSet::new();
        let mut pass = ParamPass::new(
            src,
            &mut discovery.scopes,
            &mut identifiers,
            &mut diagnostics,
            &mut unwrapper,
            &options,
        );
        let result = pass.run(&discovery.functions[0], &mut changes);
        assert_eq!(
            result,
            Err(DesugarError::NonSimpleDefinitionTarget {
                temporary: "t".to_string()
            })
        );
        assert!(changes.is_empty());
    }

    #[test]
    fn test_more_defaults_than_parameters_is_rejected() {
        let src = "function f(a = 1) {}";
        let (mut discovery, mut identifiers, mut diagnostics) = discover(src);
        let mut function = discovery.functions[0].clone();
        function.defaults.push(DefaultValue {
            span: SourceSpan::new(15, 16),
            ident: None,
        });

        let mut unwrapper = PatternUnwrapper::new(src, "$D");
        let options = PassOptions::default();
        let mut changes = ChangeSet::new();
        let mut pass = ParamPass::new(
            src,
            &mut discovery.scopes,
            &mut identifiers,
            &mut diagnostics,
            &mut unwrapper,
            &options,
        );
        assert_eq!(
            pass.run(&function, &mut changes),
            Err(DesugarError::DefaultsExceedParams {
                line: 1,
                defaults: 2,
                params: 1
            })
        );
        assert!(changes.is_empty());
    }

    #[test]
    fn test_function_without_scope_is_rejected() {
        let src = "function f(...r) {}";
        let (discovery, mut identifiers, mut diagnostics) = discover(src);
        let mut scopes = ScopeRegistry::new();
        let mut unwrapper = PatternUnwrapper::new(src, "$D");
        let options = PassOptions::default();
        let mut changes = ChangeSet::new();
        let mut pass = ParamPass::new(
            src,
            &mut scopes,
            &mut identifiers,
            &mut diagnostics,
            &mut unwrapper,
            &options,
        );
        assert_eq!(
            pass.run(&discovery.functions[0], &mut changes),
            Err(DesugarError::MissingScope { line: 1 })
        );
    }

    #[test]
    fn test_parameter_cannot_be_marked_twice() {
        let src = "function f(a = 1) {}";
        let (discovery, _, _) = discover(src);
        let function = &discovery.functions[0];
        let layout = classify(function, src).unwrap();
        let mut rewrite = Rewrite {
            function,
            marks: vec![false; layout.param_count],
            layout,
            hoist: discovery.scopes.module_scope(),
            edits: Vec::new(),
            outcome: FunctionOutcome::default(),
        };
        assert_eq!(rewrite.mark_replaced(0), Ok(()));
        assert_eq!(
            rewrite.mark_replaced(0),
            Err(DesugarError::ParamReplacedTwice { line: 1, index: 0 })
        );
    }

    #[test]
    fn test_classify_empty_body_anchor() {
        let src = "function f(a, b = 1, ...c) {}";
        let (discovery, _, _) = discover(src);
        let layout = classify(&discovery.functions[0], src).unwrap();
        assert_eq!(layout.param_count, 2);
        assert_eq!(layout.default_count, 1);
        assert_eq!(layout.plain, 0..1);
        assert_eq!(layout.defaulted, 1..2);
        assert_eq!(layout.rest.map(|r| r.name), Some("c".to_string()));
        assert_eq!(layout.anchor, src.len() - 1);
        assert_eq!(layout.indent, "");
    }
}
