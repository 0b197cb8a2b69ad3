//! Tests for TypeScript and JavaScript parser

#[cfg(test)]
mod parser_tests {
    use crate::parser;
    use crate::span::SourceSpan;
    use swc_common::{sync::Lrc, SourceMap, Spanned};
    use swc_ecma_ast::{Decl, ModuleItem, Stmt};

    fn parse_test(src: &str, filename: &str) -> Result<parser::ParsedSource, anyhow::Error> {
        let cm: Lrc<SourceMap> = Default::default();
        parser::parse_source(src, &cm, filename)
    }

    #[test]
    fn test_parse_default_and_rest_parameters() {
        let src = "function foo(a, b = 1, ...rest) { return rest; }";
        assert!(parse_test(src, "test.js").is_ok());
    }

    #[test]
    fn test_parse_typescript_types() {
        let src = "function foo({ x }: { x: number }, y: number = 2): number { return x * y; }";
        assert!(parse_test(src, "test.ts").is_ok());
    }

    #[test]
    fn test_parse_rejects_jsx_in_plain_javascript() {
        let src = "function foo() { return <div>hello</div>; }";
        assert!(parse_test(src, "test.js").is_err());
        assert!(parse_test(src, "test.jsx").is_ok());
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let err = parse_test("function foo( { return }", "broken.js")
            .err()
            .expect("parse should fail");
        assert!(format!("{:#}", err).contains("broken.js"));
    }

    #[test]
    fn test_spans_rebase_against_second_file() {
        let cm: Lrc<SourceMap> = Default::default();
        parser::parse_source("var padding = 1;", &cm, "first.js").unwrap();
        let src = "function g() {}";
        let parsed = parser::parse_source(src, &cm, "second.js").unwrap();

        let ModuleItem::Stmt(Stmt::Decl(Decl::Fn(decl))) = &parsed.module.body[0] else {
            panic!("expected a function declaration");
        };
        let span = SourceSpan::from_swc(decl.function.span(), parsed.base());
        assert_eq!(span.end, src.len());
        assert!(span.text(src).is_some_and(|text| text.ends_with("g() {}")));
    }

    #[test]
    fn test_supported_extensions() {
        assert!(parser::is_supported_file("src/app.js"));
        assert!(parser::is_supported_file("src/app.tsx"));
        assert!(parser::is_supported_file("lib/index.cjs"));
        assert!(!parser::is_supported_file("src/main.rs"));
        assert!(!parser::is_supported_file("README"));
    }
}
