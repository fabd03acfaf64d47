//! End-to-end compile scenarios, one per the worked examples in the
//! specification's "testable properties" section: parse → evaluate →
//! extend → serialize, exercised through the public `compile_string` API
//! rather than any one stage in isolation.

use std::sync::Arc;

use sass_core::error::{SassError, SassResult, SourceFile};
use sass_core::importer::Importer;
use sass_core::parser::Syntax;
use sass_core::serializer::OutputStyle;
use sass_core::{compile_string, CompileOptions};
use url::Url;

fn url(name: &str) -> Url {
    Url::parse(&format!("file:///{name}")).unwrap()
}

fn compile(source: &str, syntax: Syntax, options: &CompileOptions) -> SassResult<String> {
    compile_string(source, url("input"), syntax, options).map(|r| r.css)
}

#[test]
fn addition_of_two_numbers() {
    let css = compile("a { b: 1 + 2; }", Syntax::Scss, &CompileOptions::default()).unwrap();
    assert_eq!(css, "a {\n  b: 3;\n}\n");
}

#[test]
fn incompatible_units_is_a_runtime_error() {
    let err = compile("a { b: 1px + 1deg; }", Syntax::Scss, &CompileOptions::default()).unwrap_err();
    assert!(err.to_string().contains("Incompatible units deg and px."));
}

#[test]
fn adding_two_parenthesized_colors_is_undefined() {
    let err = compile("a { b: (#123) + (#456); }", Syntax::Scss, &CompileOptions::default()).unwrap_err();
    assert!(err.to_string().contains("Undefined operation"));
}

#[test]
fn extend_joins_the_original_and_extending_selector() {
    let css = compile("A { p: q; }\n.b { @extend A; }\n", Syntax::Scss, &CompileOptions::default()).unwrap();
    assert_eq!(css, "A, .b {\n  p: q;\n}\n");
}

#[test]
fn indented_syntax_compressed_with_charset_bom() {
    let options = CompileOptions::default().with_style(OutputStyle::Compressed);
    let css = compile("a\n  b: \u{1f46d}\n", Syntax::Indented, &options).unwrap();
    assert_eq!(css, "\u{feff}a{b:\u{1f46d}}");
}

/// A minimal in-memory importer used to exercise the "an importer supplies
/// a stylesheet for `@import \"lib\"`" scenario without touching the
/// filesystem.
struct InMemoryImporter {
    canonical: Url,
    text: &'static str,
}

impl Importer for InMemoryImporter {
    fn canonicalize(&self, target: &str, _from: &Url, _from_import: bool) -> Option<Url> {
        (target == "lib").then(|| self.canonical.clone())
    }

    fn load(&self, canonical: &Url) -> SassResult<(Arc<SourceFile>, Syntax)> {
        if *canonical == self.canonical {
            Ok((Arc::new(SourceFile::new(canonical.clone(), self.text)), Syntax::Scss))
        } else {
            Err(SassError::import("not found", dummy_span()))
        }
    }
}

fn dummy_span() -> sass_core::error::Span {
    let source = Arc::new(SourceFile::new(url("unused"), ""));
    sass_core::error::Span::new(source, 0, 0)
}

#[test]
fn importer_resolves_at_import_target() {
    let importer = InMemoryImporter {
        canonical: url("lib.scss"),
        text: ".foo { color: red; }",
    };
    let options = CompileOptions::default().with_importer(Box::new(importer));
    let css = compile("@import \"lib\";\n", Syntax::Scss, &options).unwrap();
    assert_eq!(css, ".foo {\n  color: red;\n}\n");
}

#[test]
fn repeated_compilation_is_deterministic() {
    let source = "$x: 10px;\na { width: $x * 2; }\n";
    let first = compile(source, Syntax::Scss, &CompileOptions::default()).unwrap();
    let second = compile(source, Syntax::Scss, &CompileOptions::default()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn import_cycle_is_an_import_error_not_an_infinite_loop() {
    struct CyclicImporter;
    impl Importer for CyclicImporter {
        fn canonicalize(&self, target: &str, _from: &Url, _from_import: bool) -> Option<Url> {
            (target == "self").then(|| url("self.scss"))
        }

        fn load(&self, canonical: &Url) -> SassResult<(Arc<SourceFile>, Syntax)> {
            assert_eq!(*canonical, url("self.scss"));
            Ok((Arc::new(SourceFile::new(canonical.clone(), "@import \"self\";")), Syntax::Scss))
        }
    }
    let options = CompileOptions::default().with_importer(Box::new(CyclicImporter));
    let err = compile("@import \"self\";", Syntax::Scss, &options).unwrap_err();
    assert!(matches!(err, SassError::Import { .. }));
}

#[test]
fn host_function_is_callable_with_defaults() {
    use sass_core::evaluator::UserFunction;
    use sass_core::value::{SassNumber, Value};

    let double = UserFunction::new("double", "$n, $by: 2", |args| {
        let (Value::Number(n), Value::Number(by)) = (&args[0], &args[1]) else {
            return Err("double() expects numbers".to_string());
        };
        Ok(Value::Number(SassNumber::with_units(
            n.value() * by.value(),
            n.numerator_units().to_vec(),
            n.denominator_units().to_vec(),
        )))
    });
    let options = CompileOptions::default().with_function(double);
    let css = compile("a { b: double(10px); c: double(10px, 3); }", Syntax::Scss, &options).unwrap();
    assert_eq!(css, "a {\n  b: 20px;\n  c: 30px;\n}\n");
}
