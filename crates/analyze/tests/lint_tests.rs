//! Integration tests for schema lint and the type environment.
//!
//! Schemas are built inline as JSON, linted, and the diagnostics checked
//! by kind, severity and location.

use formlogic_analyze::{
    analyze, build_form_type_environment, lint_schema, validate_boolean_type, DiagnosticKind,
    LintReport, Severity,
};
use formlogic_core::{ExprType, InferredType};
use formlogic_schema::FormSchema;
use serde_json::json;

fn lint(v: serde_json::Value) -> LintReport {
    lint_schema(&FormSchema::from_json(&v).unwrap())
}

fn paths(report: &LintReport, kind: DiagnosticKind) -> Vec<String> {
    report.of_kind(kind).map(|d| d.path.join(".")).collect()
}

// ──────────────────────────────────────────────
// Clean schemas
// ──────────────────────────────────────────────

#[test]
fn well_formed_schema_is_clean() {
    let report = lint(json!({
        "fields": {
            "age": {"type": "number"},
            "guardian": {"type": "person", "visible": "not isAdult", "required": "not isAdult"},
            "address": {
                "type": "fieldset",
                "fields": {"city": {"type": "text", "required": "fields.address.country.value == 'NO'"},
                           "country": {"type": "select"}}
            }
        },
        "annexes": {"consent": {"visible": "not isAdult"}},
        "parties": {"seller": {"visible": "length(parties.seller) > 0"}},
        "logic": {"isAdult": "fields.age.value >= 18"}
    }));
    assert!(report.is_clean(), "{:?}", report.diagnostics);
}

// ──────────────────────────────────────────────
// Findings
// ──────────────────────────────────────────────

#[test]
fn syntax_errors_are_collected_per_site() {
    let report = lint(json!({
        "fields": {"a": {"type": "text", "visible": "fields.a.value ==", "required": "(1"}},
        "logic": {"k": "1 = 1"}
    }));
    assert_eq!(
        paths(&report, DiagnosticKind::SyntaxError),
        vec!["fields.a.visible", "fields.a.required", "logic.k"]
    );
    assert!(report.errors().all(|d| d.expression.is_some()));
}

#[test]
fn non_boolean_flag_is_type_mismatch() {
    let report = lint(json!({
        "fields": {
            "n": {"type": "number", "visible": "fields.n.value + 1"},
            "m": {"type": "text", "visible": "fields.mystery.value"}
        }
    }));
    let mismatches: Vec<_> = report.of_kind(DiagnosticKind::TypeMismatch).collect();
    assert_eq!(mismatches.len(), 2);
    assert_eq!(mismatches[0].path, vec!["fields", "m", "visible"]);
    assert_eq!(mismatches[0].severity, Severity::Warning);
    assert_eq!(mismatches[1].path, vec!["fields", "n", "visible"]);
    assert_eq!(mismatches[1].severity, Severity::Error);
}

#[test]
fn undefined_roots_and_undeclared_fields() {
    let report = lint(json!({
        "fields": {"a": {"type": "boolean", "visible": "isAdlt"}},
        "logic": {"x": "fields.b.value > 1"}
    }));
    assert_eq!(paths(&report, DiagnosticKind::UndefinedVariable), vec!["fields.a.visible"]);
    let undeclared: Vec<_> = report.of_kind(DiagnosticKind::UndeclaredField).collect();
    assert_eq!(undeclared.len(), 1);
    assert_eq!(undeclared[0].severity, Severity::Warning);
    assert!(undeclared[0].message.contains("'b'"));
}

#[test]
fn cyclic_keys_are_warnings() {
    let report = lint(json!({"logic": {"a": "b", "b": "a", "c": "true"}}));
    assert_eq!(
        paths(&report, DiagnosticKind::CyclicDependencyWarning),
        vec!["logic.a", "logic.b"]
    );
    assert!(!report.has_errors());
}

#[test]
fn report_serializes_camel_case_kinds() {
    let report = lint(json!({"logic": {"x": "x"}}));
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["diagnostics"][0]["kind"], json!("cyclicDependencyWarning"));
    assert_eq!(json["diagnostics"][0]["severity"], json!("warning"));
}

#[test]
fn json_entry_point_rejects_non_objects() {
    assert!(analyze(&json!("nope")).is_err());
    assert!(analyze(&json!({})).unwrap().is_clean());
}

// ──────────────────────────────────────────────
// Type environment
// ──────────────────────────────────────────────

#[test]
fn environment_types_logic_chain() {
    let schema = FormSchema::from_json(&json!({
        "fields": {"price": {"type": "number"}, "qty": {"type": "number"}},
        "logic": {
            "total": "fields.price.value * fields.qty.value",
            "expensive": "total > 1000",
            "summary": "expensive ? 'big order' : total"
        }
    }))
    .unwrap();
    let env = build_form_type_environment(&schema);
    assert_eq!(env.lookup("total"), InferredType::Certain(ExprType::Number));
    assert_eq!(env.lookup("expensive"), InferredType::Certain(ExprType::Boolean));
    assert_eq!(env.lookup("summary"), InferredType::Unknown);
    assert!(validate_boolean_type("expensive", &env).is_valid());
    assert_eq!(
        validate_boolean_type("total", &env).issue().map(|i| i.severity),
        Some(Severity::Error)
    );
}
