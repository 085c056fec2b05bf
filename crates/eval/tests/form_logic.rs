//! End-to-end form logic evaluation.
//!
//! Each test builds schema and data JSON inline, runs the public entry
//! points, and checks the resulting runtime state.

use formlogic_eval::{
    build_form_context, evaluate, evaluate_form_logic, get_field_value_from_context,
    get_logic_values, EvaluateError, FilledForm, Value,
};
use formlogic_schema::{FormData, FormSchema};
use serde_json::json;

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

fn schema(v: serde_json::Value) -> FormSchema {
    FormSchema::from_json(&v).unwrap()
}

fn data(v: serde_json::Value) -> FormData {
    FormData::from_json(&v).unwrap()
}

fn adult_schema() -> FormSchema {
    schema(json!({
        "fields": {"age": {"type": "number"}},
        "logic": {"isAdult": "fields.age.value >= 18"}
    }))
}

// ──────────────────────────────────────────────
// Logic values
// ──────────────────────────────────────────────

#[test]
fn is_adult_true_at_25() {
    let state = evaluate_form_logic(&adult_schema(), &data(json!({"fields": {"age": 25}}))).unwrap();
    assert_eq!(state.logic_values.get("isAdult"), Some(&Value::Bool(true)));
}

#[test]
fn is_adult_false_at_10() {
    let state = evaluate_form_logic(&adult_schema(), &data(json!({"fields": {"age": 10}}))).unwrap();
    assert_eq!(state.logic_values.get("isAdult"), Some(&Value::Bool(false)));
}

#[test]
fn unanswered_age_is_not_adult() {
    let state = evaluate_form_logic(&adult_schema(), &FormData::default()).unwrap();
    assert_eq!(state.logic_values.get("isAdult"), Some(&Value::Bool(false)));
}

#[test]
fn logic_key_reads_earlier_key() {
    let s = schema(json!({"logic": {"a": "b + 1", "b": "1"}}));
    let values = get_logic_values(&s, &FormData::default()).unwrap();
    assert_eq!(values.get("a"), Some(&Value::from(2)));
}

#[test]
fn logic_chain_over_fieldset_and_parties() {
    let s = schema(json!({
        "fields": {
            "property": {
                "type": "fieldset",
                "fields": {"price": {"type": "money"}, "deposit": {"type": "number"}}
            }
        },
        "parties": {"buyer": {}},
        "logic": {
            "depositRatio": "fields.property.deposit.value / fields.property.price.value.amount",
            "lowDeposit": "depositRatio < 0.1",
            "buyerSigned": "parties.buyer[0].signed"
        }
    }));
    let d = data(json!({
        "fields": {"property": {"price": {"amount": 500000, "currency": "EUR"}, "deposit": 25000}},
        "parties": {"buyer": {"type": "person", "data": {}, "signature": {"at": "2024-01-01"}}}
    }));
    let values = get_logic_values(&s, &d).unwrap();
    assert_eq!(values["depositRatio"].to_json(), json!(0.05));
    assert_eq!(values["lowDeposit"], Value::Bool(true));
    assert_eq!(values["buyerSigned"], Value::Bool(true));
}

// ──────────────────────────────────────────────
// Field and annex defaults
// ──────────────────────────────────────────────

#[test]
fn field_without_expressions_takes_defaults() {
    let s = schema(json!({
        "fields": {
            "plain": {"type": "text"},
            "mandatory": {"type": "text", "required": true}
        }
    }));
    let state = evaluate_form_logic(&s, &FormData::default()).unwrap();
    let plain = state.fields["plain"];
    assert!(plain.visible && !plain.required && !plain.disabled);
    let mandatory = state.fields["mandatory"];
    assert!(mandatory.visible && mandatory.required && !mandatory.disabled);
}

#[test]
fn broken_expressions_fall_back_to_defaults() {
    let s = schema(json!({
        "fields": {
            "a": {"type": "text", "visible": "fields.age.value >=", "required": "nope > 1"},
            "b": {"type": "text", "disabled": "1 / 0"},
            "c": {"type": "text", "visible": "fields.a.value"}
        },
        "annexes": {"x": {"visible": "'text' * 2", "required": "unknownKey"}}
    }));
    let state = evaluate_form_logic(&s, &FormData::default()).unwrap();
    assert!(state.fields["a"].visible);
    assert!(!state.fields["a"].required);
    assert!(!state.fields["b"].disabled);
    // Unanswered field has no boolean reading
    assert!(state.fields["c"].visible);
    assert!(state.annexes["x"].visible);
    assert!(!state.annexes["x"].required);
}

#[test]
fn hostile_expressions_fall_back_to_defaults() {
    let pow_chain = format!("{}1", "1^".repeat(200_000));
    let sum_chain = format!("{}1", "1 + ".repeat(200_000));
    let s = schema(json!({
        "fields": {
            "a": {"type": "text", "visible": "2 ^ -9223372036854775808 > 0"},
            "b": {"type": "text", "required": "1 ^ 9223372036854775807 == 1"},
            "c": {"type": "text", "disabled": pow_chain}
        },
        "logic": {"total": sum_chain}
    }));
    let state = evaluate_form_logic(&s, &FormData::default()).unwrap();
    assert!(state.fields["a"].visible);
    assert!(!state.fields["b"].required);
    assert!(!state.fields["c"].disabled);
    assert_eq!(state.logic_values["total"], Value::Undefined);
}

#[test]
fn nested_fieldsets_flatten_to_dotted_paths() {
    let s = schema(json!({
        "fields": {
            "employer": {
                "type": "fieldset",
                "visible": "fields.employed.value",
                "fields": {
                    "name": {"type": "text", "required": "fields.employed.value == true"},
                    "address": {
                        "type": "fieldset",
                        "fields": {"city": {"type": "text"}}
                    }
                }
            },
            "employed": {"type": "boolean"}
        }
    }));
    let state = evaluate_form_logic(&s, &data(json!({"fields": {"employed": false}}))).unwrap();
    let paths: Vec<&str> = state.fields.keys().map(String::as_str).collect();
    assert_eq!(
        paths,
        vec!["employed", "employer", "employer.address", "employer.address.city", "employer.name"]
    );
    assert!(!state.fields["employer"].visible);
    // Children keep their own state
    assert!(state.fields["employer.name"].visible);
    assert!(!state.fields["employer.name"].required);
}

#[test]
fn party_count_drives_annex() {
    let s = schema(json!({
        "parties": {"tenant": {}},
        "annexes": {"coTenancy": {"visible": "length(parties.tenant) > 1", "required": "length(parties.tenant) > 1"}}
    }));
    let one = data(json!({"parties": {"tenant": {"type": "person", "data": {}}}}));
    let two = data(json!({"parties": {"tenant": [
        {"type": "person", "data": {}},
        {"type": "person", "data": {}}
    ]}}));
    assert!(!evaluate_form_logic(&s, &one).unwrap().annexes["coTenancy"].visible);
    let state = evaluate_form_logic(&s, &two).unwrap();
    assert!(state.annexes["coTenancy"].visible);
    assert!(state.annexes["coTenancy"].required);
}

// ──────────────────────────────────────────────
// Cycles, idempotence, structure
// ──────────────────────────────────────────────

#[test]
fn self_reference_is_reported_and_does_not_fail() {
    let s = schema(json!({"logic": {"x": "x + 1"}}));
    let state = evaluate_form_logic(&s, &FormData::default()).unwrap();
    assert_eq!(state.cyclic_keys, vec!["x"]);
    assert_eq!(state.logic_values["x"], Value::Undefined);
}

#[test]
fn mutual_cycle_does_not_block_other_keys() {
    let s = schema(json!({
        "fields": {"f": {"type": "text", "visible": "a"}},
        "logic": {"a": "b", "b": "a", "ok": "2 * 3"}
    }));
    let state = evaluate_form_logic(&s, &FormData::default()).unwrap();
    assert_eq!(state.cyclic_keys, vec!["a", "b"]);
    assert_eq!(state.logic_values["ok"], Value::from(6));
    assert!(state.fields["f"].visible);
}

#[test]
fn evaluation_is_idempotent() {
    let s = schema(json!({
        "fields": {"n": {"type": "number", "visible": "double > 4"}},
        "logic": {"double": "fields.n.value * 2"}
    }));
    let d = data(json!({"fields": {"n": 3}}));
    assert_eq!(
        evaluate_form_logic(&s, &d).unwrap(),
        evaluate_form_logic(&s, &d).unwrap()
    );
}

#[test]
fn structural_problems_are_issues() {
    let s = schema(json!({
        "fields": {"": {"type": "text"}},
        "logic": {"parties": "1", "fine": "2"}
    }));
    let err = evaluate_form_logic(&s, &FormData::default()).unwrap_err();
    assert_eq!(err.issues.len(), 2);
    assert!(err.issues.iter().any(|i| i.path == vec!["logic", "parties"]));
}

#[test]
fn json_entry_point() {
    let state = evaluate(
        &json!({"fields": {"age": {"type": "number"}}, "logic": {"isAdult": "fields.age.value >= 18"}}),
        &json!({"fields": {"age": 40}}),
    )
    .unwrap();
    assert_eq!(state.logic_values["isAdult"], Value::Bool(true));

    let err = evaluate(&json!([]), &json!({})).unwrap_err();
    assert!(matches!(err, EvaluateError::Schema(_)));
}

#[test]
fn runtime_state_serializes_for_renderers() {
    let state = evaluate_form_logic(&adult_schema(), &data(json!({"fields": {"age": 25}}))).unwrap();
    assert_eq!(
        serde_json::to_value(&state).unwrap(),
        json!({
            "fields": {"age": {"visible": true, "required": false, "disabled": false}},
            "annexes": {},
            "logicValues": {"isAdult": true},
            "cyclicKeys": []
        })
    );
}

// ──────────────────────────────────────────────
// Context and filled-form wrapper
// ──────────────────────────────────────────────

#[test]
fn context_field_lookup_accepts_flat_and_nested_data() {
    let s = schema(json!({
        "fields": {"addr": {"type": "fieldset", "fields": {"zip": {"type": "text"}}}}
    }));
    for d in [
        json!({"fields": {"addr": {"zip": "0150"}}}),
        json!({"fields": {"addr.zip": "0150"}}),
    ] {
        let ctx = build_form_context(&s, &data(d)).unwrap();
        assert_eq!(
            get_field_value_from_context(&ctx.fields, "addr.zip"),
            Some(Value::from("0150"))
        );
    }
}

#[test]
fn filled_form_recomputes_only_for_new_data() {
    let form = FilledForm::new(adult_schema(), data(json!({"fields": {"age": 10}})));
    assert_eq!(form.logic_value("isAdult"), Some(&Value::Bool(false)));
    let grown = form.with_data(data(json!({"fields": {"age": 21}})));
    assert_eq!(grown.logic_value("isAdult"), Some(&Value::Bool(true)));
    assert_eq!(form.logic_value("isAdult"), Some(&Value::Bool(false)));
    assert!(grown.field_state("age").unwrap().visible);
    assert!(grown.field_state("missing").is_none());
}
