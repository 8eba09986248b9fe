//! Integration tests for descriptor validation.

use boutiques_schema_core::legacy::{LegacyDescriptor, LegacyInput, LegacyValue};
use boutiques_schema_core::{
    Descriptor, Dialect, MAX_CONDITION_NESTING, ValidationErrorKind, ValidationErrors,
    validate_descriptor,
};
use serde_json::{Value, json};

/// Wraps `inputs` in a minimal document of `dialect`.
fn descriptor_with_inputs(dialect: Dialect, inputs: Value) -> Value {
    json!({
        "name": "tool",
        "command-line": "tool [IN1] [N]",
        "schema-version": dialect.schema_version(),
        "inputs": inputs,
    })
}

fn legacy(document: &Value) -> Result<LegacyDescriptor, ValidationErrors> {
    match validate_descriptor(document, Dialect::Boutiques05)? {
        Descriptor::Legacy(descriptor) => Ok(descriptor),
        Descriptor::Extended(_) => panic!("legacy dialect produced an extended descriptor"),
    }
}

fn paths(errors: &ValidationErrors) -> Vec<String> {
    errors.iter().map(|e| e.path.to_string()).collect()
}

#[test]
fn test_optional_string_input() {
    let document = descriptor_with_inputs(
        Dialect::Boutiques05,
        json!([{
            "id": "in1",
            "name": "In One",
            "type": "String",
            "value-key": "[IN1]",
            "optional": true,
        }]),
    );
    let descriptor = legacy(&document).unwrap();
    let input = &descriptor.inputs[0];
    assert_eq!(input.variant_name(), "StringInput");
    assert!(input.list_spec().is_none());
    assert!(input.command_line_flag().is_none());
    let LegacyValue::String(value) = input.value() else {
        panic!("expected a string value, got {input:?}");
    };
    assert!(value.optional);
}

#[test]
fn test_id_and_value_key_patterns() {
    // `1bad` is a valid identifier; the extended value-key pattern rejects `x`.
    let input = json!([{"id": "1bad", "type": "String", "value-key": "x", "name": "n"}]);

    let document = descriptor_with_inputs(Dialect::StyxDescriptor1, input.clone());
    let errors = validate_descriptor(&document, Dialect::StyxDescriptor1).unwrap_err();
    assert_eq!(paths(&errors), vec!["$.inputs[0].value-key"]);
    assert!(matches!(
        errors.as_slice()[0].kind,
        ValidationErrorKind::PatternMismatch { pattern: r"^\[[0-9_A-Z]+\]$", .. }
    ));

    let document = descriptor_with_inputs(Dialect::Boutiques05, input);
    assert!(legacy(&document).is_ok());

    let document = descriptor_with_inputs(
        Dialect::Boutiques05,
        json!([{"id": "in-1", "type": "String", "value-key": "[IN1]", "name": "n"}]),
    );
    let errors = legacy(&document).unwrap_err();
    assert_eq!(paths(&errors), vec!["$.inputs[0].id"]);
    assert!(matches!(
        errors.as_slice()[0].kind,
        ValidationErrorKind::PatternMismatch { .. }
    ));
}

#[test]
fn test_explicit_float_number() {
    let document = descriptor_with_inputs(
        Dialect::Boutiques05,
        json!([{"type": "Number", "integer": false, "value-key": "[N]", "id": "n", "name": "N"}]),
    );
    let descriptor = legacy(&document).unwrap();
    assert!(matches!(descriptor.inputs[0], LegacyInput::Float(_)));
}

#[test]
fn test_number_resolution_is_exclusive() {
    for (integer, expected) in [
        (None, "IntegerInput"),
        (Some(true), "IntegerInput"),
        (Some(false), "FloatInput"),
    ] {
        let mut input = json!({"id": "n", "name": "N", "type": "Number", "value-key": "[N]"});
        if let Some(integer) = integer {
            input["integer"] = json!(integer);
        }
        let document = descriptor_with_inputs(Dialect::Boutiques05, json!([input]));
        let descriptor = legacy(&document).unwrap();
        assert_eq!(descriptor.inputs[0].variant_name(), expected);
    }
}

#[test]
fn test_integer_input_accepts_integral_floats() {
    let input = json!({
        "id": "n",
        "name": "N",
        "type": "Number",
        "value-key": "[N]",
        "minimum": 1.0,
        "default-value": 5.0,
        "value-choices": [5.0, 6],
    });
    let document = descriptor_with_inputs(Dialect::Boutiques05, json!([input]));
    let descriptor = legacy(&document).unwrap();
    let LegacyValue::Integer(value) = descriptor.inputs[0].value() else {
        panic!("expected an integer input");
    };
    assert_eq!(value.default_value, Some(5));
    assert_eq!(value.value_choices, Some(vec![5, 6]));

    let mut fractional = input.clone();
    fractional["default-value"] = json!(5.5);
    let document = descriptor_with_inputs(Dialect::Boutiques05, json!([fractional]));
    let errors = legacy(&document).unwrap_err();
    assert_eq!(paths(&errors), vec!["$.inputs[0].default-value"]);
}

#[test]
fn test_flag_rejects_list_marker() {
    for dialect in Dialect::ALL {
        let document = descriptor_with_inputs(
            dialect,
            json!([{
                "id": "v",
                "name": "Verbose",
                "type": "Flag",
                "value-key": "[V]",
                "command-line-flag": "-v",
                "list": false,
            }]),
        );
        let errors = validate_descriptor(&document, dialect).unwrap_err();
        assert_eq!(errors.len(), 1, "{errors}");
        assert!(matches!(
            &errors.as_slice()[0].kind,
            ValidationErrorKind::NoMatchingVariant { family: "input", .. }
        ));
    }
}

#[test]
fn test_strictness_depends_on_dialect() {
    let mut document = json!({
        "name": "tool",
        "command-line": "tool",
        "schema-version": "0.5+styx",
        "maintainer": "someone",
    });
    let errors = validate_descriptor(&document, Dialect::StyxDescriptor1).unwrap_err();
    assert_eq!(paths(&errors), vec!["$.maintainer"]);
    assert_eq!(errors.as_slice()[0].kind, ValidationErrorKind::UnknownField);

    document["schema-version"] = json!("0.5");
    assert!(validate_descriptor(&document, Dialect::Boutiques05).is_ok());
}

#[test]
fn test_schema_version_must_match_dialect() {
    let document = json!({"name": "tool", "command-line": "tool", "schema-version": "0.5"});
    let errors = validate_descriptor(&document, Dialect::StyxDescriptor1).unwrap_err();
    assert_eq!(paths(&errors), vec!["$.schema-version"]);
    assert_eq!(Dialect::detect(&document), Some(Dialect::Boutiques05));
}

#[test]
fn test_every_problem_is_reported() {
    let document = json!({
        "command-line": "",
        "schema-version": "0.5",
        "inputs": [
            {"id": "a", "type": "String", "value-key": "[A]"},
            {"id": "b", "name": "B", "type": "Directory", "value-key": "[B]"},
        ],
        "suggested-resources": {"cpu-cores": 0},
    });
    let errors = legacy(&document).unwrap_err();
    assert_eq!(
        paths(&errors),
        vec![
            "$.name",
            "$.command-line",
            "$.inputs[0].name",
            "$.inputs[1]",
            "$.suggested-resources.cpu-cores",
        ]
    );
    assert_eq!(errors.as_slice()[1].kind, ValidationErrorKind::TooShort { min: 1 });
}

#[test]
fn test_conditional_output_rules() {
    let base = json!({
        "name": "tool",
        "command-line": "tool [MODE]",
        "schema-version": "0.5",
        "inputs": [{"id": "mode", "name": "Mode", "type": "Number", "value-key": "[MODE]"}],
    });

    let mut document = base.clone();
    document["output-files"] = json!([{
        "id": "out",
        "name": "Out",
        "conditional-path-template": [
            {"mode > 1": "big.txt"},
            {"default": "small.txt"},
        ],
    }]);
    assert!(legacy(&document).is_ok());

    let mut document = base.clone();
    document["output-files"] = json!([{
        "id": "out",
        "name": "Out",
        "optional": true,
        "conditional-path-template": [
            {"default": "small.txt"},
            {"mode > 1": "big.txt"},
        ],
    }]);
    let errors = legacy(&document).unwrap_err();
    let kinds: Vec<&ValidationErrorKind> = errors.iter().map(|e| &e.kind).collect();
    assert_eq!(
        kinds,
        vec![&ValidationErrorKind::MisplacedDefault, &ValidationErrorKind::MissingDefaultCondition]
    );

    let mut document = base;
    document["output-files"] = json!([{
        "id": "out",
        "name": "Out",
        "path-template": "out.txt",
        "conditional-path-template": [{"default": "out.txt"}],
    }]);
    let errors = legacy(&document).unwrap_err();
    assert!(matches!(
        errors.as_slice()[0].kind,
        ValidationErrorKind::NoMatchingVariant { family: "output", .. }
    ));
}

#[test]
fn test_deeply_nested_condition_is_an_error() {
    let nested = |depth: usize| format!("{}mode > 1{}", "(".repeat(depth), ")".repeat(depth));
    let document_with = |condition: String| {
        json!({
            "name": "tool",
            "command-line": "tool [MODE]",
            "schema-version": "0.5",
            "inputs": [{"id": "mode", "name": "Mode", "type": "Number", "value-key": "[MODE]"}],
            "output-files": [{
                "id": "out",
                "name": "Out",
                "conditional-path-template": [{condition: "big.txt"}, {"default": "small.txt"}],
            }],
        })
    };

    assert!(legacy(&document_with(nested(MAX_CONDITION_NESTING))).is_ok());

    let errors = legacy(&document_with(nested(5000))).unwrap_err();
    assert_eq!(errors.len(), 1, "{errors}");
    assert!(matches!(
        errors.as_slice()[0].kind,
        ValidationErrorKind::InvalidCondition { .. }
    ));
}

#[test]
fn test_duplicate_ids_survive_invalid_siblings() {
    let document = descriptor_with_inputs(
        Dialect::Boutiques05,
        json!([
            {"id": "a", "name": "A", "type": "String", "value-key": "[A]"},
            {"id": "a", "name": "A again", "type": "String", "value-key": "[B]"},
            {"id": "b", "name": "B", "type": "Directory", "value-key": "[C]"},
        ]),
    );
    let errors = legacy(&document).unwrap_err();
    assert_eq!(paths(&errors), vec!["$.inputs[2]", "$.inputs[1].id"]);
    assert!(matches!(
        errors.as_slice()[0].kind,
        ValidationErrorKind::NoMatchingVariant { family: "input", .. }
    ));
    assert_eq!(
        errors.as_slice()[1].kind,
        ValidationErrorKind::DuplicateId("a".into())
    );
}

#[test]
fn test_duplicate_ids_inside_sub_command() {
    let sub_command = json!({
        "id": "run",
        "command-line": "run [X]",
        "inputs": [
            {"id": "x", "type": "String", "value-key": "[X]"},
            {"id": "x", "type": "File", "value-key": "[X]"},
        ],
    });
    let document = descriptor_with_inputs(
        Dialect::StyxDescriptor1,
        json!([{"id": "step", "value-key": "[IN1]", "type": sub_command.clone()}]),
    );
    let errors = validate_descriptor(&document, Dialect::StyxDescriptor1).unwrap_err();
    assert_eq!(paths(&errors), vec!["$.inputs[0].type.inputs[1].id"]);
    assert_eq!(
        errors.as_slice()[0].kind,
        ValidationErrorKind::DuplicateId("x".into())
    );

    // A broken sub-command still reports its duplicates.
    let mut broken = sub_command;
    broken.as_object_mut().unwrap().remove("command-line");
    let document = descriptor_with_inputs(
        Dialect::StyxDescriptor1,
        json!([{"id": "step", "value-key": "[IN1]", "type": broken}]),
    );
    let errors = validate_descriptor(&document, Dialect::StyxDescriptor1).unwrap_err();
    assert_eq!(
        paths(&errors),
        vec!["$.inputs[0].type.command-line", "$.inputs[0].type.inputs[1].id"]
    );
}

#[test]
fn test_recursive_sub_command_paths() {
    let document = json!({
        "name": "tool",
        "command-line": "tool [STEP]",
        "schema-version": "0.5+styx",
        "inputs": [{
            "id": "step",
            "value-key": "[STEP]",
            "type": [
                {"id": "first", "command-line": "first"},
                {
                    "id": "second",
                    "command-line": "second [DEEP]",
                    "inputs": [{
                        "id": "deep",
                        "value-key": "[DEEP]",
                        "type": {
                            "id": "leaf",
                            "command-line": "leaf [X]",
                            "inputs": [{
                                "id": "x",
                                "type": "Number",
                                "value-key": "[X]",
                                "minimum": "0",
                            }],
                        },
                    }],
                },
            ],
        }],
    });
    let errors = validate_descriptor(&document, Dialect::StyxDescriptor1).unwrap_err();
    assert_eq!(
        paths(&errors),
        vec!["$.inputs[0].type[1].inputs[0].type.inputs[0].minimum"]
    );
}

#[test]
fn test_descriptor_round_trips_through_serde() {
    let document = json!({
        "name": "tool",
        "command-line": "tool [MODE]",
        "schema-version": "0.5+styx",
        "inputs": [{
            "id": "mode",
            "value-key": "[MODE]",
            "command-line-flag": "--mode",
            "type": {"id": "fast", "command-line": "fast"},
        }],
    });
    let descriptor = validate_descriptor(&document, Dialect::StyxDescriptor1).unwrap();
    let value = serde_json::to_value(&descriptor).unwrap();
    let reparsed = validate_descriptor(&value, Dialect::StyxDescriptor1).unwrap();
    assert_eq!(descriptor, reparsed);
}
