//! Integration tests for the JSON Schema exporter.

use boutiques_schema_core::{
    BOUTIQUES_0_5, BOUTIQUES_STYX_DESCRIPTOR_1, Dialect, export, export_dialect,
    validate_descriptor,
};
use jsonschema::{Draft, Validator};
use serde_json::{Value, json};

const LEGACY_INPUT_VARIANTS: [&str; 17] = [
    "FlagInput",
    "StringInput",
    "FileInput",
    "IntegerInput",
    "FloatInput",
    "StringListInput",
    "FileListInput",
    "IntegerListInput",
    "FloatListInput",
    "CommandLineFlaggedStringInput",
    "CommandLineFlaggedFileInput",
    "CommandLineFlaggedIntegerInput",
    "CommandLineFlaggedFloatInput",
    "CommandLineFlaggedStringListInput",
    "CommandLineFlaggedFileListInput",
    "CommandLineFlaggedIntegerListInput",
    "CommandLineFlaggedFloatListInput",
];

const SUB_COMMAND_INPUT_VARIANTS: [&str; 8] = [
    "SubCommandInput",
    "SubCommandUnionInput",
    "SubCommandListInput",
    "SubCommandUnionListInput",
    "CommandLineFlaggedSubCommandInput",
    "CommandLineFlaggedSubCommandListInput",
    "CommandLineFlaggedSubCommandUnionInput",
    "CommandLineFlaggedSubCommandUnionListInput",
];

fn compile(schema: &Value) -> Validator {
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(schema)
        .unwrap_or_else(|err| panic!("exported schema does not compile: {err}"))
}

fn definitions(schema: &Value) -> &serde_json::Map<String, Value> {
    schema["$defs"].as_object().expect("$defs is an object")
}

/// Collects every `$ref` target in `value`.
fn collect_refs<'a>(value: &'a Value, refs: &mut Vec<&'a str>) {
    match value {
        Value::Object(map) => {
            for (key, member) in map {
                match (key.as_str(), member) {
                    ("$ref", Value::String(target)) => refs.push(target),
                    _ => collect_refs(member, refs),
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_refs(item, refs)),
        _ => {}
    }
}

#[test]
fn test_legacy_export_defines_every_input_variant() {
    let schema = export(BOUTIQUES_0_5).unwrap();
    let defs = definitions(&schema);
    for name in LEGACY_INPUT_VARIANTS {
        assert!(defs.contains_key(name), "missing definition {name}");
    }
    for name in [
        "PathTemplateOutput",
        "ConditionalPathTemplateOutput",
        "DockerContainerImage",
        "RootfsContainerImage",
        "SuggestedResources",
        "Group",
        "EnvironmentVariable",
        "ErrorCode",
        "TestCase",
    ] {
        assert!(defs.contains_key(name), "missing definition {name}");
    }
    for name in SUB_COMMAND_INPUT_VARIANTS {
        assert!(!defs.contains_key(name), "legacy schema defines {name}");
    }
    assert!(schema.get("additionalProperties").is_none());
}

#[test]
fn test_extended_export_defines_recursive_sub_commands() {
    let schema = export(BOUTIQUES_STYX_DESCRIPTOR_1).unwrap();
    let defs = definitions(&schema);
    for name in LEGACY_INPUT_VARIANTS.iter().chain(&SUB_COMMAND_INPUT_VARIANTS) {
        assert!(defs.contains_key(*name), "missing definition {name}");
    }
    for name in ["SubCommand", "Output", "ContainerImage", "StreamOutput", "SuggestedResources"] {
        assert!(defs.contains_key(name), "missing definition {name}");
    }
    assert_eq!(schema["additionalProperties"], json!(false));

    let sub_command = &defs["SubCommand"];
    assert_eq!(sub_command["additionalProperties"], json!(false));
    let inputs = &sub_command["properties"]["inputs"]["anyOf"][0];
    assert_eq!(inputs["type"], "array");
    assert_eq!(inputs["items"]["anyOf"].as_array().unwrap().len(), 25);
    assert_eq!(
        defs["SubCommandInput"]["properties"]["type"]["$ref"],
        "#/$defs/SubCommand"
    );
}

#[test]
fn test_unknown_dialect_is_an_error() {
    let err = export("not-a-real-dialect").unwrap_err();
    assert_eq!(err.0, "not-a-real-dialect");
    assert!(err.to_string().starts_with("unknown schema: not-a-real-dialect"));
}

#[test]
fn test_export_is_deterministic() {
    for dialect in Dialect::ALL {
        let first = serde_json::to_string_pretty(&export_dialect(dialect)).unwrap();
        let second = serde_json::to_string_pretty(&export_dialect(dialect)).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_input_unions_keep_priority_order() {
    let schema = export_dialect(Dialect::Boutiques05);
    let union = &schema["properties"]["inputs"]["anyOf"][0]["items"]["anyOf"];
    let order: Vec<&str> = union
        .as_array()
        .unwrap()
        .iter()
        .map(|member| member["$ref"].as_str().unwrap().trim_start_matches("#/$defs/"))
        .collect();
    assert_eq!(order, LEGACY_INPUT_VARIANTS);
}

#[test]
fn test_every_reference_resolves() {
    for dialect in Dialect::ALL {
        let schema = export_dialect(dialect);
        let defs = definitions(&schema);
        let mut refs = Vec::new();
        collect_refs(&schema, &mut refs);
        assert!(!refs.is_empty());
        for target in refs {
            let name = target
                .strip_prefix("#/$defs/")
                .unwrap_or_else(|| panic!("reference {target} leaves $defs"));
            assert!(defs.contains_key(name), "dangling reference {target}");
        }
        for (name, definition) in defs {
            assert!(definition.is_object(), "{name} was never built");
        }
    }
}

#[test]
fn test_schema_agrees_with_validator_on_fixtures() {
    let legacy = compile(&export_dialect(Dialect::Boutiques05));
    let extended = compile(&export_dialect(Dialect::StyxDescriptor1));

    let legacy_ok = json!({
        "name": "bet",
        "tool-version": "6.0.4",
        "command-line": "bet [IN] [OUT] [FRAC] [MASK]",
        "schema-version": "0.5",
        "container-image": {"type": "docker", "image": "brainlife/fsl:6.0.4"},
        "inputs": [
            {"id": "in", "name": "Input", "type": "File", "value-key": "[IN]"},
            {"id": "out", "name": "Output", "type": "String", "value-key": "[OUT]"},
            {
                "id": "frac",
                "name": "Fraction",
                "type": "Number",
                "integer": false,
                "minimum": 0,
                "maximum": 1,
                "command-line-flag": "-f",
                "value-key": "[FRAC]",
                "optional": true,
            },
            {
                "id": "mask",
                "name": "Mask",
                "type": "Flag",
                "command-line-flag": "-m",
                "value-key": "[MASK]",
            },
        ],
        "output-files": [{
            "id": "brain",
            "name": "Brain",
            "conditional-path-template": [
                {"frac > 0": "[OUT]_brain.nii.gz"},
                {"default": "[OUT].nii.gz"},
            ],
        }],
        "groups": [{"id": "g", "name": "G", "members": ["in", "out"], "all-or-none": true}],
        "custom": {"lab": "anything"},
    });
    assert!(validate_descriptor(&legacy_ok, Dialect::Boutiques05).is_ok());
    assert!(legacy.is_valid(&legacy_ok));

    let flag_list = json!({
        "name": "tool",
        "command-line": "tool [V]",
        "schema-version": "0.5",
        "inputs": [{
            "id": "v",
            "name": "V",
            "type": "Flag",
            "command-line-flag": "-v",
            "value-key": "[V]",
            "list": true,
        }],
    });
    assert!(validate_descriptor(&flag_list, Dialect::Boutiques05).is_err());
    assert!(!legacy.is_valid(&flag_list));

    let extended_ok = json!({
        "name": "tool",
        "command-line": "tool [MODE]",
        "schema-version": "0.5+styx",
        "inputs": [{
            "id": "mode",
            "value-key": "[MODE]",
            "type": [
                {"id": "fast", "command-line": "fast"},
                {
                    "id": "slow",
                    "command-line": "slow [ITER]",
                    "inputs": [{"id": "iter", "type": "Number", "value-key": "[ITER]"}],
                    "output-files": [{"id": "log", "path-template": "slow.log"}],
                },
            ],
        }],
        "stdout-output": {"id": "stdout"},
    });
    assert!(validate_descriptor(&extended_ok, Dialect::StyxDescriptor1).is_ok());
    assert!(extended.is_valid(&extended_ok));

    let mut extended_extra = extended_ok.clone();
    extended_extra["inputs"][0]["type"][1]["inputs"][0]["exclusive-minimum"] = json!(true);
    assert!(validate_descriptor(&extended_extra, Dialect::StyxDescriptor1).is_err());
    assert!(!extended.is_valid(&extended_extra));

    let mut bad_value_key = extended_ok;
    bad_value_key["inputs"][0]["value-key"] = json!("MODE");
    assert!(validate_descriptor(&bad_value_key, Dialect::StyxDescriptor1).is_err());
    assert!(!extended.is_valid(&bad_value_key));
}
