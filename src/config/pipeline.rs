// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration parser: turns the nested `raw_input` payload into a flat list
//! of execution nodes with explicit dependencies.
//!
//! # Wire format
//!
//! ```json
//! {
//!   "raw_input": [
//!     {
//!       "operation": "model_inference",
//!       "parameters": {
//!         "model": "m1",
//!         "data": {
//!           "operation": "dict_to_list",
//!           "parameters": {
//!             "data": {
//!               "operation": "import_from_google_drive",
//!               "parameters": { "file_id": "abc123" }
//!             }
//!           }
//!         }
//!       }
//!     }
//!   ]
//! }
//! ```
//!
//! Every descriptor becomes its own node, so the example above produces three
//! nodes. A descriptor may name itself with `"id"`; any parameter anywhere in
//! the configuration can then consume that node's output with
//! `{"ref": "<id>"}`. Unnamed nodes get `"<operation> (<n>)"` where `n` is the
//! 1-based discovery index. Explicit ids win: when one already takes that
//! name, the generated id becomes `"<operation> (<n>.<k>)"` with the smallest
//! free `k` from 2.
//!
//! Descriptors accept only the `operation`, `parameters` and `id` keys, and
//! nesting depth is not limited.
//!
//! Discovery is pre-order: a descriptor is numbered before the descriptors
//! nested in its parameters, and sibling parameters are visited in key order.
//!
//! The parser only checks shape. References to unknown ids and cycles are
//! reported by [`validate_pipeline_graph`](crate::config::validate_pipeline_graph).
//!
//! # Example
//! ```
//! use pipeline_resolver::config::parse_pipeline;
//! use serde_json::json;
//!
//! let graph = parse_pipeline(&json!({
//!     "raw_input": [{"operation": "deploy_model", "parameters": {"model": "m1"}}]
//! })).unwrap();
//!
//! assert_eq!(graph.len(), 1);
//! assert_eq!(graph.roots(), &["deploy_model (1)".to_string()]);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::errors::ParseError;

pub const RAW_INPUT_KEY: &str = "raw_input";
pub const OPERATION_KEY: &str = "operation";
pub const PARAMETERS_KEY: &str = "parameters";
pub const ID_KEY: &str = "id";
pub const REF_KEY: &str = "ref";

const DESCRIPTOR_KEYS: [&str; 3] = [OPERATION_KEY, PARAMETERS_KEY, ID_KEY];

// Nested descriptors recurse; the stack is grown on demand once less than
// the red zone is left.
const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 1024 * 1024;

/// Where a node input comes from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputBinding {
    /// Value copied verbatim from the configuration.
    Literal(Value),
    /// Output of the node with this id.
    Output(String),
}

/// One unit of work derived from an operation descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionNode {
    pub id: String,
    pub operation: String,
    pub inputs: BTreeMap<String, InputBinding>,
    /// Node ids this node consumes, in first-use order, without duplicates.
    pub dependencies: Vec<String>,
    /// Position in parse order, used as the scheduling tie-break.
    pub discovery_index: usize,
}

/// Parsed configuration: every node in discovery order plus the top-level ids.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineGraph {
    nodes: Vec<ExecutionNode>,
    roots: Vec<String>,
    positions: HashMap<String, usize>,
}

impl PipelineGraph {
    pub fn new(nodes: Vec<ExecutionNode>, roots: Vec<String>) -> Self {
        let positions = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.clone(), i))
            .collect();
        Self {
            nodes,
            roots,
            positions,
        }
    }

    pub fn nodes(&self) -> &[ExecutionNode] {
        &self.nodes
    }

    /// Top-level node ids in `raw_input` order.
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    pub fn get(&self, id: &str) -> Option<&ExecutionNode> {
        self.positions.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Read a configuration payload from JSON text.
///
/// serde_json's recursion limit is lifted so deeply nested payloads parse.
pub fn parse_payload(text: &str) -> Result<Value, ParseError> {
    let invalid = |e: serde_json::Error| ParseError::InvalidJson(e.to_string());

    let mut deserializer = serde_json::Deserializer::from_str(text);
    deserializer.disable_recursion_limit();
    let payload = Value::deserialize(serde_stacker::Deserializer::new(&mut deserializer))
        .map_err(invalid)?;
    deserializer.end().map_err(invalid)?;
    Ok(payload)
}

/// Parse a configuration payload given as text.
pub fn parse_pipeline_str(text: &str) -> Result<PipelineGraph, ParseError> {
    parse_pipeline(&parse_payload(text)?)
}

/// Parse a configuration payload into a [`PipelineGraph`].
///
/// Fails without returning a partial graph on the first malformed descriptor.
pub fn parse_pipeline(payload: &Value) -> Result<PipelineGraph, ParseError> {
    let raw_input = payload
        .as_object()
        .and_then(|obj| obj.get(RAW_INPUT_KEY))
        .ok_or(ParseError::MissingRawInput)?;

    let mut parser = Parser::default();
    let mut root_indices = Vec::new();

    match raw_input {
        Value::Array(descriptors) => {
            if descriptors.is_empty() {
                return Err(ParseError::EmptyConfiguration);
            }
            for (i, descriptor) in descriptors.iter().enumerate() {
                let path = format!("{}[{}]", RAW_INPUT_KEY, i);
                root_indices.push(parser.descriptor(descriptor, &path)?);
            }
        }
        Value::Object(_) => root_indices.push(parser.descriptor(raw_input, RAW_INPUT_KEY)?),
        _ => return Err(ParseError::InvalidRawInput),
    }

    parser.finish(root_indices)
}

enum PendingBinding {
    Literal(Value),
    Child(usize),
    Ref(String),
}

struct PendingNode {
    explicit_id: Option<String>,
    operation: String,
    inputs: Vec<(String, PendingBinding)>,
}

#[derive(Default)]
struct Parser {
    nodes: Vec<PendingNode>,
}

impl Parser {
    fn descriptor(&mut self, value: &Value, path: &str) -> Result<usize, ParseError> {
        let obj = value.as_object().ok_or_else(|| ParseError::NotADescriptor {
            path: path.to_string(),
        })?;

        if let Some(key) = obj
            .keys()
            .find(|key| !DESCRIPTOR_KEYS.contains(&key.as_str()))
        {
            return Err(ParseError::UnknownDescriptorKey {
                path: path.to_string(),
                key: key.clone(),
            });
        }

        let operation = match obj.get(OPERATION_KEY) {
            None => {
                return Err(ParseError::MissingOperation {
                    path: path.to_string(),
                })
            }
            Some(Value::String(name)) if !name.trim().is_empty() => name.trim().to_string(),
            Some(_) => {
                return Err(ParseError::InvalidOperationName {
                    path: path.to_string(),
                })
            }
        };

        let explicit_id = match obj.get(ID_KEY) {
            None => None,
            Some(Value::String(id)) if !id.trim().is_empty() => Some(id.trim().to_string()),
            Some(_) => {
                return Err(ParseError::InvalidNodeId {
                    path: path.to_string(),
                })
            }
        };

        let empty = Map::new();
        let parameters = match obj.get(PARAMETERS_KEY) {
            None | Some(Value::Null) => &empty,
            Some(Value::Object(parameters)) => parameters,
            Some(_) => {
                return Err(ParseError::InvalidParameters {
                    path: path.to_string(),
                })
            }
        };

        // Reserve the slot first so this descriptor is numbered before its children.
        let index = self.nodes.len();
        self.nodes.push(PendingNode {
            explicit_id,
            operation,
            inputs: Vec::new(),
        });

        let mut inputs = Vec::with_capacity(parameters.len());
        for (name, value) in parameters {
            let param_path = format!("{}.{}.{}", path, PARAMETERS_KEY, name);
            inputs.push((name.clone(), self.binding(value, &param_path)?));
        }
        self.nodes[index].inputs = inputs;

        Ok(index)
    }

    fn binding(&mut self, value: &Value, path: &str) -> Result<PendingBinding, ParseError> {
        match value {
            Value::Object(obj) if obj.contains_key(OPERATION_KEY) => {
                let child = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
                    self.descriptor(value, path)
                })?;
                Ok(PendingBinding::Child(child))
            }
            Value::Object(obj) if obj.contains_key(REF_KEY) => {
                if obj.len() != 1 {
                    return Err(ParseError::InvalidParameterValue {
                        path: path.to_string(),
                    });
                }
                match obj.get(REF_KEY) {
                    Some(Value::String(target)) if !target.trim().is_empty() => {
                        Ok(PendingBinding::Ref(target.trim().to_string()))
                    }
                    _ => Err(ParseError::InvalidReference {
                        path: path.to_string(),
                    }),
                }
            }
            Value::Object(_) => Err(ParseError::InvalidParameterValue {
                path: path.to_string(),
            }),
            literal => Ok(PendingBinding::Literal(literal.clone())),
        }
    }

    /// Assign ids: explicit ids first, then generated ids around them.
    fn assign_ids(&self) -> Result<Vec<String>, ParseError> {
        let mut taken: HashSet<String> = HashSet::new();
        for id in self.nodes.iter().filter_map(|node| node.explicit_id.as_ref()) {
            if !taken.insert(id.clone()) {
                return Err(ParseError::DuplicateNodeId { id: id.clone() });
            }
        }

        let mut ids = Vec::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            let id = match &node.explicit_id {
                Some(id) => id.clone(),
                None => {
                    let mut id = format!("{} ({})", node.operation, i + 1);
                    let mut k = 2;
                    while taken.contains(&id) {
                        id = format!("{} ({}.{})", node.operation, i + 1, k);
                        k += 1;
                    }
                    taken.insert(id.clone());
                    id
                }
            };
            ids.push(id);
        }
        Ok(ids)
    }

    fn finish(self, root_indices: Vec<usize>) -> Result<PipelineGraph, ParseError> {
        let ids = self.assign_ids()?;

        let nodes = self
            .nodes
            .into_iter()
            .enumerate()
            .map(|(i, pending)| {
                let mut inputs = BTreeMap::new();
                let mut dependencies: Vec<String> = Vec::new();
                for (name, binding) in pending.inputs {
                    let binding = match binding {
                        PendingBinding::Literal(value) => InputBinding::Literal(value),
                        PendingBinding::Child(child) => InputBinding::Output(ids[child].clone()),
                        PendingBinding::Ref(target) => InputBinding::Output(target),
                    };
                    if let InputBinding::Output(target) = &binding {
                        if !dependencies.contains(target) {
                            dependencies.push(target.clone());
                        }
                    }
                    inputs.insert(name, binding);
                }
                ExecutionNode {
                    id: ids[i].clone(),
                    operation: pending.operation,
                    inputs,
                    dependencies,
                    discovery_index: i,
                }
            })
            .collect();

        let roots = root_indices.into_iter().map(|i| ids[i].clone()).collect();
        Ok(PipelineGraph::new(nodes, roots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nested_inference_config() -> Value {
        json!({
            "raw_input": [{
                "operation": "model_inference",
                "parameters": {
                    "model": "m1",
                    "data": {
                        "operation": "dict_to_list",
                        "parameters": {
                            "data": {
                                "operation": "import_from_google_drive",
                                "parameters": {"file_id": "abc123"}
                            }
                        }
                    }
                }
            }]
        })
    }

    #[test]
    fn test_nested_descriptors_become_separate_nodes() {
        let graph = parse_pipeline(&nested_inference_config()).unwrap();

        assert_eq!(graph.len(), 3);
        let ids: Vec<&str> = graph.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "model_inference (1)",
                "dict_to_list (2)",
                "import_from_google_drive (3)"
            ]
        );
        assert_eq!(graph.roots(), &["model_inference (1)".to_string()]);

        let inference = graph.get("model_inference (1)").unwrap();
        assert_eq!(inference.dependencies, vec!["dict_to_list (2)"]);
        assert_eq!(
            inference.inputs.get("model"),
            Some(&InputBinding::Literal(json!("m1")))
        );
        assert_eq!(
            inference.inputs.get("data"),
            Some(&InputBinding::Output("dict_to_list (2)".into()))
        );

        let import = graph.get("import_from_google_drive (3)").unwrap();
        assert!(import.dependencies.is_empty());
        assert_eq!(
            import.inputs.get("file_id"),
            Some(&InputBinding::Literal(json!("abc123")))
        );
    }

    #[test]
    fn test_repeated_operation_names_get_distinct_ids() {
        let graph = parse_pipeline(&json!({
            "raw_input": [
                {"operation": "deploy_model", "parameters": {"model": "m1"}},
                {"operation": "import_from_google_drive", "parameters": {"file_id": "a"}},
                {"operation": "import_from_google_drive", "parameters": {"file_id": "b"}},
                {"operation": "delete_model", "parameters": {"model": "m1"}}
            ]
        }))
        .unwrap();

        assert_eq!(
            graph.roots(),
            &[
                "deploy_model (1)".to_string(),
                "import_from_google_drive (2)".to_string(),
                "import_from_google_drive (3)".to_string(),
                "delete_model (4)".to_string(),
            ]
        );
        assert!(graph.nodes().iter().all(|n| n.dependencies.is_empty()));
    }

    #[test]
    fn test_single_descriptor_raw_input_is_accepted() {
        let graph = parse_pipeline(&json!({
            "raw_input": {"operation": "mock_csv_data"}
        }))
        .unwrap();
        assert_eq!(graph.len(), 1);
        assert!(graph.nodes()[0].inputs.is_empty());
    }

    #[test]
    fn test_explicit_ids_and_references() {
        let graph = parse_pipeline(&json!({
            "raw_input": [
                {"id": "deploy", "operation": "deploy_model", "parameters": {"model": "m1"}},
                {
                    "operation": "model_inference",
                    "parameters": {"model": {"ref": "deploy"}, "data": [1, 2, 3]}
                }
            ]
        }))
        .unwrap();

        let inference = graph.get("model_inference (2)").unwrap();
        assert_eq!(inference.dependencies, vec!["deploy"]);
        assert_eq!(
            inference.inputs.get("data"),
            Some(&InputBinding::Literal(json!([1, 2, 3])))
        );
    }

    #[test]
    fn test_dependencies_are_deduplicated() {
        let graph = parse_pipeline(&json!({
            "raw_input": [
                {"id": "src", "operation": "mock_csv_data"},
                {"operation": "combine", "parameters": {"left": {"ref": "src"}, "right": {"ref": "src"}}}
            ]
        }))
        .unwrap();
        assert_eq!(graph.get("combine (2)").unwrap().dependencies, vec!["src"]);
    }

    #[test]
    fn test_references_to_unknown_ids_are_left_for_validation() {
        let graph = parse_pipeline(&json!({
            "raw_input": [{"operation": "dict_to_list", "parameters": {"data": {"ref": "nowhere"}}}]
        }))
        .unwrap();
        assert_eq!(graph.nodes()[0].dependencies, vec!["nowhere"]);
        assert!(!graph.contains("nowhere"));
    }

    #[test]
    fn test_parse_errors_table_driven() {
        struct TestCase {
            name: &'static str,
            payload: Value,
            expected: ParseError,
        }

        let test_cases = vec![
            TestCase {
                name: "missing raw_input",
                payload: json!({"operations": []}),
                expected: ParseError::MissingRawInput,
            },
            TestCase {
                name: "raw_input is a string",
                payload: json!({"raw_input": "deploy_model"}),
                expected: ParseError::InvalidRawInput,
            },
            TestCase {
                name: "empty raw_input",
                payload: json!({"raw_input": []}),
                expected: ParseError::EmptyConfiguration,
            },
            TestCase {
                name: "top-level entry is not an object",
                payload: json!({"raw_input": [42]}),
                expected: ParseError::NotADescriptor {
                    path: "raw_input[0]".into(),
                },
            },
            TestCase {
                name: "missing operation key",
                payload: json!({"raw_input": [{"parameters": {}}]}),
                expected: ParseError::MissingOperation {
                    path: "raw_input[0]".into(),
                },
            },
            TestCase {
                name: "blank operation name",
                payload: json!({"raw_input": [{"operation": "  "}]}),
                expected: ParseError::InvalidOperationName {
                    path: "raw_input[0]".into(),
                },
            },
            TestCase {
                name: "parameters is a list",
                payload: json!({"raw_input": [{"operation": "deploy_model", "parameters": ["m1"]}]}),
                expected: ParseError::InvalidParameters {
                    path: "raw_input[0]".into(),
                },
            },
            TestCase {
                name: "object parameter without operation",
                payload: json!({"raw_input": [{
                    "operation": "dict_to_list",
                    "parameters": {"data": {"parameters": {}}}
                }]}),
                expected: ParseError::InvalidParameterValue {
                    path: "raw_input[0].parameters.data".into(),
                },
            },
            TestCase {
                name: "nested descriptor missing operation deep in the tree",
                payload: json!({"raw_input": [
                    {"operation": "deploy_model", "parameters": {"model": "m1"}},
                    {"operation": "model_inference", "parameters": {
                        "data": {"operation": "dict_to_list", "parameters": {"data": {"operation": 7}}}
                    }}
                ]}),
                expected: ParseError::InvalidOperationName {
                    path: "raw_input[1].parameters.data.parameters.data".into(),
                },
            },
            TestCase {
                name: "reference with extra keys",
                payload: json!({"raw_input": [{
                    "operation": "dict_to_list",
                    "parameters": {"data": {"ref": "x", "extra": 1}}
                }]}),
                expected: ParseError::InvalidParameterValue {
                    path: "raw_input[0].parameters.data".into(),
                },
            },
            TestCase {
                name: "reference target is not a string",
                payload: json!({"raw_input": [{
                    "operation": "dict_to_list",
                    "parameters": {"data": {"ref": 3}}
                }]}),
                expected: ParseError::InvalidReference {
                    path: "raw_input[0].parameters.data".into(),
                },
            },
            TestCase {
                name: "duplicate explicit ids",
                payload: json!({"raw_input": [
                    {"id": "a", "operation": "deploy_model"},
                    {"id": "a", "operation": "delete_model"}
                ]}),
                expected: ParseError::DuplicateNodeId { id: "a".into() },
            },
            TestCase {
                name: "misspelled parameters key",
                payload: json!({"raw_input": [
                    {"operation": "deploy_model", "paramters": {"model": "m1"}}
                ]}),
                expected: ParseError::UnknownDescriptorKey {
                    path: "raw_input[0]".into(),
                    key: "paramters".into(),
                },
            },
            TestCase {
                name: "unknown key on a nested descriptor",
                payload: json!({"raw_input": [{
                    "operation": "dict_to_list",
                    "parameters": {"data": {"operation": "mock_csv_data", "name": "rows"}}
                }]}),
                expected: ParseError::UnknownDescriptorKey {
                    path: "raw_input[0].parameters.data".into(),
                    key: "name".into(),
                },
            },
        ];

        for test_case in test_cases {
            let result = parse_pipeline(&test_case.payload);
            assert_eq!(
                result.unwrap_err(),
                test_case.expected,
                "Test case '{}'",
                test_case.name
            );
        }
    }

    #[test]
    fn test_parse_pipeline_str_rejects_invalid_json() {
        let result = parse_pipeline_str("{\"raw_input\": [");
        assert!(matches!(result, Err(ParseError::InvalidJson(_))));

        let trailing = parse_pipeline_str("{\"raw_input\": {\"operation\": \"a\"}} x");
        assert!(matches!(trailing, Err(ParseError::InvalidJson(_))));
    }

    #[test]
    fn test_explicit_id_takes_precedence_over_generated_id() {
        let graph = parse_pipeline(&json!({
            "raw_input": [
                {"id": "deploy_model (2)", "operation": "deploy_model"},
                {"operation": "deploy_model"},
                {"id": "deploy_model (2.2)", "operation": "delete_model"},
                {
                    "operation": "dict_to_list",
                    "parameters": {"data": {"ref": "deploy_model (2)"}}
                }
            ]
        }))
        .unwrap();

        assert_eq!(
            graph.roots(),
            &[
                "deploy_model (2)".to_string(),
                "deploy_model (2.3)".to_string(),
                "deploy_model (2.2)".to_string(),
                "dict_to_list (4)".to_string(),
            ]
        );
        assert_eq!(
            graph.get("dict_to_list (4)").unwrap().dependencies,
            vec!["deploy_model (2)"]
        );
    }

    /// `dict_to_list` wrapped `depth` times around one import descriptor.
    fn deeply_nested(depth: usize) -> String {
        let mut descriptor =
            r#"{"operation": "import_from_google_drive", "parameters": {"file_id": "abc123"}}"#
                .to_string();
        for _ in 0..depth {
            descriptor = format!(
                r#"{{"operation": "dict_to_list", "parameters": {{"data": {}}}}}"#,
                descriptor
            );
        }
        format!(r#"{{"raw_input": [{}]}}"#, descriptor)
    }

    #[test]
    fn test_nesting_depth_is_not_limited() {
        for depth in [62, 128, 500] {
            let graph = parse_pipeline_str(&deeply_nested(depth)).unwrap();
            assert_eq!(graph.len(), depth + 1, "depth {}", depth);

            let innermost = format!("import_from_google_drive ({})", depth + 1);
            assert!(graph.get(&innermost).unwrap().dependencies.is_empty());
            assert_eq!(
                graph.get(&format!("dict_to_list ({})", depth)).unwrap().dependencies,
                vec![innermost]
            );
        }
    }
}
