use serde::Serialize;
use serde_json::Value;

/// Declared type of a parameter or return field.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Int,
    Text,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    Read,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParameterDescriptor {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub description: &'static str,
    /// `None` marks a required parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReturnDescriptor {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub description: &'static str,
}

/// Name, input schema and output schema of one exposed function.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionDescriptor {
    pub name: &'static str,
    pub class_name: &'static str,
    pub method_name: &'static str,
    pub description: &'static str,
    #[serde(rename = "type")]
    pub kind: FunctionKind,
    pub parameters: Vec<ParameterDescriptor>,
    pub returns: Vec<ReturnDescriptor>,
}

/// A named bundle of functions that can be enabled as a unit.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceDescriptor {
    pub name: &'static str,
    pub functions: Vec<&'static str>,
    pub restricted_users: bool,
    pub enabled: bool,
}
