use serde_json::json;

use crate::models::{
    user_count::{DEFAULT_DURATION, DEFAULT_DURATION_UNIT},
    webservice::{
        FunctionDescriptor, FunctionKind, ParameterDescriptor, ReturnDescriptor,
        ServiceDescriptor, ValueType,
    },
};

pub const USER_COUNT_FUNCTION: &str = "local_user_count_api_count";
pub const USER_COUNT_SERVICE: &str = "User Count Webservice";

/// Functions and services this API exposes.
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    functions: Vec<FunctionDescriptor>,
    services: Vec<ServiceDescriptor>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self {
            functions: vec![user_count_function()],
            services: vec![ServiceDescriptor {
                name: USER_COUNT_SERVICE,
                functions: vec![USER_COUNT_FUNCTION],
                restricted_users: false,
                enabled: true,
            }],
        }
    }

    pub fn functions(&self) -> &[FunctionDescriptor] {
        &self.functions
    }

    pub fn services(&self) -> &[ServiceDescriptor] {
        &self.services
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.functions.iter().find(|f| f.name == name)
    }

}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn user_count_function() -> FunctionDescriptor {
    FunctionDescriptor {
        name: USER_COUNT_FUNCTION,
        class_name: "local_user_count_api",
        method_name: "user_count",
        description:
            "Returns the number of active users for the site. Can pass time periods in as parameters.",
        kind: FunctionKind::Read,
        parameters: vec![
            ParameterDescriptor {
                name: "duration",
                value_type: ValueType::Int,
                description: "Duration amount to go back, defaults to 1",
                default: Some(json!(DEFAULT_DURATION)),
            },
            ParameterDescriptor {
                name: "duration_unit",
                value_type: ValueType::Text,
                description: "Duration unit to go back, defaults to \"year\"",
                default: Some(json!(DEFAULT_DURATION_UNIT)),
            },
        ],
        returns: vec![
            ReturnDescriptor {
                name: "count",
                value_type: ValueType::Int,
                description: "Number of active users in the given time range",
            },
            ReturnDescriptor {
                name: "from",
                value_type: ValueType::Text,
                description: "Beginning of time range considered, in ISO format",
            },
            ReturnDescriptor {
                name: "to",
                value_type: ValueType::Text,
                description: "End of time range considered, in ISO format",
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_count_function_is_registered_and_enabled() {
        let registry = FunctionRegistry::new();
        let function = registry.function(USER_COUNT_FUNCTION).unwrap();
        assert_eq!(function.kind, FunctionKind::Read);
        assert!(registry.function("core_user_get_users").is_none());

        let service = &registry.services()[0];
        assert_eq!(service.name, USER_COUNT_SERVICE);
        assert!(service.enabled);
        assert_eq!(service.functions, vec![USER_COUNT_FUNCTION]);
    }

    #[test]
    fn test_parameter_defaults_serialize() {
        let registry = FunctionRegistry::new();
        let value = serde_json::to_value(registry.function(USER_COUNT_FUNCTION).unwrap()).unwrap();
        assert_eq!(value["type"], "read");
        assert_eq!(value["parameters"][0]["name"], "duration");
        assert_eq!(value["parameters"][0]["type"], "int");
        assert_eq!(value["parameters"][0]["default"], 1);
        assert_eq!(value["parameters"][1]["default"], "year");
        let returns: Vec<&str> = value["returns"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap())
            .collect();
        assert_eq!(returns, vec!["count", "from", "to"]);
    }
}
