//! Wire message types
//!
//! JSON-RPC 2.0 envelopes, one per line, plus the parameter shapes of the
//! sync methods.

use std::fmt;
use std::str::FromStr;

use mesh_fs::ConfigFileInfo;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;
/// Server-defined: credential missing or wrong
pub const UNAUTHENTICATED: i32 = -32001;

/// JSON-RPC 2.0 Request
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    /// Bearer credential, checked before dispatch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<String>,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: Method, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(Value::from(id)),
            method: method.as_str().to_string(),
            params,
            authorization: None,
        }
    }

    pub fn with_authorization(mut self, authorization: String) -> Self {
        self.authorization = Some(authorization);
        self
    }
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data: None,
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// The sync contract's operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Ping,
    GetInventory,
    GetContent,
    PutContent,
    DeleteFiles,
    RefreshConfigs,
}

impl Method {
    pub const ALL: [Method; 6] = [
        Method::Ping,
        Method::GetInventory,
        Method::GetContent,
        Method::PutContent,
        Method::DeleteFiles,
        Method::RefreshConfigs,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Ping => "ping",
            Method::GetInventory => "getInventory",
            Method::GetContent => "getContent",
            Method::PutContent => "putContent",
            Method::DeleteFiles => "deleteFiles",
            Method::RefreshConfigs => "refreshConfigs",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Params of `getContent` and `deleteFiles`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamesParams {
    #[serde(default)]
    pub names: Vec<String>,
}

/// Params of `putContent`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilesParams {
    #[serde(default)]
    pub files: Vec<ConfigFileInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_carries_authorization() {
        let request = JsonRpcRequest::new(7, Method::Ping, Value::Null)
            .with_authorization("Bearer s".to_string());
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"method\":\"ping\""));
        assert!(json.contains("\"authorization\":\"Bearer s\""));
        assert!(json.contains("\"id\":7"));
    }

    #[test]
    fn test_request_without_authorization_or_params() {
        let json = r#"{"jsonrpc":"2.0","id":1,"method":"getInventory"}"#;
        let request: JsonRpcRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.method, "getInventory");
        assert_eq!(request.params, Value::Null);
        assert!(request.authorization.is_none());
    }

    #[test]
    fn test_method_names_round_trip() {
        for method in Method::ALL {
            assert_eq!(method.as_str().parse::<Method>().unwrap(), method);
        }
        assert!("tools/list".parse::<Method>().is_err());
    }

    #[test]
    fn test_error_response_serializes_without_result() {
        let response = JsonRpcResponse::error(
            Some(Value::from(1)),
            UNAUTHENTICATED,
            "Unauthenticated".to_string(),
        );
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("-32001"));
        assert!(!json.contains("result"));
    }

    #[test]
    fn test_null_result_is_kept_on_the_wire() {
        let response = JsonRpcResponse::success(Some(Value::from(1)), Value::Null);
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"result\":null"));

        // A null result deserializes back to None, which callers read as unit
        let back: JsonRpcResponse = serde_json::from_str(&json).unwrap();
        assert!(back.error.is_none());
    }

    #[test]
    fn test_names_params_default_to_empty() {
        let params: NamesParams = serde_json::from_str("{}").unwrap();
        assert!(params.names.is_empty());
    }
}
