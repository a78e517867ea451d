//! Method-call boundary between the app layer and the Android host
//!
//! A method channel is a named endpoint that receives [`MethodCall`]s and
//! answers each with exactly one [`MethodResult`]. Unknown methods are
//! answered with [`MethodResult::NotImplemented`] so the caller can branch
//! on it; host failures surface as `Err` and are fatal to the call.

use boofer_core::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// An incoming call from the app layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    /// Method name
    pub method: String,
    /// Call arguments, `null` when there are none
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    /// A call without arguments
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: Value::Null,
        }
    }

    /// Attach arguments
    #[must_use]
    pub fn with_arguments(mut self, arguments: Value) -> Self {
        self.arguments = arguments;
        self
    }
}

/// Reply sent back across the boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", content = "value", rename_all = "snake_case")]
pub enum MethodResult {
    /// The call was handled
    Success(Value),
    /// The handler does not know the method
    NotImplemented,
}

impl MethodResult {
    /// Whether the call was handled
    pub fn is_success(&self) -> bool {
        matches!(self, MethodResult::Success(_))
    }
}

/// Host-side handler for one channel
pub trait MethodCallHandler {
    /// Handle a call, answering exactly once
    fn on_method_call(&self, call: &MethodCall) -> Result<MethodResult>;
}

/// A named channel bound to its handler
pub struct MethodChannel<H> {
    name: String,
    handler: H,
}

impl<H: MethodCallHandler> MethodChannel<H> {
    /// Bind a handler to a channel name
    pub fn new(name: impl Into<String>, handler: H) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }

    /// Channel name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The bound handler
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Deliver a call to the handler
    pub fn invoke(&self, call: &MethodCall) -> Result<MethodResult> {
        debug!(channel = %self.name, method = %call.method, "Method call received");
        self.handler.on_method_call(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    impl MethodCallHandler for Echo {
        fn on_method_call(&self, call: &MethodCall) -> Result<MethodResult> {
            Ok(match call.method.as_str() {
                "echo" => MethodResult::Success(call.arguments.clone()),
                _ => MethodResult::NotImplemented,
            })
        }
    }

    #[test]
    fn test_invoke_routes_to_handler() {
        let channel = MethodChannel::new("test/echo", Echo);
        let result = channel
            .invoke(&MethodCall::new("echo").with_arguments(json!({"a": 1})))
            .unwrap();
        assert_eq!(result, MethodResult::Success(json!({"a": 1})));
        assert_eq!(channel.name(), "test/echo");
    }

    #[test]
    fn test_unknown_method() {
        let channel = MethodChannel::new("test/echo", Echo);
        let result = channel.invoke(&MethodCall::new("shout")).unwrap();
        assert!(!result.is_success());
    }

    #[test]
    fn test_call_deserializes_without_arguments() {
        let call: MethodCall = serde_json::from_str(r#"{"method":"openNotificationSettings"}"#).unwrap();
        assert_eq!(call, MethodCall::new("openNotificationSettings"));
    }

    #[test]
    fn test_result_wire_shape() {
        let json = serde_json::to_value(MethodResult::Success(json!(true))).unwrap();
        assert_eq!(json, json!({"result": "success", "value": true}));
        let json = serde_json::to_value(MethodResult::NotImplemented).unwrap();
        assert_eq!(json, json!({"result": "not_implemented"}));
    }
}
