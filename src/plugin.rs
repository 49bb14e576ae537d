//! The optional JS / plugin bridge (spec §4.8, §6.3): a line-delimited
//! JSON command protocol to an external host process that evaluates
//! backtick JavaScript expressions and user plugin code. Feature-gated
//! behind `plugin_bridge` since the core must compile and run without it
//! (spec §1 "deliberately out of scope": "the optional sidecar process
//! used to execute inline JavaScript ... is specified only at its command
//! protocol").
//!
//! This module implements the protocol's message shapes and a
//! [`PluginBridge`] trait for the calling side; it does not spawn or
//! manage the host process itself (that's a caller/CLI concern, per
//! spec §1's scope cut).

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout};

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::error::{LessError, LessResult};

/// One outbound request (spec §6.3: `{"id": N, "cmd": CMD, "data": {...}}`).
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    pub id: u64,
    pub cmd: String,
    pub data: Json,
}

/// One inbound reply (spec §6.3: `{"id": N, "success": bool, "result"?, "error"?}`).
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    pub id: u64,
    pub success: bool,
    #[serde(default)]
    pub result: Option<Json>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `evalJS`'s tagged result shape (spec §6.3 row `evalJS`).
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum JsValue {
    Number(f64),
    String(String),
    Array(Vec<Json>),
    Boolean(bool),
    Empty,
}

/// A live connection to the external host. Implementations own the
/// request/response exchange; the calling thread blocks until a reply
/// arrives (spec §5 "Suspension points").
pub trait PluginBridge {
    /// Send a request and block for its matching reply.
    fn call(&mut self, cmd: &str, data: Json) -> LessResult<Json>;

    /// `evalJS` (spec §6.3): evaluate a backtick expression with the
    /// given in-scope LESS variables rendered to CSS text.
    fn eval_js(&mut self, expression: &str, variables: &[(String, String)]) -> LessResult<JsValue> {
        let vars: Json = Json::Object(
            variables
                .iter()
                .map(|(name, css)| {
                    (
                        name.clone(),
                        Json::Object(
                            [("value".to_owned(), Json::String(css.clone()))]
                                .into_iter()
                                .collect(),
                        ),
                    )
                })
                .collect(),
        );
        let data = serde_json::json!({ "expression": expression, "variables": vars });
        let result = self.call("evalJS", data)?;
        serde_json::from_value(result)
            .map_err(|e| LessError::runtime(format!("plugin host returned malformed evalJS result: {e}")))
    }

    fn ping(&mut self) -> LessResult<()> {
        let result = self.call("ping", Json::Null)?;
        if result == Json::String("pong".to_owned()) {
            Ok(())
        } else {
            Err(LessError::runtime("plugin host did not reply \"pong\" to ping"))
        }
    }

    fn load_plugin(&mut self, path: &str, base_dir: &str) -> LessResult<Json> {
        self.call(
            "loadPlugin",
            serde_json::json!({ "path": path, "baseDir": base_dir, "options": {} }),
        )
    }

    fn file_manager_load(&mut self, id: &str, filename: &str, cwd: &str) -> LessResult<(String, String)> {
        let result = self.call(
            "fileManagerLoad",
            serde_json::json!({ "id": id, "filename": filename, "cwd": cwd }),
        )?;
        let filename = result
            .get("filename")
            .and_then(Json::as_str)
            .ok_or_else(|| LessError::runtime("plugin host fileManagerLoad reply missing \"filename\""))?
            .to_owned();
        let contents = result
            .get("contents")
            .and_then(Json::as_str)
            .ok_or_else(|| LessError::runtime("plugin host fileManagerLoad reply missing \"contents\""))?
            .to_owned();
        Ok((filename, contents))
    }
}

/// A [`PluginBridge`] backed by a spawned child process's stdin/stdout,
/// speaking newline-delimited JSON (spec §6.3). The host is assumed
/// already spawned by the caller (spec §1's scope cut keeps process
/// management out of the core).
pub struct ProcessBridge {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    next_id: u64,
}

impl ProcessBridge {
    pub fn new(mut child: Child) -> LessResult<Self> {
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| LessError::runtime("plugin host process has no stdin pipe"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| LessError::runtime("plugin host process has no stdout pipe"))?;
        Ok(ProcessBridge {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            next_id: 1,
        })
    }

    /// Spec §5 "Cancellation": closing the host stream marks the host
    /// dead; any call in flight at that point surfaces as this error.
    fn dead_host_error(io_err: std::io::Error) -> LessError {
        LessError::runtime(format!("plugin host unavailable: {io_err}"))
    }
}

impl PluginBridge for ProcessBridge {
    fn call(&mut self, cmd: &str, data: Json) -> LessResult<Json> {
        let id = self.next_id;
        self.next_id += 1;
        let request = Request {
            id,
            cmd: cmd.to_owned(),
            data,
        };
        let mut line = serde_json::to_string(&request)
            .map_err(|e| LessError::runtime(format!("failed to encode plugin host request: {e}")))?;
        line.push('\n');
        self.stdin
            .write_all(line.as_bytes())
            .map_err(Self::dead_host_error)?;
        self.stdin.flush().map_err(Self::dead_host_error)?;

        let mut reply_line = String::new();
        let n = self
            .stdout
            .read_line(&mut reply_line)
            .map_err(Self::dead_host_error)?;
        if n == 0 {
            return Err(LessError::runtime("plugin host unavailable: stream closed"));
        }
        let response: Response = serde_json::from_str(reply_line.trim_end())
            .map_err(|e| LessError::runtime(format!("malformed plugin host reply: {e}")))?;
        if response.id != id {
            return Err(LessError::runtime(format!(
                "plugin host reply id mismatch: expected {id}, got {}",
                response.id
            )));
        }
        if response.success {
            Ok(response.result.unwrap_or(Json::Null))
        } else {
            Err(LessError::runtime(
                response
                    .error
                    .unwrap_or_else(|| "plugin host call failed with no error message".to_owned()),
            ))
        }
    }
}

impl Drop for ProcessBridge {
    fn drop(&mut self) {
        let _ = self.child.kill();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_per_protocol_shape() {
        let req = Request {
            id: 1,
            cmd: "ping".to_owned(),
            data: Json::Null,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"id":1,"cmd":"ping","data":null}"#);
    }

    #[test]
    fn response_deserializes_success() {
        let resp: Response = serde_json::from_str(r#"{"id":1,"success":true,"result":"pong"}"#).unwrap();
        assert_eq!(resp.id, 1);
        assert!(resp.success);
        assert_eq!(resp.result, Some(Json::String("pong".to_owned())));
    }

    #[test]
    fn response_deserializes_failure() {
        let resp: Response =
            serde_json::from_str(r#"{"id":2,"success":false,"error":"boom"}"#).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("boom"));
    }

    #[test]
    fn js_value_tags_decode() {
        let v: JsValue = serde_json::from_str(r#"{"type":"number","value":3.5}"#).unwrap();
        matches!(v, JsValue::Number(n) if n == 3.5);
        let v: JsValue = serde_json::from_str(r#"{"type":"boolean","value":true}"#).unwrap();
        matches!(v, JsValue::Boolean(true));
    }
}
