use std::io::{self, Write};

use serde::Serialize;

use crate::error::ChatError;
use crate::protocol::{CHAT_ERROR, INVALID_PARAMS};

#[derive(Serialize)]
struct JsonRpcResponse<'a> {
	jsonrpc: &'a str,
	id: u64,
	#[serde(skip_serializing_if = "Option::is_none")]
	result: Option<serde_json::Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	error: Option<JsonRpcErrorBody>,
}

#[derive(Serialize)]
struct JsonRpcErrorBody {
	code: i32,
	message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	data: Option<serde_json::Value>,
}

/// Writes one JSON-RPC message per line. Stdout in production, any writer in
/// tests.
pub struct NdjsonTransport<W: Write = io::Stdout> {
	out: W,
}

impl Default for NdjsonTransport {
	fn default() -> Self {
		Self::new()
	}
}

impl NdjsonTransport {
	pub fn new() -> Self {
		Self { out: io::stdout() }
	}
}

impl<W: Write> NdjsonTransport<W> {
	pub fn with_writer(out: W) -> Self {
		Self { out }
	}

	pub fn into_inner(self) -> W {
		self.out
	}

	/// Write a success or error response for `id` depending on `result`.
	pub fn write_result(&mut self, id: u64, result: Result<serde_json::Value, ChatError>) {
		match result {
			Ok(value) => self.write_response(id, value),
			Err(e) => {
				let code = match e {
					ChatError::InvalidParams(_) => INVALID_PARAMS,
					_ => CHAT_ERROR,
				};
				self.write_error(id, code, e.to_string(), Some(e.to_json_rpc_error()));
			}
		}
	}

	pub fn write_response(&mut self, id: u64, result: serde_json::Value) {
		self.write_line(&JsonRpcResponse {
			jsonrpc: "2.0",
			id,
			result: Some(result),
			error: None,
		});
	}

	pub fn write_error(
		&mut self,
		id: u64,
		code: i32,
		message: impl Into<String>,
		data: Option<serde_json::Value>,
	) {
		self.write_line(&JsonRpcResponse {
			jsonrpc: "2.0",
			id,
			result: None,
			error: Some(JsonRpcErrorBody {
				code,
				message: message.into(),
				data,
			}),
		});
	}

	fn write_line(&mut self, value: &impl Serialize) {
		let mut line = match serde_json::to_vec(value) {
			Ok(bytes) => bytes,
			Err(e) => {
				tracing::error!("Failed to serialize: {}", e);
				return;
			}
		};
		line.push(b'\n');
		if let Err(e) = self.out.write_all(&line).and_then(|()| self.out.flush()) {
			tracing::error!("Failed to write response: {}", e);
		}
	}
}
