// ---------------------------------------------------------------------------
// ChatServer -- JSON-RPC dispatcher
// ---------------------------------------------------------------------------
//
// Reads JSON-RPC 2.0 requests (NDJSON, one per line), routes each to the
// `ChatSession`, and writes exactly one response line per request.
// ---------------------------------------------------------------------------

use std::io::{self, BufRead, Write};

use crate::error::ChatError;
use crate::protocol::*;
use crate::session::{ChatSession, Outcome, TeachOutcome};
use crate::transport::NdjsonTransport;

const DEFAULT_RANK_RESULTS: usize = 5;

/// JSON-RPC server that dispatches requests to a [`ChatSession`].
pub struct ChatServer<W: Write = io::Stdout> {
	transport: NdjsonTransport<W>,
	session: ChatSession,
}

impl<W: Write> ChatServer<W> {
	pub fn new(transport: NdjsonTransport<W>, session: ChatSession) -> Self {
		Self { transport, session }
	}

	pub fn into_transport(self) -> NdjsonTransport<W> {
		self.transport
	}

	/// Main loop: read JSON-RPC messages from stdin until EOF.
	pub fn run(&mut self) -> Result<(), ChatError> {
		let stdin = io::stdin();
		self.serve(stdin.lock())
	}

	/// Dispatch every request line from `reader`. Blank lines are skipped;
	/// lines that are not UTF-8 or not JSON are logged and dropped.
	pub fn serve<R: BufRead>(&mut self, reader: R) -> Result<(), ChatError> {
		for raw in reader.split(b'\n') {
			let raw = raw?;
			let line = match String::from_utf8(raw) {
				Ok(line) => line,
				Err(e) => {
					tracing::error!(bytes = e.as_bytes().len(), "Dropping non-UTF-8 request line");
					continue;
				}
			};
			if line.trim().is_empty() {
				continue;
			}

			let request: JsonRpcRequest = match serde_json::from_str(&line) {
				Ok(r) => r,
				Err(e) => {
					tracing::error!("Failed to parse request: {}", e);
					continue;
				}
			};

			self.dispatch(request);
		}

		Ok(())
	}

	// ── Dispatch ──────────────────────────────────────────────────────────

	fn dispatch(&mut self, req: JsonRpcRequest) {
		let id = req.id;
		tracing::debug!(id, method = %req.method, "Dispatching request");

		let result = match req.method.as_str() {
			// -- Pools ---------------------------------------------------
			"chat/greeting" => self
				.session
				.greeting()
				.map(|text| serde_json::json!({ "text": text })),
			"chat/goodbye" => self
				.session
				.goodbye()
				.map(|text| serde_json::json!({ "text": text })),

			// -- Retrieval / learning ------------------------------------
			"chat/respond" => handle_respond(&self.session, req.params),
			"chat/teach" => handle_teach(&mut self.session, req.params),
			"index/rank" => handle_rank(&self.session, req.params),

			// -- Store ---------------------------------------------------
			"store/size" => Ok(serde_json::json!({ "count": self.session.store().len() })),

			// -- Unknown -------------------------------------------------
			_ => {
				self.transport.write_error(
					id,
					METHOD_NOT_FOUND,
					format!("Unknown method: {}", req.method),
					None,
				);
				return;
			}
		};

		self.transport.write_result(id, result);
	}
}

fn parse_params<T: serde::de::DeserializeOwned>(params: serde_json::Value) -> Result<T, ChatError> {
	serde_json::from_value(params).map_err(|e| ChatError::InvalidParams(e.to_string()))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn handle_respond(
	session: &ChatSession,
	params: serde_json::Value,
) -> Result<serde_json::Value, ChatError> {
	let p: RespondParams = parse_params(params)?;
	let score = session.best_match(&p.text).map(|hit| hit.score);
	let value = match session.respond(&p.text) {
		Outcome::Matched(response) => serde_json::json!({
			"matched": true,
			"response": response,
			"score": score,
		}),
		Outcome::Unmatched => serde_json::json!({
			"matched": false,
			"score": score,
		}),
	};
	Ok(value)
}

fn handle_teach(
	session: &mut ChatSession,
	params: serde_json::Value,
) -> Result<serde_json::Value, ChatError> {
	let p: TeachParams = parse_params(params)?;
	let value = match session.teach(&p.text, &p.keyword, &p.response)? {
		TeachOutcome::Taught(immediate) => serde_json::json!({
			"taught": true,
			"immediateResponse": immediate,
		}),
		TeachOutcome::Rejected => serde_json::json!({ "taught": false }),
	};
	Ok(value)
}

fn handle_rank(
	session: &ChatSession,
	params: serde_json::Value,
) -> Result<serde_json::Value, ChatError> {
	let p: RankParams = parse_params(params)?;
	let keywords = session.store().keywords();
	let results: Vec<serde_json::Value> = session
		.rank(&p.text, p.max_results.unwrap_or(DEFAULT_RANK_RESULTS))
		.into_iter()
		.map(|hit| {
			serde_json::json!({
				"index": hit.index,
				"keyword": keywords.get(hit.index),
				"score": hit.score,
			})
		})
		.collect();
	Ok(serde_json::json!({ "results": results }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
	use super::*;
	use crate::session::SessionConfig;
	use crate::vocabulary::VocabularyStore;
	use serde_json::{json, Value};

	fn server_with(pairs: &[(&str, &str)]) -> ChatServer<Vec<u8>> {
		let mut store = VocabularyStore::default();
		for (k, r) in pairs {
			store.append(*k, *r).unwrap();
		}
		let session = ChatSession::new(store, SessionConfig::default());
		ChatServer::new(NdjsonTransport::with_writer(Vec::new()), session)
	}

	fn exchange(server: ChatServer<Vec<u8>>, requests: &[Value]) -> Vec<Value> {
		let mut server = server;
		let input: String = requests.iter().map(|r| format!("{r}\n")).collect();
		server.serve(input.as_bytes()).unwrap();
		let out = String::from_utf8(server.into_transport().into_inner()).unwrap();
		out.lines().map(|l| serde_json::from_str(l).unwrap()).collect()
	}

	#[test]
	fn respond_match_and_miss() {
		let responses = exchange(
			server_with(&[("pizza", "I love pizza!")]),
			&[
				json!({ "jsonrpc": "2.0", "id": 1, "method": "chat/respond", "params": { "text": "do you like pizza" } }),
				json!({ "jsonrpc": "2.0", "id": 2, "method": "chat/respond", "params": { "text": "tell me a joke" } }),
			],
		);
		assert_eq!(responses[0]["result"]["matched"], true);
		assert_eq!(responses[0]["result"]["response"], "I love pizza!");
		assert_eq!(responses[1]["result"]["matched"], false);
		assert_eq!(responses[1]["result"]["score"], 0.0);
	}

	#[test]
	fn teach_then_respond() {
		let responses = exchange(
			server_with(&[]),
			&[
				json!({ "id": 1, "method": "chat/respond", "params": { "text": "hello there" } }),
				json!({ "id": 2, "method": "chat/teach", "params": { "text": "hello there", "keyword": "hello", "response": "Hi to you too!" } }),
				json!({ "id": 3, "method": "chat/respond", "params": { "text": "hello" } }),
				json!({ "id": 4, "method": "store/size" }),
			],
		);
		assert_eq!(responses[0]["result"]["matched"], false);
		assert!(responses[0]["result"]["score"].is_null());
		assert_eq!(responses[1]["result"]["taught"], true);
		assert_eq!(responses[1]["result"]["immediateResponse"], "Hi to you too!");
		assert_eq!(responses[2]["result"]["response"], "Hi to you too!");
		assert_eq!(responses[3]["result"]["count"], 1);
	}

	#[test]
	fn blank_teach_is_not_taught() {
		let responses = exchange(
			server_with(&[]),
			&[json!({ "id": 1, "method": "chat/teach", "params": { "text": "x", "keyword": "", "response": "y" } })],
		);
		assert_eq!(responses[0]["result"]["taught"], false);
	}

	#[test]
	fn greeting_comes_from_pool() {
		let responses = exchange(
			server_with(&[]),
			&[
				json!({ "id": 1, "method": "chat/greeting" }),
				json!({ "id": 2, "method": "chat/goodbye" }),
			],
		);
		let greeting = responses[0]["result"]["text"].as_str().unwrap();
		assert!(["Hello!", "Hi!", "Hey!"].contains(&greeting));
		let goodbye = responses[1]["result"]["text"].as_str().unwrap();
		assert!(["Goodbye!", "See you!", "Take care!"].contains(&goodbye));
	}

	#[test]
	fn rank_reports_keywords() {
		let responses = exchange(
			server_with(&[("cats", "Meow"), ("dogs", "Woof"), ("cats and dogs", "Chaos")]),
			&[json!({ "id": 1, "method": "index/rank", "params": { "text": "cats", "maxResults": 2 } })],
		);
		let results = responses[0]["result"]["results"].as_array().unwrap();
		assert_eq!(results.len(), 2);
		assert_eq!(results[0]["keyword"], "cats");
		assert_eq!(results[1]["keyword"], "cats and dogs");
	}

	#[test]
	fn errors_and_unknown_methods() {
		let responses = exchange(
			server_with(&[]),
			&[
				json!({ "id": 1, "method": "chat/respond", "params": {} }),
				json!({ "id": 2, "method": "chat/dance" }),
			],
		);
		assert_eq!(responses[0]["error"]["code"], INVALID_PARAMS);
		assert_eq!(responses[1]["error"]["code"], METHOD_NOT_FOUND);
	}

	#[test]
	fn junk_lines_are_skipped() {
		let mut server = server_with(&[]);
		let input = "not json\n\n{\"id\": 9, \"method\": \"store/size\"}\n";
		server.serve(input.as_bytes()).unwrap();
		let out = String::from_utf8(server.into_transport().into_inner()).unwrap();
		let lines: Vec<&str> = out.lines().collect();
		assert_eq!(lines.len(), 1);
		let v: Value = serde_json::from_str(lines[0]).unwrap();
		assert_eq!(v["id"], 9);
		assert_eq!(v["result"]["count"], 0);
	}

	#[test]
	fn non_utf8_line_does_not_stop_the_loop() {
		let mut server = server_with(&[]);
		let mut input = b"{\"id\": 1, \"method\": \"store/size\"}\n".to_vec();
		input.extend_from_slice(b"\xff\xfe garbage\n");
		input.extend_from_slice(b"{\"id\": 2, \"method\": \"store/size\"}\r\n");
		server.serve(input.as_slice()).unwrap();
		let out = String::from_utf8(server.into_transport().into_inner()).unwrap();
		let ids: Vec<u64> = out
			.lines()
			.map(|l| serde_json::from_str::<Value>(l).unwrap()["id"].as_u64().unwrap())
			.collect();
		assert_eq!(ids, [1, 2]);
	}
}
