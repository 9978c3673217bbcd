use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
	#[error("Validation error: {0}")]
	Validation(String),
	#[error("Corrupt store: {0}")]
	CorruptStore(String),
	#[error("Empty pool: no {0} available")]
	EmptyPool(&'static str),
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Serialization error: {0}")]
	Serialization(String),
	#[error("Invalid params: {0}")]
	InvalidParams(String),
}

impl ChatError {
	pub fn code(&self) -> &str {
		match self {
			Self::Validation(_) => "CHAT_VALIDATION",
			Self::CorruptStore(_) => "CHAT_CORRUPT_STORE",
			Self::EmptyPool(_) => "CHAT_EMPTY_POOL",
			Self::Io(_) => "CHAT_IO",
			Self::Serialization(_) => "CHAT_SERIALIZATION",
			Self::InvalidParams(_) => "CHAT_INVALID_PARAMS",
		}
	}

	pub fn to_json_rpc_error(&self) -> serde_json::Value {
		serde_json::json!({
			"chatCode": self.code(),
			"message": self.to_string(),
		})
	}
}
