pub mod config;
pub mod cosine;
pub mod error;
pub mod index;
pub mod normalize;
pub mod persistence;
pub mod protocol;
pub mod server;
pub mod session;
pub mod stemmer;
pub mod transport;
pub mod vocabulary;

pub use error::ChatError;
pub use session::{ChatSession, Outcome, SessionConfig, TeachOutcome};
