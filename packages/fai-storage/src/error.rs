#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Transport(#[from] reqwest::Error),
	#[error("GraphQL error: {message}")]
	GraphQl { message: String },
	#[error("Malformed store response: {message}")]
	Malformed { message: String },
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
}
