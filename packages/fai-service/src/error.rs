use fai_domain::filter::FilterParseError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("No query provided.")]
	MissingInput,
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Upstream unavailable: {message}")]
	UpstreamUnavailable { message: String },
	#[error("Generated filter could not be parsed: {message}")]
	FilterParse { message: String },
	#[error("Malformed taxonomy response: {message}")]
	MalformedTaxonomyResponse { message: String },
}
impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::UpstreamUnavailable { message: format!("{err:#}") }
	}
}

impl From<fai_storage::Error> for Error {
	fn from(err: fai_storage::Error) -> Self {
		match err {
			fai_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			other => Self::UpstreamUnavailable { message: other.to_string() },
		}
	}
}

impl From<FilterParseError> for Error {
	fn from(err: FilterParseError) -> Self {
		Self::FilterParse { message: err.to_string() }
	}
}
