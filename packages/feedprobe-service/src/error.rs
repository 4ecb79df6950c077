pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{message}")]
	Provider { message: String },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
}

impl From<feedprobe_providers::Error> for Error {
	fn from(err: feedprobe_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
