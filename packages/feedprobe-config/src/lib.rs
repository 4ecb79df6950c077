mod error;
mod types;

pub use error::{Error, Result};
pub use types::{CheckConfig, Config, FeedConfig, PreprocessorConfig, Service};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}

	for (label, base) in
		[("preprocessor", &cfg.preprocessor.api_base), ("feed", &cfg.feed.api_base)]
	{
		if base.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("{label}.api_base must be non-empty."),
			});
		}
	}

	if cfg.preprocessor.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "preprocessor.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.feed.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "feed.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.preprocessor.access_token.trim().is_empty() {
		return Err(Error::Validation {
			message: "preprocessor.access_token must be non-empty.".to_string(),
		});
	}
	if cfg.check.page_size < 2 {
		return Err(Error::Validation {
			message: "check.page_size must be at least 2.".to_string(),
		});
	}
	if cfg.check.default_limit == 0 {
		return Err(Error::Validation {
			message: "check.default_limit must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	while cfg.preprocessor.api_base.ends_with('/') {
		cfg.preprocessor.api_base.pop();
	}
	while cfg.feed.api_base.ends_with('/') {
		cfg.feed.api_base.pop();
	}
}
