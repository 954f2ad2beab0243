/// Environment variable providing the shared webhook secret. Takes precedence over the config file.
pub const WEBHOOK_SECRET_VARIABLE: &str = "GITHUB_WEBHOOK_SECRET";

/// Load variables from an environment file (such as `.env`) into the process environment.
///
/// Variables that are already set take precedence over the ones in the file. Returns whether the
/// file was found, as a missing environment file is not an error.
///
/// # Arguments
/// `path`: Path to the environment file.
pub fn load_environment_file<P>(path: P) -> Result<bool, crate::Error>
where
	P: AsRef<std::path::Path>
{
	match dotenvy::from_path(path.as_ref())
	{
		Ok(()) => Ok(true),
		Err(error) if error.not_found() => Ok(false),
		Err(error) => Err(crate::Error::LoadEnvironmentFile(error)),
	}
}

#[derive(Debug, serde::Deserialize)]
/// Top-level configuration of this application.
///
/// Every field has a default, so the configuration file may be omitted entirely as long as the
/// webhook secret is provided through the environment.
pub struct Config
{
	/// Address and port to listen on for incoming webhook events (default: `127.0.0.1:2342`).
	#[serde(default = "default_listen_address")]
	pub listen_address: std::net::SocketAddr,
	/// Reject payloads larger than this many bytes (default: 1 MiB).
	#[serde(default = "default_max_payload_size")]
	pub max_payload_size: u64,
	/// The secret configured for the webhook on GitHub, used to verify that incoming payloads
	/// actually come from GitHub. Without it, all webhook requests are refused.
	#[serde(default)]
	webhook_secret: Option<String>,
}

#[doc(hidden)]
fn default_listen_address() -> std::net::SocketAddr
{
	([127, 0, 0, 1], 2342).into()
}

#[doc(hidden)]
fn default_max_payload_size() -> u64
{
	1024 * 1024
}

impl Default for Config
{
	fn default() -> Self
	{
		Self
		{
			listen_address: default_listen_address(),
			max_payload_size: default_max_payload_size(),
			webhook_secret: None,
		}
	}
}

impl Config
{
	/// Attempt to read and parse the configuration from a YAML file.
	///
	/// # Arguments
	/// `path`: Path to the configuration file in YAML format.
	pub fn from_file<P>(path: P) -> Result<Self, crate::Error>
	where
		P: AsRef<std::path::Path>
	{
		let file = std::fs::File::open(&path).map_err(crate::Error::ReadConfigFile)?;
		serde_yaml::from_reader(&file).map_err(crate::Error::ParseConfigFile)
	}

	/// Load the configuration from an optional YAML file and apply overrides from the environment.
	///
	/// A missing configuration file is not an error, in which case the defaults are used.
	///
	/// # Arguments
	/// `path`: Path to the configuration file in YAML format.
	pub fn load<P>(path: P) -> Result<Self, crate::Error>
	where
		P: AsRef<std::path::Path>
	{
		let path = path.as_ref();

		let config = match Self::from_file(path)
		{
			Ok(config) => config,
			Err(crate::Error::ReadConfigFile(error))
				if error.kind() == std::io::ErrorKind::NotFound =>
			{
				log::info!("no config file found at “{}”, using defaults", path.display());
				Self::default()
			},
			Err(error) => return Err(error),
		};

		Ok(config.with_webhook_secret_override(std::env::var(WEBHOOK_SECRET_VARIABLE).ok()))
	}

	/// Replace the configured webhook secret if an override is provided.
	pub fn with_webhook_secret_override(mut self, webhook_secret: Option<String>) -> Self
	{
		if webhook_secret.is_some()
		{
			self.webhook_secret = webhook_secret;
		}

		self
	}

	/// The webhook secret, or `None` if it is unset or empty.
	pub fn webhook_secret(&self) -> Option<&str>
	{
		self.webhook_secret.as_deref().filter(|secret| !secret.is_empty())
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn empty_config_uses_defaults()
	{
		let config: Config = serde_yaml::from_str("{}").unwrap();

		assert_eq!(config.listen_address, default_listen_address());
		assert_eq!(config.max_payload_size, 1024 * 1024);
		assert_eq!(config.webhook_secret(), None);
	}

	#[test]
	fn parses_all_fields()
	{
		let config: Config = serde_yaml::from_str(
			"listen_address: 0.0.0.0:8080\nmax_payload_size: 4096\nwebhook_secret: hunter2\n")
			.unwrap();

		assert_eq!(config.listen_address, ([0, 0, 0, 0], 8080).into());
		assert_eq!(config.max_payload_size, 4096);
		assert_eq!(config.webhook_secret(), Some("hunter2"));
	}

	#[test]
	fn empty_secret_counts_as_missing()
	{
		let config: Config = serde_yaml::from_str("webhook_secret: ''").unwrap();

		assert_eq!(config.webhook_secret(), None);
	}

	#[test]
	fn environment_overrides_file_secret()
	{
		let config: Config = serde_yaml::from_str("webhook_secret: from-file").unwrap();

		let config = config.with_webhook_secret_override(Some("from-env".to_string()));
		assert_eq!(config.webhook_secret(), Some("from-env"));

		let config = config.with_webhook_secret_override(None);
		assert_eq!(config.webhook_secret(), Some("from-env"));
	}

	#[test]
	fn missing_environment_file_is_not_an_error()
	{
		assert!(!load_environment_file("/nonexistent/.env").unwrap());
	}

	#[test]
	fn environment_file_provides_variables()
	{
		let variable = format!("PULL_REQUEST_TASK_BRIDGE_TEST_{}", std::process::id());
		let path = std::env::temp_dir().join(format!("{variable}.env"));
		std::fs::write(&path, format!("{variable}=from-environment-file\n")).unwrap();

		let found = load_environment_file(&path);
		std::fs::remove_file(&path).unwrap();

		assert!(found.unwrap());
		assert_eq!(std::env::var(&variable).unwrap(), "from-environment-file");
	}

	#[test]
	fn missing_file_is_reported_as_read_error()
	{
		let error = Config::from_file("/nonexistent/config.yaml").unwrap_err();

		assert!(matches!(error, crate::Error::ReadConfigFile(_)));
	}
}
