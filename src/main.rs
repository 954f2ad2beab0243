#[doc(hidden)]
mod config;
#[doc(hidden)]
mod error;
#[doc(hidden)]
mod models;
pub mod planner;
pub mod signature;
pub mod webhook;

pub use config::Config;
pub use error::Error;
pub use models::*;

/// Path of the optional configuration file, relative to the working directory.
const CONFIG_FILE_PATH: &str = "config.yaml";
/// Path of the optional environment file, relative to the working directory.
const ENVIRONMENT_FILE_PATH: &str = ".env";

#[tokio::main]
async fn main() -> anyhow::Result<()>
{
	// Load the environment file before initializing the logger so it may set RUST_LOG as well
	let environment_file_found = config::load_environment_file(ENVIRONMENT_FILE_PATH);

	pretty_env_logger::init();

	match environment_file_found?
	{
		true => log::info!("loaded environment variables from “{ENVIRONMENT_FILE_PATH}”"),
		false => log::debug!("no environment file found at “{ENVIRONMENT_FILE_PATH}”"),
	}

	// Read the config file if present and apply overrides from the environment
	let config = Config::load(CONFIG_FILE_PATH)?;

	// Keep serving without a secret, but refuse every webhook request so the misconfiguration
	// surfaces as server errors rather than as silently accepted payloads
	let verifier = match config.webhook_secret()
	{
		Some(secret) => Some(signature::Verifier::new(secret)),
		None =>
		{
			log::error!("no webhook secret configured (set {} in the environment or {}, or \
				webhook_secret in {}), all webhook requests will be refused",
				config::WEBHOOK_SECRET_VARIABLE, ENVIRONMENT_FILE_PATH, CONFIG_FILE_PATH);
			None
		},
	};

	let routes = webhook::routes(verifier, config.max_payload_size);

	log::info!("listening for incoming webhook events on {}", config.listen_address);
	warp::serve(routes).run(config.listen_address).await;

	Ok(())
}
