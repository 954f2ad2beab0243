/// All errors that may occur during initialization or while handling requests.
#[derive(Debug, thiserror::Error)]
pub enum Error
{
	#[error("could not read config file")]
	ReadConfigFile(#[source] std::io::Error),
	#[error("could not parse config file")]
	ParseConfigFile(#[source] serde_yaml::Error),
	#[error("could not load environment file")]
	LoadEnvironmentFile(#[source] dotenvy::Error),
	#[error("no webhook secret configured")]
	MissingWebhookSecret,

	#[error("could not decode payload body")]
	DecodePayloadBody(#[source] serde_json::Error),
	#[error("missing payload signature")]
	MissingPayloadSignature,
	#[error("invalid payload signature")]
	InvalidPayloadSignature,
	#[error("missing webhook event header")]
	MissingEventType,
}

// Allow this crate’s error type to be used for failed HTTP responses
impl warp::reject::Reject for Error
{
}
