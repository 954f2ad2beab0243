/// The only event type that is handed to the action planner. All other events are acknowledged and
/// ignored.
const PULL_REQUEST_EVENT: &str = "pull_request";

/// All routes of this service: `POST /webhooks/github`, plus a rejection handler turning failures
/// into JSON responses with the appropriate status codes.
///
/// # Arguments
/// - `verifier`: Verifies payload signatures. If `None`, no webhook secret was provided and all
///   requests are refused.
/// - `max_payload_size`: Reject payloads larger than this many bytes.
pub fn routes(verifier: Option<crate::signature::Verifier>, max_payload_size: u64)
	-> impl warp::Filter<Extract = (impl warp::Reply,), Error = std::convert::Infallible> + Clone
{
	use warp::Filter as _;

	warp::path!("webhooks" / "github")
		// Only listen for POST requests
		.and(warp::post())
		// Reject oversized payloads before reading them
		.and(warp::body::content_length_limit(max_payload_size))
		// Authenticate the payload and decode it from JSON
		.and(with_verified_payload(verifier))
		.and(warp::header::optional::<String>("x-github-event"))
		// Forward request to request handler
		.and_then(handle_delivery)
		.recover(handle_rejection)
}

/// Delivery ID reported in log messages when GitHub didn’t provide one.
const UNKNOWN_DELIVERY_ID: &str = "unknown";

/// [warp] filter extracting the value of the `X-GitHub-Delivery` header, which identifies a
/// delivery in log messages.
fn with_delivery_id() -> impl warp::Filter<Extract = (String,), Error = warp::Rejection> + Clone
{
	use warp::Filter as _;

	warp::header::optional::<String>("x-github-delivery")
		.map(|delivery_id: Option<String>|
			delivery_id.unwrap_or_else(|| UNKNOWN_DELIVERY_ID.to_string()))
}

/// [warp] filter that extracts the payload, verifies its signature, and decodes it into a JSON
/// value. Returns the delivery ID and the decoded payload as arguments to subsequent handlers in
/// that order.
///
/// # Arguments
/// - `verifier`: Verifies payload signatures, or `None` if no webhook secret is configured.
fn with_verified_payload(verifier: Option<crate::signature::Verifier>)
	-> impl warp::Filter<Extract = (String, serde_json::Value), Error = warp::Rejection> + Clone
{
	use warp::Filter as _;

	// Relay the delivery ID first so that all log messages about this request can refer to it
	with_delivery_id()
		// Relay a handle to the verifier
		.and(warp::any().map(move || verifier.clone()))
		// Relay the body as raw bytes for payload signature validation and JSON decoding
		.and(warp::body::bytes())
		// Relay the payload signature header if present
		.and(warp::header::optional::<String>("x-hub-signature-256"))
		.and_then(verify_and_decode_payload)
		// The last call returned the delivery ID and payload as a tuple, but we’d like subsequent
		// calls in the filter chain to receive them as top-level arguments
		.untuple_one()
}

/// Verify the signature of a payload and only then decode it from JSON.
async fn verify_and_decode_payload(
	delivery_id: String,
	verifier: Option<crate::signature::Verifier>,
	bytes: warp::hyper::body::Bytes,
	provided_signature: Option<String>)
	-> Result<(String, serde_json::Value), warp::Rejection>
{
	// Without a webhook secret, nothing can be authenticated, so refuse everything. This is a
	// deployment problem rather than a bad request, so make it stand out in the logs
	let verifier = match verifier
	{
		Some(verifier) => verifier,
		None =>
		{
			log::error!("refusing delivery {delivery_id} because no webhook secret is configured");
			return Err(warp::reject::custom(crate::Error::MissingWebhookSecret));
		},
	};

	if let Err(error) = verifier.verify_payload(&bytes, provided_signature.as_deref())
	{
		log::warn!("rejecting delivery {delivery_id}: {error}");
		return Err(warp::reject::custom(error));
	}

	match serde_json::from_slice(&bytes)
	{
		Ok(payload) => Ok((delivery_id, payload)),
		Err(error) =>
		{
			log::warn!("rejecting delivery {delivery_id}: could not decode payload body: {error}");
			Err(warp::reject::custom(crate::Error::DecodePayloadBody(error)))
		},
	}
}

/// Request handler for authenticated webhook events.
///
/// # Arguments
/// - `delivery_id`: The value of the `X-GitHub-Delivery` header, used for logging only.
/// - `payload`: The payload decoded into a generic JSON value.
/// - `event_type`: The value of the `X-GitHub-Event` header, if present.
async fn handle_delivery(
	delivery_id: String,
	payload: serde_json::Value,
	event_type: Option<String>)
	-> Result<impl warp::Reply, warp::Rejection>
{
	let event_type = match event_type
	{
		Some(event_type) => event_type,
		None =>
		{
			log::warn!("rejecting delivery {delivery_id}: missing webhook event header");
			return Err(warp::reject::custom(crate::Error::MissingEventType));
		},
	};

	// Other event types have unrelated payloads, so don’t even try to decode them
	if event_type != PULL_REQUEST_EVENT
	{
		log::debug!("ignoring “{event_type}” event (delivery {delivery_id})");

		return Ok(warp::reply::json(&WebhookResponse::ignored(&event_type)));
	}

	// Incomplete or oddly shaped payloads still result in a plan, which is a noop if need be
	let payload = crate::PullRequestEventPayload::from_json(payload);

	log::info!("received pull request event with action “{}” (delivery {delivery_id})",
		payload.action.as_deref().unwrap_or_default());

	let plan = crate::planner::plan(&payload);

	log::info!("planned {plan:?} (delivery {delivery_id})");

	Ok(warp::reply::json(&WebhookResponse::planned(&plan)))
}

/// Request handler for all requests that were rejected previously.
///
/// # Arguments
/// - `error`: Reasons for why this request was rejected.
async fn handle_rejection(error: warp::Rejection)
	-> Result<impl warp::Reply, std::convert::Infallible>
{
	use warp::http::StatusCode;

	let status_code;
	let message;

	if error.is_not_found()
	{
		status_code = StatusCode::NOT_FOUND;
		message = "not found";
	}
	else if let Some(_) = error.find::<warp::reject::MethodNotAllowed>()
	{
		status_code = StatusCode::METHOD_NOT_ALLOWED;
		message = "method not allowed";
	}
	else if let Some(_) = error.find::<warp::reject::LengthRequired>()
	{
		status_code = StatusCode::LENGTH_REQUIRED;
		message = "content length required";
	}
	else if let Some(_) = error.find::<warp::reject::PayloadTooLarge>()
	{
		status_code = StatusCode::PAYLOAD_TOO_LARGE;
		message = "payload too large";
	}
	else if let Some(crate::Error::MissingWebhookSecret) = error.find()
	{
		status_code = StatusCode::INTERNAL_SERVER_ERROR;
		message = "webhook secret not configured";
	}
	else if let Some(crate::Error::MissingPayloadSignature) = error.find()
	{
		status_code = StatusCode::UNAUTHORIZED;
		message = "missing payload signature";
	}
	else if let Some(crate::Error::InvalidPayloadSignature) = error.find()
	{
		status_code = StatusCode::UNAUTHORIZED;
		message = "invalid payload signature";
	}
	else if let Some(crate::Error::DecodePayloadBody(_)) = error.find()
	{
		status_code = StatusCode::BAD_REQUEST;
		message = "malformed payload body";
	}
	else if let Some(crate::Error::MissingEventType) = error.find()
	{
		status_code = StatusCode::BAD_REQUEST;
		message = "missing webhook event header";
	}
	// If users are able to trigger errors we did not anticipate, log them so we can inspect this
	// more closely later
	else
	{
		status_code = StatusCode::INTERNAL_SERVER_ERROR;
		message = "internal server error";

		log::error!("unhandled error: {:#?}", error);
	}

	let response = warp::reply::json(&WebhookResponse::error(message));

	Ok(warp::reply::with_status(response, status_code))
}

/// Response type for all webhook requests (serialized to JSON).
#[derive(serde::Serialize)]
struct WebhookResponse<'a>
{
	/// Whether the request was accepted.
	ok: bool,
	/// The action planned for a pull request event.
	#[serde(skip_serializing_if = "Option::is_none")]
	plan: Option<&'a crate::planner::IntendedAction>,
	/// The type of an event that was acknowledged without planning anything.
	#[serde(skip_serializing_if = "Option::is_none")]
	ignored: Option<&'a str>,
	/// Error message with a human-readable explanation as to why this request failed.
	#[serde(skip_serializing_if = "Option::is_none")]
	error: Option<&'a str>,
}

impl<'a> WebhookResponse<'a>
{
	fn planned(plan: &'a crate::planner::IntendedAction) -> Self
	{
		Self{ok: true, plan: Some(plan), ignored: None, error: None}
	}

	fn ignored(event_type: &'a str) -> Self
	{
		Self{ok: true, plan: None, ignored: Some(event_type), error: None}
	}

	fn error(message: &'a str) -> Self
	{
		Self{ok: false, plan: None, ignored: None, error: Some(message)}
	}
}
