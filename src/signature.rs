//! Verification of webhook payload signatures as sent by GitHub in the `X-Hub-Signature-256`
//! header.

/// GitHub puts this prefix in front of its hex-encoded HMAC-SHA256 digest.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Compute the signature GitHub would send along with a payload, including the `sha256=` prefix.
///
/// # Arguments
/// - `payload`: The raw request body.
/// - `secret`: The shared webhook secret.
pub fn sign(payload: &[u8], secret: &[u8]) -> String
{
	use hmac::Mac as _;

	let mut mac = hmac::Hmac::<sha2::Sha256>::new_from_slice(secret)
		.expect("this call is infallible because HMAC supports keys of arbitrary size");

	mac.update(payload);

	format!("{SIGNATURE_PREFIX}{}", hex::encode(mac.finalize().into_bytes()))
}

/// Check whether a payload signature header matches the payload and secret.
///
/// Headers that are missing or don’t carry the `sha256=` prefix are rejected outright.
///
/// # Arguments
/// - `payload`: The raw request body.
/// - `provided_signature`: The value of the signature header, if present.
/// - `secret`: The shared webhook secret.
pub fn verify(payload: &[u8], provided_signature: Option<&str>, secret: &[u8]) -> bool
{
	let provided_signature = match provided_signature
	{
		Some(signature) if signature.starts_with(SIGNATURE_PREFIX) => signature,
		_ => return false,
	};

	// Use a secure string wrapper that provides a constant-time equality comparator to prevent
	// timing attacks
	let provided_signature = secstr::SecStr::from(provided_signature);
	let expected_signature = secstr::SecStr::from(sign(payload, secret));

	provided_signature == expected_signature
}

/// Verifies webhook payloads against a webhook secret fixed at construction.
#[derive(Clone)]
pub struct Verifier
{
	#[doc(hidden)]
	secret: secstr::SecStr,
}

impl Verifier
{
	/// Create a verifier for the given webhook secret.
	pub fn new(secret: &str) -> Self
	{
		Self
		{
			secret: secstr::SecStr::from(secret),
		}
	}

	/// Verify a webhook event payload by checking the provided signature.
	///
	/// # Arguments
	/// - `payload`: The raw request body.
	/// - `provided_signature`: The value of the `X-Hub-Signature-256` header, if present.
	pub fn verify_payload(&self, payload: &[u8], provided_signature: Option<&str>)
		-> Result<(), crate::Error>
	{
		if provided_signature.is_none()
		{
			return Err(crate::Error::MissingPayloadSignature);
		}

		if verify(payload, provided_signature, self.secret.unsecure())
		{
			log::debug!("successfully verified payload signature");
			Ok(())
		}
		else
		{
			Err(crate::Error::InvalidPayloadSignature)
		}
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	const BODY: &[u8] = br#"{"action":"opened","number":1}"#;

	#[test]
	fn accepts_own_signature()
	{
		let signature = sign(BODY, b"secret");

		assert!(signature.starts_with("sha256="));
		assert_eq!(signature.len(), "sha256=".len() + 64);
		assert!(verify(BODY, Some(signature.as_str()), b"secret"));
	}

	#[test]
	fn matches_github_reference_signature()
	{
		// Example from GitHub’s documentation on validating webhook deliveries
		let signature = sign(b"Hello, World!", b"It's a Secret to Everybody");

		assert_eq!(signature,
			"sha256=757107ea0eb2509fc211221cce984b8a37570b6d7586c22c46f4379c8b043e17");
	}

	#[test]
	fn rejects_signature_made_with_other_secret()
	{
		let signature = sign(BODY, b"other secret");

		assert!(!verify(BODY, Some(signature.as_str()), b"secret"));
	}

	#[test]
	fn rejects_any_single_byte_change()
	{
		let signature = sign(BODY, b"secret");

		for index in 0..BODY.len()
		{
			let mut tampered_body = BODY.to_vec();
			tampered_body[index] ^= 0x01;

			assert!(!verify(&tampered_body, Some(signature.as_str()), b"secret"),
				"flipping byte {index} should invalidate the signature");
		}
	}

	#[test]
	fn rejects_missing_or_unprefixed_signature()
	{
		let signature = sign(BODY, b"secret");
		let digest = signature.strip_prefix("sha256=").unwrap();

		assert!(!verify(BODY, None, b"secret"));
		assert!(!verify(BODY, Some(digest), b"secret"));
		assert!(!verify(BODY, Some(format!("sha1={digest}").as_str()), b"secret"));
		assert!(!verify(BODY, Some(""), b"secret"));
	}

	#[test]
	fn verifier_distinguishes_missing_from_invalid_signature()
	{
		let verifier = Verifier::new("secret");
		let signature = sign(BODY, b"secret");

		assert!(verifier.verify_payload(BODY, Some(signature.as_str())).is_ok());
		assert!(matches!(verifier.verify_payload(BODY, None),
			Err(crate::Error::MissingPayloadSignature)));
		assert!(matches!(verifier.verify_payload(BODY, Some("sha256=00")),
			Err(crate::Error::InvalidPayloadSignature)));
	}
}
