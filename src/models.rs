/// Decode a field, treating values of an unexpected type like absent ones.
///
/// Webhook payloads that were authenticated but are incomplete or oddly shaped still need to result
/// in a plan, so a single malformed field must not fail decoding of the whole payload.
#[doc(hidden)]
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
	D: serde::Deserializer<'de>,
	T: serde::de::DeserializeOwned,
{
	let value = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;

	Ok(serde_json::from_value(value).ok())
}

/// Like [lenient], but only accepts JSON objects, as serde would otherwise decode structs from
/// arrays as well.
#[doc(hidden)]
fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
	D: serde::Deserializer<'de>,
	T: serde::de::DeserializeOwned,
{
	let value = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;

	match value.is_object()
	{
		true => Ok(serde_json::from_value(value).ok()),
		false => Ok(None),
	}
}

/// Partial user data model as contained in webhook event payloads.
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct User
{
	/// The user’s handle.
	#[serde(default, deserialize_with = "lenient")]
	pub login: Option<String>,
	// We don’t need the other fields, so ignore them
}

/// Partial repository data model as contained in webhook event payloads.
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Repository
{
	/// The repository’s name including its owner (example: `octo-org/octo-repo`).
	#[serde(default, deserialize_with = "lenient")]
	pub full_name: Option<String>,
	// We don’t need the other fields, so ignore them
}

/// Partial pull request data model as contained in webhook event payloads.
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PullRequest
{
	/// The pull request number, unique within its repository.
	#[serde(default, deserialize_with = "lenient")]
	pub number: Option<u64>,
	/// The user who opened the pull request.
	#[serde(default, deserialize_with = "lenient_object")]
	pub user: Option<User>,
	/// The primary assignee of the pull request, if any.
	#[serde(default, deserialize_with = "lenient_object")]
	pub assignee: Option<User>,
	/// Whether the pull request was merged (only meaningful for `closed` events).
	#[serde(default, deserialize_with = "lenient")]
	pub merged: Option<bool>,
	// We don’t need the other fields, so ignore them
}

/// Webhook event payload for pull request events as provided by the GitHub server.
///
/// Every field is optional and fields of an unexpected type are treated as absent, as the action
/// planner needs to handle incomplete payloads gracefully instead of rejecting them.
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PullRequestEventPayload
{
	/// The action that was performed (example: `opened`).
	#[serde(default, deserialize_with = "lenient")]
	pub action: Option<String>,
	/// The repository for which this event is reported.
	#[serde(default, deserialize_with = "lenient_object")]
	pub repository: Option<Repository>,
	/// The pull request itself.
	#[serde(default, deserialize_with = "lenient_object")]
	pub pull_request: Option<PullRequest>,
	// We don’t need the other fields, so ignore them
}

impl PullRequestEventPayload
{
	/// Decode a pull request event payload from any JSON value. Never fails: values other than JSON
	/// objects decode into an empty payload.
	pub fn from_json(value: serde_json::Value) -> Self
	{
		if !value.is_object()
		{
			log::debug!("pull request event payload is not a JSON object");
			return Self::default();
		}

		// With every field decoded leniently, objects always decode successfully
		serde_json::from_value(value).unwrap_or_default()
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn decodes_null_and_absent_fields()
	{
		let payload = PullRequestEventPayload::from_json(serde_json::json!({
			"action": "opened",
			"repository": {"full_name": "octo-org/octo-repo", "private": false},
			"pull_request": {"number": 7, "user": {"login": "alice"}, "assignee": null},
		}));

		let pull_request = payload.pull_request.unwrap();
		assert_eq!(payload.action.as_deref(), Some("opened"));
		assert_eq!(payload.repository.unwrap().full_name.as_deref(), Some("octo-org/octo-repo"));
		assert_eq!(pull_request.number, Some(7));
		assert_eq!(pull_request.user.unwrap().login.as_deref(), Some("alice"));
		assert!(pull_request.assignee.is_none());
		assert!(pull_request.merged.is_none());
	}

	#[test]
	fn decodes_empty_object()
	{
		let payload = PullRequestEventPayload::from_json(serde_json::json!({}));

		assert!(payload.action.is_none());
		assert!(payload.repository.is_none());
		assert!(payload.pull_request.is_none());
	}

	#[test]
	fn treats_mistyped_fields_as_absent()
	{
		let payload = PullRequestEventPayload::from_json(serde_json::json!({
			"action": 3,
			"repository": {"full_name": "octo-org/octo-repo"},
			"pull_request": {
				"number": "seven",
				"user": {"id": 5},
				"assignee": {"login": null},
				"merged": "yes",
			},
		}));

		let pull_request = payload.pull_request.unwrap();
		assert!(payload.action.is_none());
		assert_eq!(payload.repository.unwrap().full_name.as_deref(), Some("octo-org/octo-repo"));
		assert!(pull_request.number.is_none());
		assert!(pull_request.user.unwrap().login.is_none());
		assert!(pull_request.assignee.unwrap().login.is_none());
		assert!(pull_request.merged.is_none());
	}

	#[test]
	fn treats_mistyped_objects_as_absent()
	{
		let payload = PullRequestEventPayload::from_json(serde_json::json!({
			"action": "opened",
			"repository": "octo-org/octo-repo",
			"pull_request": [1, 2, 3],
		}));

		assert!(payload.repository.is_none());
		assert!(payload.pull_request.is_none());
	}

	#[test]
	fn non_object_payload_decodes_as_empty()
	{
		for value in [serde_json::json!([1, 2]), serde_json::json!("opened"), serde_json::Value::Null]
		{
			let payload = PullRequestEventPayload::from_json(value);

			assert!(payload.action.is_none());
			assert!(payload.pull_request.is_none());
		}
	}
}
