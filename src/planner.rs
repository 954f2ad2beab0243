//! Derive the task-tracker action a pull request event calls for.
//!
//! Planning is a pure function of the event payload. It neither reads prior state nor talks to the
//! task tracker, so redelivered or reordered events always yield the same plan.

/// Identifies a pull request across repositories (example: `octo-org/octo-repo#42`), used to
/// correlate it with its task in the task tracker.
#[derive(Clone, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct ExternalId(String);

impl ExternalId
{
	/// Build the identifier of pull request `number` in the repository `full_name`.
	pub fn new(repository_full_name: &str, number: u64) -> Self
	{
		Self(format!("{repository_full_name}#{number}"))
	}
}

/// The pull request action that led to an assignment.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource
{
	Opened,
	Assigned,
	Edited,
	/// The assignee was removed, so ownership falls back to the author.
	#[serde(rename = "unassigned->author")]
	UnassignedToAuthor,
}

/// The action the task tracker should take in response to a pull request event.
///
/// Serialized as a JSON object tagged with a `kind` field, which is the format handed to whatever
/// eventually applies the plan.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntendedAction
{
	/// Create the task for this pull request unless it already exists.
	#[serde(rename_all = "camelCase")]
	EnsureTask
	{
		external_id: ExternalId,
		assign_to: Option<String>,
		source: PlanSource,
	},
	/// Set the owner of the task.
	#[serde(rename_all = "camelCase")]
	Assign
	{
		external_id: ExternalId,
		assign_to: Option<String>,
		source: PlanSource,
	},
	/// Mark the task as done.
	#[serde(rename_all = "camelCase")]
	Complete
	{
		external_id: ExternalId,
		merged: bool,
	},
	/// Mark the task as active again.
	#[serde(rename_all = "camelCase")]
	Reopen
	{
		external_id: ExternalId,
	},
	/// Leave the task tracker alone.
	Noop
	{
		reason: String,
	},
}

impl IntendedAction
{
	fn noop<S>(reason: S) -> Self
	where
		S: Into<String>,
	{
		Self::Noop{reason: reason.into()}
	}
}

/// Compute the intended task-tracker action for a pull request event.
///
/// Never fails: payloads lacking the pull request, its number, or the repository name and actions we
/// don’t know about result in [IntendedAction::Noop] with an explanation.
pub fn plan(payload: &crate::PullRequestEventPayload) -> IntendedAction
{
	let repository_full_name = payload.repository.as_ref()
		.and_then(|repository| repository.full_name.as_deref());

	// Without its number, a pull request can’t be identified any more than a missing one
	let (pull_request, number, repository_full_name) =
		match (&payload.pull_request, repository_full_name)
		{
			(Some(pull_request), Some(repository_full_name)) => match pull_request.number
			{
				Some(number) => (pull_request, number, repository_full_name),
				None => return IntendedAction::noop("missing pr or repo"),
			},
			_ => return IntendedAction::noop("missing pr or repo"),
		};

	let external_id = ExternalId::new(repository_full_name, number);
	let assignee = pull_request.assignee.as_ref().and_then(|user| user.login.clone());
	let author = pull_request.user.as_ref().and_then(|user| user.login.clone());
	// Pull requests nobody is assigned to are owned by their author
	let default_assignee = author;
	let merged = pull_request.merged.unwrap_or(false);

	match payload.action.as_deref().unwrap_or_default()
	{
		"opened" => IntendedAction::EnsureTask
		{
			external_id,
			assign_to: assignee.or(default_assignee),
			source: PlanSource::Opened,
		},
		// Edits may or may not touch the assignee, but are treated like assignments regardless
		action @ ("assigned" | "edited") => IntendedAction::Assign
		{
			external_id,
			assign_to: assignee.or(default_assignee),
			source: match action
			{
				"assigned" => PlanSource::Assigned,
				_ => PlanSource::Edited,
			},
		},
		"unassigned" => IntendedAction::Assign
		{
			external_id,
			assign_to: default_assignee,
			source: PlanSource::UnassignedToAuthor,
		},
		"closed" => IntendedAction::Complete{external_id, merged},
		"reopened" => IntendedAction::Reopen{external_id},
		"synchronize" => IntendedAction::noop("new commits pushed; no asana change"),
		action => IntendedAction::noop(format!("unhandled action {action}")),
	}
}
