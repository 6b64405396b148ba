//! Synthetic prompt/response pairs built from the store's own taxonomy and processes.
//!
//! A template is drawn at random, each placeholder is filled with a random taxonomy value, and
//! the response lists every process matching all filled values. Draws with no match are
//! discarded.

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use fai_domain::markdown;
use fai_storage::models::{NamedEntry, ProcessRecord, names};

use crate::{Error, FacilitaiService, Result};

pub const RESPONSE_PREFIX: &str = "Here are some processes you might try:\n\n";

const PROMPT_TEMPLATES: [&str; 40] = [
	"Suggest activities suitable for {groupType} that involve {activityType} and {physicality}.",
	"What are some {activityType} activities for {groupType} that include {physicality}?",
	"Can you recommend {genre} exercises that feature {activityType} and are appropriate for {groupType}?",
	"I'm looking for activities that are {activityType}, involve {physicality}, and are good for {groupType}.",
	"List activities in the genre of {genre} suitable for {groupType} involving {physicality}.",
	"Do you have any suggestions for {activityType} in {genre} for {groupType}?",
	"Please recommend activities with {miscTag} for {groupType} that include {physicality}.",
	"What activities can {groupType} do that involve {physicality} and {activityType}?",
	"What are some activities I can do with {groupType}?",
	"What activities can be done in {duration}?",
	"Suggest some activities that last around {duration}.",
	"I have {duration} available. What activities can I do?",
	"List activities with a duration of {duration}.",
	"What activities are there in the genre of {genre}?",
	"Suggest some {genre} activities.",
	"I'm interested in {genre}. What activities can you recommend?",
	"Do you have any activities related to {genre}?",
	"List some {activityType} activities.",
	"What are some activities that involve {activityType}?",
	"Can you recommend activities focused on {activityType}?",
	"Suggest activities categorized under {activityType}.",
	"What activities involve {physicality}?",
	"Suggest activities that include {physicality}.",
	"I'm looking for activities with {physicality}. What do you recommend?",
	"List activities that require {physicality}.",
	"What {activityType} activities involve {physicality}?",
	"Can you suggest {activityType} activities that include {physicality}?",
	"I'm interested in {activityType} activities with {physicality}.",
	"What activities lasting {duration} involve {physicality}?",
	"Suggest activities that take around {duration} and include {physicality}.",
	"Do you have any {duration} activities that involve {physicality}?",
	"What activities for {groupType} last about {duration}?",
	"Suggest {duration} activities suitable for {groupType}.",
	"I'm looking for activities for {groupType} that take around {duration}.",
	"What activities for {groupType} involve {physicality}?",
	"Suggest activities suitable for {groupType} that include {physicality}.",
	"I'm seeking activities for {groupType} that involve {physicality}.",
	"What {genre} activities can be done in {duration}?",
	"Suggest {genre} activities that last around {duration}.",
	"I'm interested in {genre} activities that take {duration}.",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPair {
	pub prompt: String,
	pub response: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Placeholder {
	GroupType,
	ActivityType,
	Physicality,
	Genre,
	MiscTag,
	Duration,
}
impl Placeholder {
	const ALL: [Self; 6] = [
		Self::GroupType,
		Self::ActivityType,
		Self::Physicality,
		Self::Genre,
		Self::MiscTag,
		Self::Duration,
	];

	fn token(self) -> &'static str {
		match self {
			Self::GroupType => "{groupType}",
			Self::ActivityType => "{activityType}",
			Self::Physicality => "{physicality}",
			Self::Genre => "{genre}",
			Self::MiscTag => "{miscTag}",
			Self::Duration => "{duration}",
		}
	}

	/// The store category whose names fill this placeholder. Durations come from processes.
	fn category(self) -> Option<&'static str> {
		match self {
			Self::GroupType => Some("groupTypes"),
			Self::ActivityType => Some("activityTypes"),
			Self::Physicality => Some("physicalities"),
			Self::Genre => Some("genres"),
			Self::MiscTag => Some("tags"),
			Self::Duration => None,
		}
	}

	fn matches(self, process: &ProcessRecord, value: &str) -> bool {
		let entries: &[NamedEntry] = match self {
			Self::GroupType => &process.group_types,
			Self::ActivityType => &process.activity_types,
			Self::Physicality => &process.physicalities,
			Self::Genre => &process.genres,
			Self::MiscTag => &process.misc_tags,
			Self::Duration => return compact(&process.duration) == value,
		};

		names(entries).contains(&value)
	}
}

/// Values available for each placeholder, indexed by the placeholder's position in
/// [`Placeholder::ALL`].
struct Pools {
	values: [Vec<String>; 6],
}
impl Pools {
	fn from_export(data: &Value, processes: &[ProcessRecord]) -> Self {
		let values = Placeholder::ALL.map(|placeholder| match placeholder.category() {
			Some(category) => data
				.get(category)
				.and_then(Value::as_array)
				.map(|entries| {
					entries
						.iter()
						.filter_map(|entry| entry.get("name").and_then(Value::as_str))
						.map(str::to_string)
						.collect::<Vec<_>>()
				})
				.unwrap_or_default(),
			None => duration_variants(processes),
		});

		Self { values }
	}

	fn get(&self, placeholder: Placeholder) -> &[String] {
		&self.values[placeholder as usize]
	}

	fn is_empty(&self) -> bool {
		self.values.iter().all(Vec::is_empty)
	}
}

impl FacilitaiService {
	/// Builds up to `num_prompts` pairs, or the configured default when `None`.
	pub async fn training_data(&self, num_prompts: Option<u32>) -> Result<Vec<TrainingPair>> {
		let training = &self.cfg.training;
		let num_prompts = num_prompts.unwrap_or(training.default_num_prompts);

		if num_prompts == 0 || num_prompts > training.max_num_prompts {
			return Err(Error::InvalidRequest {
				message: format!("numPrompts must be between 1 and {}.", training.max_num_prompts),
			});
		}

		let data = self.providers.store.fetch_all(&self.cfg.store).await?;
		let mut rng = StdRng::from_entropy();

		synthesize(
			&data,
			num_prompts as usize,
			training.max_attempts_per_prompt as usize,
			&mut rng,
		)
	}
}

/// Draws templates until `num_prompts` pairs exist or `num_prompts * max_attempts_per_prompt`
/// draws have been made, whichever comes first.
pub fn synthesize<R>(
	data: &Value,
	num_prompts: usize,
	max_attempts_per_prompt: usize,
	rng: &mut R,
) -> Result<Vec<TrainingPair>>
where
	R: Rng + ?Sized,
{
	let processes: Vec<ProcessRecord> = match data.get("processes") {
		Some(processes) if !processes.is_null() => serde_json::from_value(processes.clone())
			.map_err(|err| Error::UpstreamUnavailable {
				message: format!("Exported processes could not be decoded: {err}."),
			})?,
		_ => Vec::new(),
	};
	let pools = Pools::from_export(data, &processes);

	tracing::info!(
		num_prompts,
		processes = processes.len(),
		genres = pools.get(Placeholder::Genre).len(),
		group_types = pools.get(Placeholder::GroupType).len(),
		durations = pools.get(Placeholder::Duration).len(),
		"Generating training data."
	);

	let mut pairs = Vec::with_capacity(num_prompts);

	if processes.is_empty() || pools.is_empty() {
		tracing::warn!("Nothing to generate training data from.");

		return Ok(pairs);
	}

	let max_attempts = num_prompts.saturating_mul(max_attempts_per_prompt);
	let mut attempts = 0;

	while pairs.len() < num_prompts && attempts < max_attempts {
		attempts += 1;

		let Some(template) = PROMPT_TEMPLATES.choose(rng) else {
			break;
		};
		let Some(filled) = fill_template(template, &pools, rng) else {
			continue;
		};
		let matching: Vec<&ProcessRecord> = processes
			.iter()
			.filter(|process| filled.iter().all(|(p, value)| p.matches(process, value)))
			.collect();

		if matching.is_empty() {
			continue;
		}

		let mut prompt = template.to_string();

		for (placeholder, value) in &filled {
			prompt = prompt.replace(placeholder.token(), value);
		}

		let blocks = matching.iter().map(|process| process_response(process)).collect::<Vec<_>>();
		let response = format!("{RESPONSE_PREFIX}{}", blocks.join("\n\n"));

		pairs.push(TrainingPair { prompt, response });
	}

	if pairs.len() < num_prompts {
		tracing::warn!(
			produced = pairs.len(),
			requested = num_prompts,
			attempts,
			"Training data generation stopped at the attempt limit."
		);
	}

	Ok(pairs)
}

/// Picks a value for every placeholder the template uses, or `None` when a pool is empty.
fn fill_template<R>(
	template: &str,
	pools: &Pools,
	rng: &mut R,
) -> Option<Vec<(Placeholder, String)>>
where
	R: Rng + ?Sized,
{
	Placeholder::ALL
		.into_iter()
		.filter(|placeholder| template.contains(placeholder.token()))
		.map(|placeholder| {
			pools.get(placeholder).choose(rng).map(|value| (placeholder, value.clone()))
		})
		.collect()
}

fn process_response(process: &ProcessRecord) -> String {
	format!(
		"# {}\n\nDuration: {}\nGroup Type: {}\n\n{}. These are the instructions:\n\n{}",
		process.title,
		process.duration,
		names(&process.group_types).join(", "),
		first_block(&process.description.document),
		first_block(&process.instructions.document),
	)
}

fn first_block(document: &Value) -> String {
	let mut out = String::new();

	if let Some(first) = document.as_array().and_then(|nodes| nodes.first()) {
		markdown::render_node(first, &mut out);
	}

	out.trim().to_string()
}

/// Distinct non-empty durations with whitespace removed, in first-seen order.
fn duration_variants(processes: &[ProcessRecord]) -> Vec<String> {
	let mut variants: Vec<String> = Vec::new();

	for process in processes {
		let duration = compact(&process.duration);

		if !duration.is_empty() && !variants.contains(&duration) {
			variants.push(duration);
		}
	}

	variants
}

fn compact(value: &str) -> String {
	value.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_template_uses_a_known_placeholder() {
		for template in PROMPT_TEMPLATES {
			let mut rest = template.to_string();

			for placeholder in Placeholder::ALL {
				rest = rest.replace(placeholder.token(), "");
			}

			assert!(!rest.contains('{'), "Unknown placeholder in {template}");
			assert_ne!(rest, template, "No placeholder in {template}");
		}
	}

	#[test]
	fn durations_are_compacted_and_unique() {
		let processes: Vec<ProcessRecord> = serde_json::from_value(serde_json::json!([
			{ "duration": "10 min" },
			{ "duration": "10min" },
			{ "duration": " " },
			{ "duration": "1 hour" },
		]))
		.expect("Failed to decode processes.");

		assert_eq!(duration_variants(&processes), vec!["10min", "1hour"]);
	}

	#[test]
	fn missing_pool_values_skip_the_template() {
		let data = serde_json::json!({ "genres": [{ "name": "Energizer" }], "processes": [] });
		let pools = Pools::from_export(&data, &[]);
		let mut rng = StdRng::seed_from_u64(7);

		assert!(fill_template("Suggest some {genre} activities.", &pools, &mut rng).is_some());
		assert!(
			fill_template("What activities can be done in {duration}?", &pools, &mut rng).is_none()
		);
	}
}
