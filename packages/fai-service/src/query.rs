use serde::{Deserialize, Serialize};

use fai_domain::filter;
use fai_providers::completion::ChatMessage;

use crate::{Error, FacilitaiService, Result, context, prompts};

pub const EMPTY_ANSWER: &str = "No response generated.";

/// A conversation, or a single legacy `query` string.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct QueryRequest {
	#[serde(default)]
	pub messages: Option<Vec<ChatMessage>>,
	#[serde(default)]
	pub query: Option<String>,
}
impl QueryRequest {
	pub fn from_messages(messages: Vec<ChatMessage>) -> Self {
		Self { messages: Some(messages), query: None }
	}

	/// The conversation to answer. `messages` wins over `query` when both are present.
	pub fn into_messages(self) -> Result<Vec<ChatMessage>> {
		let messages = match (self.messages, self.query) {
			(Some(messages), _) => messages,
			(None, Some(query)) => vec![ChatMessage::user(query)],
			(None, None) => return Err(Error::MissingInput),
		};

		match messages.last() {
			Some(last) if !last.content.trim().is_empty() => Ok(messages),
			_ => Err(Error::MissingInput),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
	pub response: String,
	/// The answer prompt built for an initial query, so clients can resend it as history.
	pub prompt: Option<String>,
	#[serde(rename = "where")]
	pub filter: Option<String>,
}

impl FacilitaiService {
	pub async fn query(&self, req: QueryRequest) -> Result<QueryResponse> {
		let messages = req.into_messages()?;

		tracing::info!(conversation_len = messages.len(), "Answering query.");

		if messages.len() > 1 {
			let answer = self.complete(&messages).await?;

			return Ok(QueryResponse { response: answer, prompt: None, filter: None });
		}

		let user_query = messages[0].content.as_str();
		let filter = self.derive_filter(user_query).await?;
		let records = if filter.is_empty() {
			tracing::info!("No filter derived from the query. Skipping the process search.");

			Vec::new()
		} else {
			let records = self.providers.store.fetch_processes(&self.cfg.store, &filter).await?;

			tracing::debug!(matches = records.len(), "Fetched matching processes.");

			records
		};
		let prompt = prompts::answer_prompt(user_query, &context::records_context(&records));
		let answer = self.complete(&[ChatMessage::user(prompt.as_str())]).await?;

		Ok(QueryResponse { response: answer, prompt: Some(prompt), filter: Some(filter) })
	}

	/// Asks the model for a `where` clause restricted to the store's taxonomy and repairs it.
	/// An empty result means the query implies no filter.
	pub async fn derive_filter(&self, user_query: &str) -> Result<String> {
		let taxonomy =
			self.providers.store.fetch_taxonomy(&self.cfg.store).await.map_err(|err| match err {
				fai_storage::Error::Malformed { message } =>
					Error::MalformedTaxonomyResponse { message },
				other => Error::from(other),
			})?;
		let prompt = prompts::filter_prompt(&prompts::describe_taxonomy(&taxonomy), user_query);
		let raw = self
			.providers
			.completion
			.complete(&self.cfg.providers.llm, &[ChatMessage::user(prompt)])
			.await?;

		tracing::debug!(raw = %raw, "Model produced a filter.");

		let repaired = filter::repair(&raw)?;

		tracing::debug!(filter = %repaired, "Repaired filter.");

		Ok(repaired)
	}

	async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
		let answer = self.providers.completion.complete(&self.cfg.providers.llm, messages).await?;

		if answer.trim().is_empty() {
			tracing::warn!("Model returned an empty answer.");

			return Ok(EMPTY_ANSWER.to_string());
		}

		Ok(answer)
	}
}
