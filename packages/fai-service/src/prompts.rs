//! Prompt text for the two model calls of an initial query.

use fai_domain::taxonomy;
use fai_storage::models::Taxonomy;

const FILTER_INSTRUCTIONS: &str = "\
System: Generate a valid \"where\" clause for a GraphQL (KeystoneJS) query, given the Metadata \
and User Query below. \
Each Metadata category (e.g. genres) is an object type in the GraphQL database with a \
many-to-many relationship to the \"processes\" being filtered by the \"where\" clause. \
The values listed are every possible value of the \"name\" sub-field of that object type. \
IMPORTANT: Do not use values in the \"where\" clause that are not listed for that category in \
the Metadata. \
Combine conditions with booleans (AND, OR, NOT) and filter keys (e.g. \"in\", \"some\", \
\"every\") so that the clause models the User Query accurately. \
IMPORTANT: Give only the resulting \"where\" clause, without any explanation or preamble. \
If no Metadata value is clearly implied for a category, leave that category out of the clause. \
If no category has a clear value, return an empty string. \
Return the \"where\" clause only and nothing else. \
Make sure the result is a correctly formatted GraphQL object literal without surrounding quotes \
or backticks, and that every opening { has a matching closing }.";

const ANSWER_INSTRUCTIONS: &str = "\
System:
You are a helpful and enthusiastic research assistant for a database of processes that \
facilitators can run.
The potentially relevant processes are provided under Database.
In the initial query, act like a search engine for the processes listed in Database.
List the ones that are relevant to the user's query.
If fewer than 5 come from the Database, supplement them with additional processes from outside \
the Database.
IMPORTANT: Clearly indicate which processes are outside the scope of the Database.
First give the user a list of titles with short summaries, and offer to explain further.
In subsequent queries, you may answer questions about the processes given in the first answer \
and refine (add to or remove from) your initial suggestions.
If the user's query is not about finding facilitation processes, do not answer it. Remind the \
user of your scope instead.
Again, do not answer questions outside of the scope outlined above.
Format your answer as Markdown. Make the title a header. Use English only.";

/// One line per category, `category: value, value`. The store's `tags` category is listed under
/// the process field name `miscTags` so the model filters on the right key.
pub fn describe_taxonomy(taxonomy: &Taxonomy) -> String {
	taxonomy
		.categories
		.iter()
		.map(|category| {
			format!(
				"{}: {}",
				taxonomy::filter_field_for_category(&category.name),
				category.values.join(", ")
			)
		})
		.collect::<Vec<_>>()
		.join("\n")
}

pub fn filter_prompt(metadata: &str, user_query: &str) -> String {
	format!("{FILTER_INSTRUCTIONS}\n---- Metadata:\n{metadata}\n---- User Query:\n{user_query}")
}

pub fn answer_prompt(user_query: &str, database: &str) -> String {
	format!("\n{ANSWER_INSTRUCTIONS}\n\nUser Query:\n{user_query}\n\nDatabase:\n{database}\n")
}
