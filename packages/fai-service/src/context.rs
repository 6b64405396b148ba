//! Plain-text blocks describing retrieved processes, fed to the answer prompt.

use fai_domain::markdown;
use fai_storage::models::{ProcessRecord, RichText, names};

/// Renders every record into one block, blocks separated by a blank line.
pub fn records_context(records: &[ProcessRecord]) -> String {
	records.iter().map(record_context).collect::<Vec<_>>().join("\n\n")
}

pub fn record_context(record: &ProcessRecord) -> String {
	[
		format!("Title: {}", record.title),
		format!("Source: {}", record.sources),
		format!("Description: {}", flatten(&record.description)),
		format!("Instructions: {}", flatten(&record.instructions)),
		format!("Duration: {}", record.duration),
		format!("Genres: {}", names(&record.genres).join(", ")),
		format!("Group Size: {}", names(&record.group_types).join(", ")),
		format!("Activity Types: {}", names(&record.activity_types).join(", ")),
		format!("Physicalities: {}", names(&record.physicalities).join(", ")),
		format!("Tags: {}", names(&record.misc_tags).join(", ")),
	]
	.join("\n")
}

/// One line per field keeps record boundaries obvious to the model.
fn flatten(text: &RichText) -> String {
	markdown::render_document(&text.document).replace('\n', " ")
}
