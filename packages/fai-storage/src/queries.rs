//! GraphQL documents sent to the content store.

/// Taxonomy collections in the order they are requested and described to the model.
pub const TAXONOMY_CATEGORIES: [&str; 5] =
	["genres", "groupTypes", "activityTypes", "physicalities", "tags"];

const PROCESS_FIELDS: &str = "\
		title
		description { document }
		instructions { document }
		sources
		genres { name }
		activityTypes { name }
		miscTags { name }
		physicalities { name }
		groupTypes { name }
		duration";

pub fn taxonomy_query() -> String {
	format!("query {{\n{}\n}}", taxonomy_selection())
}

/// `filter` is spliced in verbatim as the `where` argument, so it must already be a repaired
/// object literal.
pub fn processes_query(filter: &str) -> String {
	format!("query {{\n\tprocesses(where: {filter}) {{\n{PROCESS_FIELDS}\n\t}}\n}}")
}

pub fn export_query() -> String {
	format!(
		"query {{\n{}\n\tcollections {{ title }}\n\tprocesses {{\n{PROCESS_FIELDS}\n\t}}\n}}",
		taxonomy_selection()
	)
}

fn taxonomy_selection() -> String {
	TAXONOMY_CATEGORIES
		.iter()
		.map(|category| format!("\t{category} {{ name }}"))
		.collect::<Vec<_>>()
		.join("\n")
}
