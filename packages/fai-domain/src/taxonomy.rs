/// Relationship fields on a process that point at a taxonomy collection.
pub const TAXONOMY_FIELDS: [&str; 5] =
	["activityTypes", "genres", "groupTypes", "physicalities", "miscTags"];

/// The store names the misc tag collection `tags` while processes reference it as `miscTags`.
pub const STORE_TAGS_CATEGORY: &str = "tags";
pub const PROCESS_TAGS_FIELD: &str = "miscTags";

pub fn is_taxonomy_field(key: &str) -> bool {
	TAXONOMY_FIELDS.contains(&key)
}

/// Maps a store category name onto the field name used in process filters.
pub fn filter_field_for_category(category: &str) -> &str {
	if category == STORE_TAGS_CATEGORY { PROCESS_TAGS_FIELD } else { category }
}
