use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{Error, Result, queries::TAXONOMY_CATEGORIES};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntry {
	#[serde(default, deserialize_with = "null_as_default")]
	pub name: String,
}

/// A rich-text field. `document` is the node array the renderer consumes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RichText {
	#[serde(default)]
	pub document: Value,
}

/// A process as selected by the process queries. GraphQL nulls read as empty values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRecord {
	#[serde(default, deserialize_with = "null_as_default")]
	pub title: String,
	#[serde(default, deserialize_with = "null_as_default")]
	pub description: RichText,
	#[serde(default, deserialize_with = "null_as_default")]
	pub instructions: RichText,
	#[serde(default, deserialize_with = "null_as_default")]
	pub sources: String,
	#[serde(default, deserialize_with = "null_as_default")]
	pub duration: String,
	#[serde(default, deserialize_with = "null_as_default")]
	pub genres: Vec<NamedEntry>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub activity_types: Vec<NamedEntry>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub misc_tags: Vec<NamedEntry>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub physicalities: Vec<NamedEntry>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub group_types: Vec<NamedEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaxonomyCategory {
	/// The store's collection name, e.g. `tags`.
	pub name: String,
	pub values: Vec<String>,
}

/// Every taxonomy collection, in [`TAXONOMY_CATEGORIES`] order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Taxonomy {
	pub categories: Vec<TaxonomyCategory>,
}
impl Taxonomy {
	pub fn from_data(data: &Value) -> Result<Self> {
		let mut categories = Vec::with_capacity(TAXONOMY_CATEGORIES.len());

		for category in TAXONOMY_CATEGORIES {
			let entries = data.get(category).and_then(Value::as_array).ok_or_else(|| {
				Error::Malformed { message: format!("Taxonomy category {category} is missing.") }
			})?;
			let mut values = Vec::with_capacity(entries.len());

			for entry in entries {
				let Some(name) = entry.get("name").and_then(Value::as_str) else {
					return Err(Error::Malformed {
						message: format!("Taxonomy category {category} has an entry without a name."),
					});
				};

				values.push(name.to_string());
			}

			categories.push(TaxonomyCategory { name: category.to_string(), values });
		}

		Ok(Self { categories })
	}
}

pub fn names(entries: &[NamedEntry]) -> Vec<&str> {
	entries.iter().map(|entry| entry.name.as_str()).collect()
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de> + Default,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
