//! Repairs model-generated `where` clauses into filter text the content store accepts.
//!
//! The model is asked for a GraphQL object literal but answers with whatever it likes: fenced
//! code, a `where:` prefix, missing outer braces, `field_modifier` keys, `some` in the wrong
//! place. [`repair`] strips the formatting, parses the literal without evaluating it, rewrites
//! it into the `{ field: { some: { name: { in: [...] } } } }` shape and prints it back.

pub mod literal;
pub mod normalize;

pub use literal::Literal;

use std::sync::LazyLock;

use regex::Regex;

static WHERE_PREAMBLE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^`?where:\s*").expect("Where preamble pattern must compile."));
static LEADING_FENCE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^`+(?i:json|graphql)?").expect("Leading fence pattern must compile.")
});
static TRAILING_FENCE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"`+$").expect("Trailing fence pattern must compile."));

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Filter is not a valid object literal at byte {offset}: {message}.")]
pub struct FilterParseError {
	pub offset: usize,
	pub message: String,
}

/// Returns the repaired filter text, or an empty string when the model produced no filter.
///
/// An empty result means "do not search". A parse failure is an error and is never reported as
/// an empty filter.
pub fn repair(raw: &str) -> Result<String, FilterParseError> {
	let text = strip_artifacts(raw);

	if text.is_empty() {
		return Ok(String::new());
	}

	let parsed = if text.starts_with('{') {
		literal::parse(&text)?
	} else {
		literal::parse(&format!("{{{text}}}"))?
	};
	let mut current = unwrap_where(parsed);

	// Normalizing can expand a `where_*` key into a fresh top-level `where`.
	loop {
		let next = unwrap_where(normalize::normalize_to_fixed_point(current.clone()));

		if next == current {
			return Ok(next.to_string());
		}

		current = next;
	}
}

/// Removes the `where:` prefix, code fences and an empty-string answer.
pub fn strip_artifacts(raw: &str) -> String {
	let text = WHERE_PREAMBLE.replace(raw.trim(), "");
	let text = LEADING_FENCE.replace(text.trim(), "");
	let text = TRAILING_FENCE.replace(&text, "");
	let text = text.trim();

	if text == "\"\"" { String::new() } else { text.to_string() }
}

/// `{ where: { ... } }` is the argument wrapped once more than the store expects.
fn unwrap_where(mut literal: Literal) -> Literal {
	while let Some(inner @ Literal::Object(_)) = literal.get("where") {
		literal = inner.clone();
	}

	literal
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn strips_fences_and_preamble() {
		assert_eq!(strip_artifacts("```json\n{ a: 1 }\n```"), "{ a: 1 }");
		assert_eq!(strip_artifacts("`where: { a: 1 }`"), "{ a: 1 }");
		assert_eq!(strip_artifacts("  \"\"  "), "");
		assert_eq!(strip_artifacts("```\n\"\"\n```"), "");
	}

	#[test]
	fn unwraps_nested_where_objects_only() {
		let parsed = literal::parse("{ where: { where: { a: 1 } } }").expect("parse failed");

		assert_eq!(unwrap_where(parsed).to_string(), "{ a: 1 }");

		let parsed = literal::parse("{ where: \"x\" }").expect("parse failed");

		assert_eq!(unwrap_where(parsed).to_string(), "{ where: \"x\" }");
	}
}
