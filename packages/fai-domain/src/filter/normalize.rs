use std::sync::LazyLock;

use regex::Regex;

use crate::{filter::Literal, taxonomy};

const MAX_NORMALIZE_PASSES: usize = 16;

static MODIFIER_KEY: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^(.+?)_(in|some|none|every|not|gt|lt|gte|lte)$")
		.expect("Modifier key pattern must compile.")
});

/// Applies [`normalize`] until the tree stops changing.
pub fn normalize_to_fixed_point(literal: Literal) -> Literal {
	let mut current = literal;

	for _ in 0..MAX_NORMALIZE_PASSES {
		let next = normalize(&current);

		if next == current {
			return next;
		}

		current = next;
	}

	tracing::warn!(
		passes = MAX_NORMALIZE_PASSES,
		"Filter normalization did not settle; using the last pass."
	);

	current
}

/// One bottom-up pass of the filter rewrite rules.
pub fn normalize(literal: &Literal) -> Literal {
	match literal {
		Literal::Object(entries) => {
			let mut out = Vec::with_capacity(entries.len());

			for (key, value) in entries {
				normalize_entry(&mut out, key, value);
			}

			Literal::Object(out)
		},
		Literal::Array(items) => Literal::Array(items.iter().map(normalize).collect()),
		scalar => scalar.clone(),
	}
}

pub fn split_modifier(key: &str) -> Option<(&str, &str)> {
	let captures = MODIFIER_KEY.captures(key)?;

	Some((captures.get(1)?.as_str(), captures.get(2)?.as_str()))
}

fn normalize_entry(out: &mut Vec<(String, Literal)>, key: &str, value: &Literal) {
	// `genres_some: x` becomes `genres: { some: x }`, merged with any `genres` object already
	// produced at this level.
	if let Some((base, modifier)) = split_modifier(key) {
		let mut nested = match out.iter().find(|(k, _)| k == base) {
			Some((_, Literal::Object(existing))) => existing.clone(),
			_ => Vec::new(),
		};

		Literal::insert(&mut nested, modifier.to_string(), value.clone());

		let mut rewritten = Vec::with_capacity(1);

		normalize_entry(&mut rewritten, base, &Literal::Object(nested));

		for (key, value) in rewritten {
			Literal::insert(out, key, value);
		}

		return;
	}

	if taxonomy::is_taxonomy_field(key) && value.has_key("in") {
		Literal::insert(out, key.to_string(), some_name(normalize(value)));

		return;
	}

	match key {
		"some" => {
			if let Some([(field, inner)]) = value.entries()
				&& taxonomy::is_taxonomy_field(field)
			{
				Literal::insert(out, field.clone(), Literal::single("some", normalize(inner)));
			} else if value.has_key("in") {
				Literal::insert(out, key.to_string(), Literal::single("name", normalize(value)));
			} else if let Some(contains) = value.get("contains") {
				Literal::insert(
					out,
					key.to_string(),
					Literal::single("name", Literal::single("in", normalize(contains))),
				);
			} else {
				Literal::insert(out, key.to_string(), normalize(value));
			}
		},
		"name" if !value.has_key("in") => {
			let names = quote_bare(normalize(value));

			Literal::insert(out, key.to_string(), Literal::single("in", names));
		},
		"in" => Literal::insert(out, key.to_string(), quote_bare(normalize(value))),
		"contains" => {
			let name_filter = Literal::single("in", normalize(value));

			Literal::insert(out, "some".to_string(), some_name(name_filter));
		},
		"physical" => normalize_entry(out, "physicalities", value),
		_ => Literal::insert(out, key.to_string(), normalize(value)),
	}
}

/// Bare words in a name list are names, not enum values.
fn quote_bare(value: Literal) -> Literal {
	match value {
		Literal::Ident(word) => Literal::String(word),
		Literal::Array(items) => Literal::Array(items.into_iter().map(quote_bare).collect()),
		other => other,
	}
}

fn some_name(name_filter: Literal) -> Literal {
	Literal::single("some", Literal::single("name", name_filter))
}
