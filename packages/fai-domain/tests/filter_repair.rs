use fai_domain::filter::{self, literal};

const MODEL_OUTPUTS: [&str; 10] = [
	"where: {genres_in: [\"Trust\"]}",
	"```graphql\n{ where: { groupTypes_some: { name_in: [\"Large\"] } } }\n```",
	"genres: { in: [\"Energizer\"] }, groupTypes: { in: [\"Large\"] }",
	"{ some: { physicalities: { name: \"Low\" } } }",
	"{ OR: [{ miscTags: { contains: [\"Outdoor\"] } }, { physical_in: ['High'] }] }",
	"{ title: { contains: \"walk\" mode: insensitive }, duration: \"15 min\" }",
	"{ genres_some: { name_in: [\"Trust\"] }, genres_none: { name: \"Loud\" }, }",
	"{}",
	"{ where_some: { x: 1 } }",
	"{ genres: { in: [Energizer, Icebreaker] }, title: { equals: Walk } }",
];

#[test]
fn empty_output_means_no_filter() {
	assert_eq!(filter::repair("").expect("repair failed"), "");
	assert_eq!(filter::repair("   \n").expect("repair failed"), "");
	assert_eq!(filter::repair("\"\"").expect("repair failed"), "");
	assert_eq!(filter::repair("```json\n\"\"\n```").expect("repair failed"), "");
}

#[test]
fn expands_composite_taxonomy_keys() {
	assert_eq!(
		filter::repair("where: {genres_in: [\"Trust\"]}").expect("repair failed"),
		"{ genres: { some: { name: { in: [\"Trust\"] } } } }"
	);
}

#[test]
fn expands_composite_name_keys() {
	assert_eq!(
		filter::repair("{name_in: [\"Icebreaker\"]}").expect("repair failed"),
		"{ name: { in: [\"Icebreaker\"] } }"
	);
}

#[test]
fn renames_physical_to_physicalities() {
	assert_eq!(
		filter::repair("{ physical: { in: [\"Low\"] } }").expect("repair failed"),
		"{ physicalities: { some: { name: { in: [\"Low\"] } } } }"
	);
	assert_eq!(
		filter::repair("{ physical_in: [\"Low\"] }").expect("repair failed"),
		"{ physicalities: { some: { name: { in: [\"Low\"] } } } }"
	);
}

#[test]
fn restricts_group_types_and_genres_for_a_typical_query() {
	let repaired = filter::repair(
		"```json\n{ groupTypes: { in: [\"Large\"] }, genres: { some: { name: { in: [\"Energizer\"] } } } }\n```",
	)
	.expect("repair failed");

	assert_eq!(
		repaired,
		"{ groupTypes: { some: { name: { in: [\"Large\"] } } }, genres: { some: { name: { in: [\"Energizer\"] } } } }"
	);
}

#[test]
fn unwraps_where_and_adds_missing_braces() {
	assert_eq!(
		filter::repair(MODEL_OUTPUTS[1]).expect("repair failed"),
		"{ groupTypes: { some: { name: { in: [\"Large\"] } } } }"
	);
	assert_eq!(
		filter::repair(MODEL_OUTPUTS[2]).expect("repair failed"),
		"{ genres: { some: { name: { in: [\"Energizer\"] } } }, groupTypes: { some: { name: { in: [\"Large\"] } } } }"
	);
}

#[test]
fn quotes_bare_words_in_name_lists() {
	assert_eq!(
		filter::repair("{ genres: { in: [Energizer, Icebreaker] } }").expect("repair failed"),
		"{ genres: { some: { name: { in: [\"Energizer\", \"Icebreaker\"] } } } }"
	);
	assert_eq!(
		filter::repair("{ groupTypes_some: { name: Large } }").expect("repair failed"),
		"{ groupTypes: { some: { name: { in: \"Large\" } } } }"
	);
	assert_eq!(
		filter::repair("{ title: { equals: \"Walk\", mode: insensitive } }").expect("repair failed"),
		"{ title: { equals: \"Walk\", mode: insensitive } }"
	);
}

#[test]
fn where_produced_by_a_composite_key_is_unwrapped() {
	let once = filter::repair("{ where_some: { x: 1 } }").expect("repair failed");

	assert_eq!(once, "{ some: { x: 1 } }");
	assert_eq!(filter::repair(&once).expect("second repair failed"), once);
}

#[test]
fn repair_is_idempotent() {
	for raw in MODEL_OUTPUTS {
		let once = filter::repair(raw).expect("repair failed");
		let twice = filter::repair(&once).expect("second repair failed");

		assert_eq!(once, twice, "Input: {raw}");
	}
}

#[test]
fn repaired_output_round_trips_through_the_parser() {
	for raw in MODEL_OUTPUTS {
		let repaired = filter::repair(raw).expect("repair failed");
		let reparsed = literal::parse(&repaired).expect("repaired output must parse");

		assert_eq!(reparsed.to_string(), repaired, "Input: {raw}");
	}
}

#[test]
fn parse_failures_surface_instead_of_dropping_the_filter() {
	let err = filter::repair("{ genres: { in: [\"A\" }").expect_err("Expected a parse error.");

	assert_eq!(err.offset, 21);
	assert!(filter::repair("genres: [").is_err());
	assert!(filter::repair("{ genres: { in: [\"A\"] } } extra").is_err());
	assert!(filter::repair("Sorry, I cannot help with that.").is_err());
}
