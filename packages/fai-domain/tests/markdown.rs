use serde_json::json;

use fai_domain::markdown::render_document;

fn text(value: &str) -> serde_json::Value {
	json!({ "text": value })
}

#[test]
fn renders_paragraphs_and_trims_the_result() {
	let document = json!([
		{ "type": "paragraph", "children": [text("hi")] },
		{ "type": "paragraph", "children": [text("there"), text(" friend")] },
	]);

	assert_eq!(render_document(&document), "hi\n\nthere friend");
}

#[test]
fn renders_headings_with_level() {
	let document = json!([
		{ "type": "paragraph", "children": [text("intro")] },
		{ "type": "heading", "level": 2, "children": [text("T")] },
	]);
	let rendered = render_document(&document);

	assert!(rendered.contains("## T"));
	assert_eq!(rendered, "intro\n\n\n\n## T");
}

#[test]
fn stacks_leaf_styles() {
	let document = json!([{
		"type": "paragraph",
		"children": [
			{ "text": "text", "bold": true, "italic": true },
			{ "text": " and " },
			{ "text": "x", "underline": true, "code": true },
		],
	}]);

	assert_eq!(render_document(&document), "***text*** and `<u>x</u>`");
}

#[test]
fn renders_both_list_encodings() {
	let document = json!([{
		"type": "list",
		"ordered": true,
		"items": [{ "children": [text("a")] }, { "children": [text("b")] }],
	}]);

	assert_eq!(render_document(&document), "1. a\n2. b");

	let document = json!([{
		"type": "unordered-list",
		"children": [
			{ "type": "list-item", "children": [text("x")] },
			{ "type": "list-item", "children": [text("y")] },
		],
	}]);

	assert_eq!(render_document(&document), "- x\n- y");
}

#[test]
fn renders_blockquotes_and_code_blocks() {
	let document = json!([
		{ "type": "blockquote", "children": [text("q")] },
		{ "type": "code", "language": "rust", "code": "fn main() {}" },
	]);

	assert_eq!(render_document(&document), "> q\n\n\n\n```rust\nfn main() {}\n```");

	let document = json!([{ "type": "code", "children": [text("let a = 1;")] }]);

	assert_eq!(render_document(&document), "```\nlet a = 1;\n```");
}

#[test]
fn renders_unknown_containers_by_their_children() {
	let document = json!([
		{ "type": "layout", "children": [{ "type": "layout-area", "children": [text("deep")] }] },
		{ "type": "divider" },
		null,
	]);

	assert_eq!(render_document(&document), "deep");
}

#[test]
fn non_array_documents_render_empty() {
	assert_eq!(render_document(&json!(null)), "");
	assert_eq!(render_document(&json!({ "type": "paragraph", "children": [text("hi")] })), "");
	assert_eq!(render_document(&json!("hi")), "");
}
