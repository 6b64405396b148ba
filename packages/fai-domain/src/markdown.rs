//! Flattens the store's rich-text document trees into Markdown for prompt context.
//!
//! Documents arrive as JSON straight from the content store, so the renderer works on
//! [`serde_json::Value`] and classifies each node into a [`Block`] before rendering. Anything it
//! does not recognise renders its children, or nothing.

use serde_json::Value;

const MAX_HEADING_LEVEL: u64 = 6;

/// A document node resolved from its `type` tag and fields.
#[derive(Clone, Copy, Debug)]
pub enum Block<'a> {
	Paragraph { children: &'a [Value] },
	Heading { level: usize, children: &'a [Value] },
	List { ordered: bool, items: &'a [Value] },
	Blockquote { children: &'a [Value] },
	CodeBlock { language: &'a str, code: CodeSource<'a> },
	Text(Leaf<'a>),
	Container { children: &'a [Value] },
	Empty,
}
impl<'a> Block<'a> {
	pub fn classify(node: &'a Value) -> Self {
		let Some(obj) = node.as_object() else {
			return Self::Empty;
		};
		let children = children_of(node, "children");

		match obj.get("type").and_then(Value::as_str) {
			Some("paragraph") => Self::Paragraph { children },
			Some("heading") => Self::Heading { level: heading_level(node), children },
			Some("list") =>
				Self::List { ordered: flag(node, "ordered"), items: children_of(node, "items") },
			Some("ordered-list") => Self::List { ordered: true, items: children },
			Some("unordered-list") => Self::List { ordered: false, items: children },
			Some("blockquote") => Self::Blockquote { children },
			Some("code") => Self::CodeBlock {
				language: obj.get("language").and_then(Value::as_str).unwrap_or_default(),
				code: match obj.get("code").and_then(Value::as_str) {
					Some(code) => CodeSource::Inline(code),
					None => CodeSource::Children(children),
				},
			},
			_ => match obj.get("text").and_then(Value::as_str) {
				Some(text) if !text.is_empty() => Self::Text(Leaf {
					text,
					bold: flag(node, "bold"),
					italic: flag(node, "italic"),
					underline: flag(node, "underline"),
					code: flag(node, "code"),
					strikethrough: flag(node, "strikethrough"),
				}),
				_ if obj.contains_key("children") => Self::Container { children },
				_ => Self::Empty,
			},
		}
	}
}

#[derive(Clone, Copy, Debug)]
pub enum CodeSource<'a> {
	Inline(&'a str),
	/// The store keeps code block text as leaf children rather than a `code` field.
	Children(&'a [Value]),
}

#[derive(Clone, Copy, Debug)]
pub struct Leaf<'a> {
	pub text: &'a str,
	pub bold: bool,
	pub italic: bool,
	pub underline: bool,
	pub code: bool,
	pub strikethrough: bool,
}
impl Leaf<'_> {
	/// Wrappers apply in a fixed order, so bold ends up outermost of bold and italic.
	fn render(&self) -> String {
		let mut text = self.text.to_string();

		if self.bold {
			text = format!("**{text}**");
		}
		if self.italic {
			text = format!("*{text}*");
		}
		if self.underline {
			text = format!("<u>{text}</u>");
		}
		if self.code {
			text = format!("`{text}`");
		}
		if self.strikethrough {
			text = format!("~~{text}~~");
		}

		text
	}
}

/// Renders a whole document. Only an array of top-level nodes is a document; anything else
/// renders as the empty string.
pub fn render_document(document: &Value) -> String {
	let Some(nodes) = document.as_array() else {
		return String::new();
	};

	render_nodes(nodes).trim().to_string()
}

pub fn render_nodes(nodes: &[Value]) -> String {
	let mut out = String::new();

	for node in nodes {
		render_node(node, &mut out);
	}

	out
}

pub fn render_node(node: &Value, out: &mut String) {
	match Block::classify(node) {
		Block::Paragraph { children } => {
			push_children(children, out);
			out.push_str("\n\n");
		},
		Block::Heading { level, children } => {
			out.push_str("\n\n");
			out.push_str(&"#".repeat(level));
			out.push(' ');
			push_children(children, out);
			out.push_str("\n\n");
		},
		Block::List { ordered, items } => {
			out.push('\n');

			for (index, item) in items.iter().enumerate() {
				if index > 0 {
					out.push('\n');
				}
				if ordered {
					out.push_str(&format!("{}. ", index + 1));
				} else {
					out.push_str("- ");
				}

				push_children(children_of(item, "children"), out);
			}

			out.push_str("\n\n");
		},
		Block::Blockquote { children } => {
			out.push_str("\n\n> ");
			push_children(children, out);
			out.push_str("\n\n");
		},
		Block::CodeBlock { language, code } => {
			out.push_str("\n\n```");
			out.push_str(language);
			out.push('\n');

			match code {
				CodeSource::Inline(code) => out.push_str(code),
				CodeSource::Children(children) => {
					for child in children {
						if let Some(text) = child.get("text").and_then(Value::as_str) {
							out.push_str(text);
						}
					}
				},
			}

			out.push_str("\n```\n\n");
		},
		Block::Text(leaf) => out.push_str(&leaf.render()),
		Block::Container { children } => push_children(children, out),
		Block::Empty => {},
	}
}

fn push_children(children: &[Value], out: &mut String) {
	for child in children {
		render_node(child, out);
	}
}

fn children_of<'a>(node: &'a Value, key: &str) -> &'a [Value] {
	node.get(key).and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default()
}

fn flag(node: &Value, key: &str) -> bool {
	node.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn heading_level(node: &Value) -> usize {
	match node.get("level").and_then(Value::as_u64) {
		Some(level) if level > 0 => level.min(MAX_HEADING_LEVEL) as usize,
		_ => 1,
	}
}
