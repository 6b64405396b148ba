//! Command-line presentation shared by the Facilitai binaries.

use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects, Style},
};

/// `<crate version>-<git sha>-<target triple>`, stamped by the workspace build script.
pub const VERSION: &str = concat!(
	env!("CARGO_PKG_VERSION"),
	"-",
	env!("VERGEN_GIT_SHA"),
	"-",
	env!("VERGEN_CARGO_TARGET_TRIPLE"),
);

pub const ABOUT: &str = "Natural-language search over a database of facilitation processes.";

const ACCENT: Style = AnsiColor::Magenta.on_default().effects(Effects::BOLD);

pub fn styles() -> Styles {
	Styles::styled()
		.header(ACCENT.underline())
		.usage(ACCENT)
		.literal(AnsiColor::Blue.on_default().bold())
		.placeholder(AnsiColor::White.on_default().italic())
		.error(AnsiColor::Red.on_default().bold())
		.valid(AnsiColor::Green.on_default())
		.invalid(AnsiColor::Yellow.on_default().bold())
}
