use std::fmt::{self, Write};

use crate::strmap::MappedStr;

/// where something came from in the source text
#[derive(Debug, Clone)]
pub struct LispInSpan {
	/// char index into `source`
	pub index: usize,
	pub line: usize,
	pub col: usize,
	/// length in chars
	pub len: usize,
	pub name: MappedStr,
	pub source: MappedStr,
}

impl LispInSpan {
	pub fn with_len(&self, len: usize) -> Self {
		LispInSpan { len, ..self.clone() }
	}
	/// source excerpt with the span underlined, clipped to the span's first line
	pub fn excerpt(&self) -> Result<String, fmt::Error> {
		let mut out = String::new();
		let text = self.source.get_ref().lines().nth(self.line - 1).unwrap_or("");
		let width = text.chars().count();
		let start = (self.col - 1).min(width);
		let len = self.len.max(1).min(width.saturating_sub(start).max(1));
		writeln!(out, "       ╭─[ {}:{}:{} ]", self.name, self.line, self.col)?;
		writeln!(out, "       │")?;
		writeln!(out, "{:>6} │ {}", self.line, text)?;
		write!(out, "       │ {}{}", " ".repeat(start), "~".repeat(len))?;
		Ok(out)
	}
}

pub fn merge_span(start: LispSpan, end: LispSpan) -> LispSpan {
	match (start, end) {
		(Some(a), Some(b)) => {
			let len = b.index + b.len - a.index;
			Some(a.with_len(len))
		},
		(Some(a), None) => Some(a),
		(None, b) => b,
	}
}

pub type LispSpan = Option<LispInSpan>;
