use std::{error, fmt};

use crate::utils::{Dual, format_arg_range};

use super::span::LispSpan;

#[derive(Debug, Clone, PartialEq)]
pub enum LispErrorType {
	// scanning
	UnexpectedChar(char),

	// reading
	/// line and column of the `(` that never got closed
	UnclosedList(usize, usize),
	UnexpectedCloseParen,
	QuoteWithoutArgument,

	// evaluation
	NotDefined(String),
	/// operator, expected, got
	ArgMismatch(&'static str, Dual, usize),
	/// same, for closures, named the way they were called
	FnArgMismatch(String, Dual, usize),
	/// operator, what was wrong
	TypeMismatch(&'static str, String),
	InvalidCall(String),
	AlreadyBound(String),
	/// binding into the builtin operators
	FrozenScope(String),
	RecursionLimit(usize),
	Internal,
}

impl LispErrorType {
	/// errors the interactive loop can't keep going after
	pub fn is_fatal(&self) -> bool {
		matches!(self, LispErrorType::RecursionLimit(_) | LispErrorType::Internal)
	}
}

impl fmt::Display for LispErrorType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			LispErrorType::UnexpectedChar(ch) => write!(f, "unexpected character {}", ch),
			LispErrorType::UnclosedList(line, col) => write!(f, "unexpected end of input: list opened at {}:{} was not closed", line, col),
			LispErrorType::UnexpectedCloseParen => f.write_str("unexpected token ), can't close a list without first opening it"),
			LispErrorType::QuoteWithoutArgument => f.write_str("quote needs an argument"),
			LispErrorType::NotDefined(name) => write!(f, "unbound symbol {}", name),
			LispErrorType::ArgMismatch(op, dual, got) => write!(f, "{}: expected {}, got {}", op, format_arg_range(*dual), got),
			LispErrorType::FnArgMismatch(name, dual, got) => write!(f, "{}: expected {}, got {}", name, format_arg_range(*dual), got),
			LispErrorType::TypeMismatch(op, text) => write!(f, "{}: {}", op, text),
			LispErrorType::InvalidCall(value) => write!(f, "can not call {} as a function", value),
			LispErrorType::AlreadyBound(name) => write!(f, "{} is already bound in this scope", name),
			LispErrorType::FrozenScope(name) => write!(f, "can't bind {} in the builtin scope", name),
			LispErrorType::RecursionLimit(depth) => write!(f, "recursion limit of {} exceeded", depth),
			LispErrorType::Internal => f.write_str("internal error"),
		}
	}
}

#[derive(Debug, Clone)]
pub struct LispError(pub LispErrorType, pub LispSpan);

impl fmt::Display for LispError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.1 {
			Some(span) => write!(f, "{} at {}:{}", self.0, span.line, span.col),
			None => write!(f, "{}", self.0),
		}
	}
}

impl LispError {
	pub fn kind(&self) -> &LispErrorType {
		&self.0
	}
	/// the source excerpt, if the error points somewhere
	pub fn print(&self) -> String {
		match &self.1 {
			Some(v) => v.excerpt().unwrap_or_default(),
			None => String::new(),
		}
	}
}

impl error::Error for LispError {}
pub type LispResult<T> = Result<T, LispError>;

#[cfg(test)]
mod tests {
	use crate::strmap::StrMap;
	use crate::lisp::span::LispInSpan;

	use super::{LispError, LispErrorType};

	#[test]
	fn display_appends_position() {
		let mut map = StrMap::new();
		let span = LispInSpan {
			index: 3, line: 1, col: 4, len: 1,
			name: map.add("test"),
			source: map.add("(a ?)"),
		};
		let err = LispError(LispErrorType::UnexpectedChar('?'), Some(span));
		assert_eq!(err.to_string(), "unexpected character ? at 1:4");
		assert!(err.print().contains("test:1:4"));

		let err = LispError(LispErrorType::ArgMismatch("eq", (Some(2), Some(2)), 1), None);
		assert_eq!(err.to_string(), "eq: expected 2 arguments, got 1");
		assert_eq!(err.print(), "");
	}

	#[test]
	fn binding_and_closure_messages() {
		let err = LispErrorType::FnArgMismatch("id".to_string(), (Some(1), Some(1)), 0);
		assert_eq!(err.to_string(), "id: expected 1 argument, got 0");
		assert_eq!(LispErrorType::FrozenScope("f".to_string()).to_string(), "can't bind f in the builtin scope");
		assert!(!LispErrorType::FrozenScope("f".to_string()).is_fatal());
	}

	#[test]
	fn fatal_kinds() {
		assert!(LispErrorType::RecursionLimit(10).is_fatal());
		assert!(!LispErrorType::NotDefined("x".to_string()).is_fatal());
	}
}
