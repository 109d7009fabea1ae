use crate::strmap::MappedStr;

use super::error::{LispError, LispErrorType, LispResult};
use super::expr::{LispExpr, LispList};
use super::scope::LispEnv;
use super::span::{LispInSpan, merge_span};

#[derive(Debug, Clone, PartialEq)]
pub enum LispTokenValue {
	Atom(MappedStr),
	Paren(bool), // true: (  false: )
	Quote,
}

#[derive(Debug, Clone)]
pub struct LispToken(pub LispTokenValue, pub LispInSpan);

enum CharType {
	Whitespace,
	Paren(bool),
	Quote,   // '
	Comment, // ;
	Other(char),
}

fn char_type(c: char) -> CharType {
	match c {
		'(' => CharType::Paren(true),
		')' => CharType::Paren(false),
		'\'' => CharType::Quote,
		';' => CharType::Comment,
		c if c.is_whitespace() => CharType::Whitespace,
		c => CharType::Other(c),
	}
}

pub fn tokenize(env: &mut LispEnv, file_name: MappedStr, data: MappedStr) -> LispResult<Vec<LispToken>> {
	let mut line = 1;
	let mut col = 1;
	let mut iter = data.get_ref().chars().enumerate().map(|(i, v)| {
		let res = (LispInSpan {
			index: i, line, col, len: 1,
			name: file_name.clone(),
			source: data.clone(),
		}, v);
		match v {
			'\n' => { col = 1; line += 1; },
			_ => { col += 1; }
		}
		res
	}).peekable();
	let mut out = vec![];
	while let Some((span, ch)) = iter.next() {
		match char_type(ch) {
			CharType::Whitespace => {},
			CharType::Paren(v) => out.push(LispToken(LispTokenValue::Paren(v), span)),
			CharType::Quote => out.push(LispToken(LispTokenValue::Quote, span)),
			CharType::Comment => {
				// discard until eol or eof
				for (_, ch) in iter.by_ref() {
					if ch == '\n' { break }
				}
			},
			CharType::Other(ch) if ch.is_alphanumeric() => {
				// consume until it's not other
				let mut res = String::from(ch);
				let mut len = 1;
				while let Some((_, next)) = iter.peek() {
					match char_type(*next) {
						CharType::Other(next) => res.push(next),
						_ => break,
					}
					len += 1;
					iter.next();
				}
				out.push(LispToken(LispTokenValue::Atom(env.map.add(res)), span.with_len(len)));
			},
			CharType::Other(ch) => return Err(LispError(LispErrorType::UnexpectedChar(ch), Some(span))),
		}
	}
	log::trace!("tokenize {}: {} token(s)", file_name, out.len());
	Ok(out)
}

pub fn parse_all(tokens: &[LispToken], env: &mut LispEnv) -> LispResult<Vec<LispExpr>> {
	let mut out = vec![];
	let mut rest = tokens;
	while let Some((token, after)) = rest.split_first() {
		let (expr, new_rest) = parse(token, after, env, 0)?;
		out.push(expr);
		rest = new_rest;
	}
	Ok(out)
}

/// tokenize and parse in one go
pub fn read(env: &mut LispEnv, file_name: &str, text: &str) -> LispResult<Vec<LispExpr>> {
	let file_name = env.map.add(file_name);
	let text = env.map.add(text);
	let tokens = tokenize(env, file_name, text)?;
	parse_all(&tokens, env)
}

// lists and quotes nest, `depth` counts how deep against env.max_depth
fn parse<'a>(token: &'a LispToken, rest: &'a [LispToken], env: &mut LispEnv, depth: usize) -> LispResult<(LispExpr, &'a [LispToken])> {
	match &token.0 {
		LispTokenValue::Atom(name) => Ok((LispExpr::symbol(name.clone(), Some(token.1.clone())), rest)),
		_ if depth >= env.max_depth => {
			Err(LispError(LispErrorType::RecursionLimit(env.max_depth), Some(token.1.clone())))
		},
		LispTokenValue::Paren(true) => read_seq(&token.1, rest, env, depth),
		LispTokenValue::Paren(false) => Err(LispError(LispErrorType::UnexpectedCloseParen, Some(token.1.clone()))),
		LispTokenValue::Quote => match rest.split_first() {
			None | Some((LispToken(LispTokenValue::Paren(false), _), _)) => {
				Err(LispError(LispErrorType::QuoteWithoutArgument, Some(token.1.clone())))
			},
			Some((next, after)) => {
				let (quoted, rest) = parse(next, after, env, depth + 1)?;
				// 'x => (quote x), positioned at the '
				let quote = LispExpr::symbol(env.map.add("quote"), Some(token.1.clone()));
				let span = merge_span(Some(token.1.clone()), quoted.1.clone());
				Ok((LispExpr::list(LispList::from_vec(vec![quote, quoted]), span), rest))
			},
		},
	}
}

fn read_seq<'a>(start: &LispInSpan, tokens: &'a [LispToken], env: &mut LispEnv, depth: usize) -> LispResult<(LispExpr, &'a [LispToken])> {
	let mut res = vec![];
	let mut xs = tokens;
	loop {
		let (token, rest) = xs.split_first()
			.ok_or_else(|| LispError(LispErrorType::UnclosedList(start.line, start.col), None))?;
		match token.0 {
			LispTokenValue::Paren(false) => {
				let span = merge_span(Some(start.clone()), Some(token.1.clone()));
				return Ok((LispExpr::list(LispList::from_vec(res), span), rest))
			},
			_ => {
				let (exp, new_xs) = parse(token, rest, env, depth + 1)?;
				res.push(exp);
				xs = new_xs;
			}
		}
	}
}
