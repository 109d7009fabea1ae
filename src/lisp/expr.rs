use std::fmt;
use std::sync::Arc;

use crate::strmap::MappedStr;

use super::error::LispResult;
use super::scope::{LispEnv, LispScopeRef};
use super::span::LispSpan;

/// native operation: call span, calling scope, unevaluated arguments
pub type LispBuiltinFn = fn(LispSpan, &LispScopeRef, &[LispExpr], &mut LispEnv) -> LispResult<LispExpr>;

#[derive(Clone)]
pub struct LispBuiltin {
	pub name: &'static str,
	pub func: LispBuiltinFn,
}

/// lambda data
pub struct LispLambda {
	pub args: Vec<MappedStr>,
	/// `None` always returns `()`
	pub body: Option<LispExpr>,
	/// where the lambda was made, not where it gets called
	pub scope: LispScopeRef,
}

// no scope here, it usually contains the lambda itself
impl fmt::Debug for LispLambda {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LispLambda").field("args", &self.args).field("body", &self.body).finish()
	}
}

#[derive(Clone)]
pub enum LispFn {
	Builtin(LispBuiltin),
	Lambda(Arc<LispLambda>),
}

impl fmt::Debug for LispFn {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			LispFn::Builtin(b) => f.debug_tuple("Builtin").field(&b.name).finish(),
			LispFn::Lambda(l) => f.debug_tuple("Lambda").field(l).finish(),
		}
	}
}

impl PartialEq for LispFn {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(LispFn::Builtin(a), LispFn::Builtin(b)) => a.name == b.name,
			(LispFn::Lambda(a), LispFn::Lambda(b)) => Arc::ptr_eq(a, b),
			_ => false,
		}
	}
}

/// a cons cell
#[derive(Debug)]
pub struct LispPair {
	pub first: LispExpr,
	pub second: LispList,
}

/// a chain of pairs, `None` being the empty list
#[derive(Clone, Default)]
pub struct LispList(Option<Arc<LispPair>>);

impl LispList {
	pub fn empty() -> Self {
		LispList(None)
	}
	pub fn cons(first: LispExpr, second: LispList) -> Self {
		LispList(Some(Arc::new(LispPair { first, second })))
	}
	pub fn from_vec(items: Vec<LispExpr>) -> Self {
		items.into_iter().rev().fold(LispList::empty(), |rest, item| LispList::cons(item, rest))
	}
	pub fn is_empty(&self) -> bool {
		self.0.is_none()
	}
	pub fn first(&self) -> Option<&LispExpr> {
		self.0.as_ref().map(|pair| &pair.first)
	}
	/// everything after the first element, `()` for short lists
	pub fn rest(&self) -> LispList {
		match &self.0 {
			Some(pair) => pair.second.clone(),
			None => LispList::empty(),
		}
	}
	pub fn iter(&self) -> LispListIter<'_> {
		LispListIter { next: self.0.as_deref() }
	}
	pub fn len(&self) -> usize {
		self.iter().count()
	}
	pub fn to_vec(&self) -> Vec<LispExpr> {
		self.iter().cloned().collect()
	}
}

// long lists would otherwise drop recursively, one stack frame per pair
impl Drop for LispList {
	fn drop(&mut self) {
		let mut next = self.0.take();
		while let Some(pair) = next {
			match Arc::try_unwrap(pair) {
				Ok(mut pair) => next = pair.second.0.take(),
				Err(_) => break,
			}
		}
	}
}

impl fmt::Debug for LispList {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.iter()).finish()
	}
}

impl PartialEq for LispList {
	fn eq(&self, other: &Self) -> bool {
		let mut a = self.iter();
		let mut b = other.iter();
		loop {
			match (a.next(), b.next()) {
				(None, None) => return true,
				(Some(x), Some(y)) if x == y => {},
				_ => return false,
			}
		}
	}
}

pub struct LispListIter<'a> {
	next: Option<&'a LispPair>,
}

impl<'a> Iterator for LispListIter<'a> {
	type Item = &'a LispExpr;
	fn next(&mut self) -> Option<&'a LispExpr> {
		let pair = self.next?;
		self.next = pair.second.0.as_deref();
		Some(&pair.first)
	}
}

/// a value inside an expression
#[derive(Clone, Debug, PartialEq)]
pub enum LispExprValue {
	Symbol(MappedStr),
	List(LispList),
	Fn(LispFn),
}

/// an expression, equality ignores where it came from
#[derive(Clone)]
pub struct LispExpr(pub LispExprValue, pub LispSpan);

impl LispExpr {
	pub fn symbol(name: MappedStr, span: LispSpan) -> Self {
		LispExpr(LispExprValue::Symbol(name), span)
	}
	pub fn list(list: LispList, span: LispSpan) -> Self {
		LispExpr(LispExprValue::List(list), span)
	}
	pub fn nil() -> Self {
		LispExpr(LispExprValue::List(LispList::empty()), None)
	}
	pub fn is_nil(&self) -> bool {
		matches!(&self.0, LispExprValue::List(list) if list.is_empty())
	}
	/// symbols and the empty list
	pub fn is_atom(&self) -> bool {
		matches!(&self.0, LispExprValue::Symbol(_)) || self.is_nil()
	}
	pub fn as_symbol(&self) -> Option<&MappedStr> {
		match &self.0 {
			LispExprValue::Symbol(name) => Some(name),
			_ => None,
		}
	}
	pub fn as_list(&self) -> Option<&LispList> {
		match &self.0 {
			LispExprValue::List(list) => Some(list),
			_ => None,
		}
	}
}

impl PartialEq for LispExpr {
	fn eq(&self, other: &Self) -> bool {
		self.0 == other.0
	}
}

impl fmt::Display for LispExpr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.0 {
			LispExprValue::Symbol(v) => write!(f, "{}", v),
			LispExprValue::List(v) => {
				f.write_str("(")?;
				for (i, item) in v.iter().enumerate() {
					if i > 0 {
						f.write_str(" ")?;
					}
					write!(f, "{}", item)?;
				}
				f.write_str(")")
			},
			LispExprValue::Fn(LispFn::Builtin(b)) => write!(f, "<builtin {}>", b.name),
			LispExprValue::Fn(LispFn::Lambda(data)) => write!(f, "<lambda ({})>", data.args.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ")),
		}
	}
}

impl fmt::Debug for LispExpr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("LispExpr").field(&self.0).finish()
	}
}

#[cfg(test)]
mod tests {
	use crate::strmap::StrMap;

	use super::{LispExpr, LispList};

	fn sym(map: &mut StrMap, name: &str) -> LispExpr {
		LispExpr::symbol(map.add(name), None)
	}

	#[test]
	fn list_operations() {
		let mut map = StrMap::new();
		let list = LispList::from_vec(vec![sym(&mut map, "a"), sym(&mut map, "b"), sym(&mut map, "c")]);
		assert_eq!(list.len(), 3);
		assert_eq!(list.first().unwrap().to_string(), "a");
		assert_eq!(LispExpr::list(list.rest(), None).to_string(), "(b c)");
		assert_eq!(list.rest().rest().rest().len(), 0);
		assert!(LispList::empty().rest().is_empty());
		assert!(LispList::empty().first().is_none());
		let consed = LispList::cons(sym(&mut map, "z"), list.clone());
		assert_eq!(LispExpr::list(consed, None).to_string(), "(z a b c)");
		// consing shares the tail
		assert_eq!(list.len(), 3);
	}

	#[test]
	fn render_nested() {
		let mut map = StrMap::new();
		let inner = LispExpr::list(LispList::from_vec(vec![sym(&mut map, "b"), LispExpr::nil()]), None);
		let outer = LispExpr::list(LispList::from_vec(vec![sym(&mut map, "a"), inner]), None);
		assert_eq!(outer.to_string(), "(a (b ()))");
		assert_eq!(LispExpr::nil().to_string(), "()");
	}

	#[test]
	fn atoms_and_equality() {
		let mut map = StrMap::new();
		assert!(sym(&mut map, "x").is_atom());
		assert!(LispExpr::nil().is_atom());
		let list = LispExpr::list(LispList::from_vec(vec![sym(&mut map, "x")]), None);
		assert!(!list.is_atom());
		assert_eq!(sym(&mut map, "x"), sym(&mut map, "x"));
		assert_ne!(sym(&mut map, "x"), list);
		assert_eq!(list.clone(), list);
	}

	#[test]
	fn long_list_drops() {
		let mut map = StrMap::new();
		let x = sym(&mut map, "x");
		let mut list = LispList::empty();
		for _ in 0..200_000 {
			list = LispList::cons(x.clone(), list);
		}
		assert_eq!(list.len(), 200_000);
		drop(list);
	}
}
