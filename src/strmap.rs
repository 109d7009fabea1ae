//! string interning map
//!
//! symbol names and source texts all go through here so that every `car`
//! in a program shares one allocation

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

#[derive(Clone, Hash, PartialEq, Eq)]
pub struct MappedStr(Arc<String>);

impl MappedStr {
	pub fn get_ref(&self) -> &str {
		&self.0
	}
	/// same allocation, not just the same text
	pub fn ptr_eq(&self, other: &MappedStr) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for MappedStr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:?}", self.0)
	}
}

impl fmt::Display for MappedStr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

#[derive(Default)]
pub struct StrMap {
	data: HashMap<String, Weak<String>>,
}

impl fmt::Debug for StrMap {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut tuple = f.debug_tuple("StrMap");
		for k in self.data.keys() {
			tuple.field(k);
		}
		tuple.finish()
	}
}

impl StrMap {
	pub fn new() -> Self {
		Self {
			data: HashMap::new(),
		}
	}
	pub fn add<T: Into<String>>(&mut self, v: T) -> MappedStr {
		let v = v.into();
		match self.data.get(&v).and_then(|r| r.upgrade()) {
			Some(r) => MappedStr(r),
			None => {
				let res = Arc::new(v.clone());
				self.data.insert(v, Arc::downgrade(&res));
				MappedStr(res)
			},
		}
	}
	pub fn len(&self) -> usize {
		self.data.len()
	}
	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}
	pub fn gc(&mut self) {
		let before = self.data.len();
		self.data.retain(|_, v| v.strong_count() > 0);
		log::debug!("StrMap gc() removed {} string(s)", before - self.data.len());
	}
}
