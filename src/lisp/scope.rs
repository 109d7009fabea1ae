use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::strmap::{MappedStr, StrMap};

use super::error::LispErrorType;
use super::expr::LispExpr;

pub type LispScopeRef = Arc<RwLock<dyn LispScope>>;

pub struct LispEnv {
	pub map: StrMap,
	/// current eval nesting
	pub depth: usize,
	pub max_depth: usize,
}

impl LispEnv {
	pub fn new(max_depth: usize) -> Self {
		Self {
			map: StrMap::new(),
			depth: 0,
			max_depth,
		}
	}
}

/// one frame of bindings
///
/// names are bound once and never overwritten, shadowing only happens
/// by nesting a new frame
pub trait LispScope: Sync + Send + fmt::Debug {
	fn get_var(&self, name: &MappedStr) -> Option<&LispExpr>;
	fn set_var(&mut self, name: MappedStr, value: LispExpr) -> Result<(), LispErrorType>;
	fn get_parent(&self) -> Option<&LispScopeRef>;
	fn bindings(&self) -> Vec<(MappedStr, LispExpr)>;
}

fn sorted_bindings(data: &HashMap<MappedStr, LispExpr>) -> Vec<(MappedStr, LispExpr)> {
	let mut res: Vec<_> = data.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
	res.sort_by(|a, b| a.0.get_ref().cmp(b.0.get_ref()));
	res
}

/// the built-in operators, frozen once made
pub struct LispRootScope {
	pub data: HashMap<MappedStr, LispExpr>,
}

impl fmt::Debug for LispRootScope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.data.keys()).finish()
	}
}

impl LispScope for LispRootScope {
	fn get_var(&self, name: &MappedStr) -> Option<&LispExpr> {
		self.data.get(name)
	}
	fn set_var(&mut self, name: MappedStr, _value: LispExpr) -> Result<(), LispErrorType> {
		Err(LispErrorType::FrozenScope(name.to_string()))
	}
	fn get_parent(&self) -> Option<&LispScopeRef> {
		None
	}
	fn bindings(&self) -> Vec<(MappedStr, LispExpr)> {
		sorted_bindings(&self.data)
	}
}

pub struct LispFrame {
	pub data: HashMap<MappedStr, LispExpr>,
	pub parent: LispScopeRef,
}

impl fmt::Debug for LispFrame {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LispFrame").field("names", &self.data.keys().collect::<Vec<_>>()).finish()
	}
}

impl LispScope for LispFrame {
	fn get_var(&self, name: &MappedStr) -> Option<&LispExpr> {
		self.data.get(name)
	}
	fn set_var(&mut self, name: MappedStr, value: LispExpr) -> Result<(), LispErrorType> {
		if self.data.contains_key(&name) {
			return Err(LispErrorType::AlreadyBound(name.to_string()))
		}
		self.data.insert(name, value);
		Ok(())
	}
	fn get_parent(&self) -> Option<&LispScopeRef> {
		Some(&self.parent)
	}
	fn bindings(&self) -> Vec<(MappedStr, LispExpr)> {
		sorted_bindings(&self.data)
	}
}

/// a frame nested in `parent`, with all of its bindings already in place
pub fn new_frame(parent: &LispScopeRef, data: HashMap<MappedStr, LispExpr>) -> LispScopeRef {
	Arc::new(RwLock::new(LispFrame { data, parent: parent.clone() }))
}

/// walks outwards from `scope`, `None` if nothing binds `name`
///
/// `Err` only when a lock got poisoned
pub fn resolve(scope: &LispScopeRef, name: &MappedStr) -> Result<Option<LispExpr>, LispErrorType> {
	let mut current = scope.clone();
	loop {
		let parent = {
			let lock = current.read().map_err(|_| LispErrorType::Internal)?;
			if let Some(v) = lock.get_var(name) {
				return Ok(Some(v.clone()))
			}
			match lock.get_parent() {
				Some(parent) => parent.clone(),
				None => return Ok(None),
			}
		};
		current = parent;
	}
}
