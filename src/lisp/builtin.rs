//! the seven operators from "The Roots of Lisp", plus `lambda`, `label`
//! and `defun`
//!
//! every operator gets its arguments unevaluated and decides itself what
//! to evaluate

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::strmap::MappedStr;
use crate::utils::range_to_dual;

use super::error::{LispError, LispErrorType, LispResult};
use super::eval::{eval, eval_args};
use super::expr::{LispBuiltin, LispExpr, LispExprValue, LispFn, LispLambda, LispList};
use super::scope::{LispEnv, LispRootScope, LispScopeRef, new_frame};
use super::span::LispSpan;

macro_rules! assert_arg_length {
	($this:expr, $name:expr, $args:expr, $range:expr) => {
		if !$range.contains(&$args.len()) {
			return Err(LispError(LispErrorType::ArgMismatch($name, range_to_dual($range), $args.len()), $this))
		}
	}
}

macro_rules! type_error {
	($this:expr, $name:expr, $($fmt:tt)*) => {
		Err(LispError(LispErrorType::TypeMismatch($name, format!($($fmt)*)), $this))
	}
}

macro_rules! scope_insert {
	($env:expr, $scope:expr, $name:expr, $func:expr) => {
		$scope.insert($env.map.add($name), LispExpr(LispExprValue::Fn(LispFn::Builtin(LispBuiltin {
			name: $name,
			func: $func,
		})), None))
	}
}

fn truth(env: &mut LispEnv, this: LispSpan) -> LispExpr {
	LispExpr::symbol(env.map.add("t"), this)
}

fn boolean(env: &mut LispEnv, this: LispSpan, v: bool) -> LispExpr {
	if v { truth(env, this) } else { LispExpr::nil() }
}

fn cond(_this: LispSpan, scope: &LispScopeRef, args: &[LispExpr], env: &mut LispEnv) -> LispResult<LispExpr> {
	for (i, arg) in args.iter().enumerate() {
		let clause = match arg.as_list() {
			Some(v) => v,
			None => return type_error!(arg.1.clone(), "cond", "argument #{} is not a list, got {}", i + 1, arg),
		};
		let mut parts = clause.iter();
		let pred = match parts.next() {
			Some(v) => v,
			None => return type_error!(arg.1.clone(), "cond", "clause #{} is missing a predicate", i + 1),
		};
		let value = match parts.next() {
			Some(v) => v,
			None => return type_error!(arg.1.clone(), "cond", "clause #{} is missing a return value", i + 1),
		};
		if parts.next().is_some() {
			return type_error!(arg.1.clone(), "cond", "clause #{} has {} elements, expected (predicate value)", i + 1, clause.len())
		}
		let res = eval(pred, scope, env)?;
		if res.as_symbol().map_or(false, |v| v.get_ref() == "t") {
			return eval(value, scope, env)
		}
	}
	Ok(LispExpr::nil())
}

fn lambda(this: LispSpan, scope: &LispScopeRef, args: &[LispExpr], _env: &mut LispEnv) -> LispResult<LispExpr> {
	assert_arg_length!(this, "lambda", args, 1..=2);
	let params = match args[0].as_list() {
		Some(v) => v,
		None => return type_error!(args[0].1.clone(), "lambda", "parameter list must be a list, got {}", args[0]),
	};
	let mut lambda_args = vec![];
	let mut seen = HashSet::new();
	for (i, param) in params.iter().enumerate() {
		let name = match param.as_symbol() {
			Some(v) => v,
			None => return type_error!(param.1.clone(), "lambda", "parameter #{} is not a symbol, got {}", i + 1, param),
		};
		if !seen.insert(name.clone()) {
			return type_error!(param.1.clone(), "lambda", "parameter #{} ({}) is already a parameter", i + 1, name)
		}
		lambda_args.push(name.clone());
	}
	Ok(LispExpr(LispExprValue::Fn(LispFn::Lambda(Arc::new(LispLambda {
		args: lambda_args,
		body: args.get(1).cloned(),
		scope: scope.clone(),
	}))), this))
}

fn function_name(op: &'static str, name: &LispExpr) -> LispResult<MappedStr> {
	match name.as_symbol() {
		Some(v) => Ok(v.clone()),
		None => type_error!(name.1.clone(), op, "1st argument (function name) must be a symbol, got {}", name),
	}
}

/// binds into the calling scope, so the function's own body can find the
/// name once it runs
fn bind(this: LispSpan, op: &'static str, scope: &LispScopeRef, name: MappedStr, func: LispExpr) -> LispResult<LispExpr> {
	log::debug!("{} {} = {}", op, name, func);
	let mut lock = scope.write().map_err(|_| LispError(LispErrorType::Internal, this.clone()))?;
	lock.set_var(name, func.clone()).map_err(|kind| LispError(kind, this))?;
	Ok(func)
}

fn label(this: LispSpan, scope: &LispScopeRef, args: &[LispExpr], env: &mut LispEnv) -> LispResult<LispExpr> {
	assert_arg_length!(this, "label", args, 2..=2);
	let name = function_name("label", &args[0])?;
	let func = eval(&args[1], scope, env)?;
	if !matches!(func.0, LispExprValue::Fn(_)) {
		return type_error!(args[1].1.clone(), "label", "2nd argument must evaluate to a function, got {}", func)
	}
	bind(this, "label", scope, name, func)
}

// (defun f (params…) body) is (label f (lambda (params…) body))
fn defun(this: LispSpan, scope: &LispScopeRef, args: &[LispExpr], env: &mut LispEnv) -> LispResult<LispExpr> {
	assert_arg_length!(this, "defun", args, 3..=3);
	let name = function_name("defun", &args[0])?;
	let func = lambda(this.clone(), scope, &args[1..], env)?;
	bind(this, "defun", scope, name, func)
}

/// the frozen scope holding every operator
pub fn default_scope(env: &mut LispEnv) -> LispScopeRef {
	let mut data = HashMap::new();
	scope_insert!(env, data, "quote", |this, _scope, args, _env| {
		assert_arg_length!(this, "quote", args, 1..=1);
		Ok(args[0].clone())
	});
	scope_insert!(env, data, "atom", |this, scope, args, env| {
		assert_arg_length!(this, "atom", args, 1..=1);
		let v = eval(&args[0], scope, env)?;
		Ok(boolean(env, this, v.is_atom()))
	});
	scope_insert!(env, data, "eq", |this, scope, args, env| {
		assert_arg_length!(this, "eq", args, 2..=2);
		let args = eval_args(args, scope, env)?;
		let same = match (&args[0].0, &args[1].0) {
			(LispExprValue::Symbol(a), LispExprValue::Symbol(b)) => a == b,
			_ => args[0].is_nil() && args[1].is_nil(),
		};
		Ok(boolean(env, this, same))
	});
	scope_insert!(env, data, "car", |this, scope, args, env| {
		assert_arg_length!(this, "car", args, 1..=1);
		let v = eval(&args[0], scope, env)?;
		match v.as_list() {
			Some(list) => Ok(list.first().cloned().unwrap_or_else(LispExpr::nil)),
			None => type_error!(this, "car", "argument must be a list, got {}", v),
		}
	});
	scope_insert!(env, data, "cdr", |this, scope, args, env| {
		assert_arg_length!(this, "cdr", args, 1..=1);
		let v = eval(&args[0], scope, env)?;
		match v.as_list() {
			Some(list) => Ok(LispExpr::list(list.rest(), None)),
			None => type_error!(this, "cdr", "argument must be a list, got {}", v),
		}
	});
	scope_insert!(env, data, "cons", |this, scope, args, env| {
		assert_arg_length!(this, "cons", args, 2..=2);
		let mut args = eval_args(args, scope, env)?;
		let rest = args.pop().unwrap_or_else(LispExpr::nil);
		let first = args.pop().unwrap_or_else(LispExpr::nil);
		match rest.as_list() {
			Some(list) => Ok(LispExpr::list(LispList::cons(first, list.clone()), None)),
			None => type_error!(this, "cons", "2nd argument must be a list, got {}", rest),
		}
	});
	scope_insert!(env, data, "cond", cond);
	// lambda and friends are here so there's a way to name things at all
	scope_insert!(env, data, "lambda", lambda);
	scope_insert!(env, data, "label", label);
	scope_insert!(env, data, "defun", defun);
	Arc::new(RwLock::new(LispRootScope { data }))
}

/// an empty, bindable frame on top of the operators
pub fn global_scope(env: &mut LispEnv) -> LispScopeRef {
	new_frame(&default_scope(env), HashMap::new())
}
