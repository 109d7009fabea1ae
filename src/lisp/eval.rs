use std::collections::HashMap;

use crate::strmap::MappedStr;

use super::error::{LispError, LispErrorType, LispResult};
use super::expr::{LispExpr, LispExprValue, LispFn, LispLambda};
use super::scope::{LispEnv, LispScopeRef, new_frame, resolve};
use super::span::LispSpan;

fn lookup_var(exp: &LispExpr, name: &MappedStr, scope: &LispScopeRef) -> LispResult<LispExpr> {
	match resolve(scope, name) {
		Ok(Some(v)) => Ok(v),
		Ok(None) => Err(LispError(LispErrorType::NotDefined(name.to_string()), exp.1.clone())),
		Err(kind) => Err(LispError(kind, exp.1.clone())),
	}
}

/// arguments are evaluated in the caller's scope, the body in a fresh frame
/// on top of the lambda's own scope
///
/// `name` is what the call site used, for arity errors
fn call_lambda(span: LispSpan, name: &str, f: &LispLambda, scope: &LispScopeRef, args: &[LispExpr], env: &mut LispEnv) -> LispResult<LispExpr> {
	// no body, no arguments looked at
	let body = match &f.body {
		Some(body) => body,
		None => return Ok(LispExpr::nil()),
	};
	if args.len() != f.args.len() {
		let expected = (Some(f.args.len()), Some(f.args.len()));
		return Err(LispError(LispErrorType::FnArgMismatch(name.to_string(), expected, args.len()), span))
	}
	let mut data = HashMap::with_capacity(args.len());
	for (k, v) in f.args.iter().zip(args) {
		data.insert(k.clone(), eval(v, scope, env)?);
	}
	log::debug!("call {} with {:?}", name, data);
	let frame = new_frame(&f.scope, data);
	eval(body, &frame, env)
}

fn eval_inner(exp: &LispExpr, scope: &LispScopeRef, env: &mut LispEnv) -> LispResult<LispExpr> {
	match &exp.0 {
		LispExprValue::Symbol(v) => lookup_var(exp, v, scope),
		LispExprValue::List(list) => {
			let first = match list.first() {
				Some(v) => v,
				None => return Ok(exp.clone()),
			};
			let args = list.rest().to_vec();
			let res = eval(first, scope, env)?;
			match &res.0 {
				LispExprValue::Fn(LispFn::Builtin(b)) => (b.func)(exp.1.clone(), scope, &args, env),
				LispExprValue::Fn(LispFn::Lambda(f)) => {
					let name = first.as_symbol().map_or("lambda", |v| v.get_ref());
					call_lambda(exp.1.clone(), name, f, scope, &args, env)
				},
				_ => Err(LispError(LispErrorType::InvalidCall(res.to_string()), exp.1.clone())),
			}
		},
		LispExprValue::Fn(_) => Ok(exp.clone()),
	}
}

// no tail calls, deep recursion ends at env.max_depth
pub fn eval(exp: &LispExpr, scope: &LispScopeRef, env: &mut LispEnv) -> LispResult<LispExpr> {
	if env.depth >= env.max_depth {
		return Err(LispError(LispErrorType::RecursionLimit(env.max_depth), exp.1.clone()))
	}
	env.depth += 1;
	log::debug!("eval {} {}", env.depth, exp);
	let res = eval_inner(exp, scope, env);
	env.depth -= 1;
	log::debug!("eval result: {:?}", res);
	res
}

pub fn eval_args(args: &[LispExpr], scope: &LispScopeRef, env: &mut LispEnv) -> LispResult<Vec<LispExpr>> {
	let mut res = Vec::with_capacity(args.len());
	for x in args {
		res.push(eval(x, scope, env)?);
	}
	Ok(res)
}
