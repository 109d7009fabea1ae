mod span;
mod error;
mod expr;
mod parse;
mod scope;
mod eval;
mod builtin;

pub use span::{LispInSpan, LispSpan};
pub use error::{LispError, LispErrorType, LispResult};
pub use expr::{LispBuiltin, LispExpr, LispExprValue, LispFn, LispLambda, LispList};
pub use parse::{LispToken, LispTokenValue, parse_all, read, tokenize};
pub use scope::{LispEnv, LispFrame, LispRootScope, LispScope, LispScopeRef, new_frame, resolve};
pub use eval::{eval, eval_args};
pub use builtin::{default_scope, global_scope};

use crate::strmap::MappedStr;

/// the startup script built into the binary
pub const CORE: &str = include_str!("core.lisp");

/// an interpreter session: one global frame over the builtin operators
pub struct LispRuntime {
	pub scope: LispScopeRef,
	pub env: LispEnv,
}

impl LispRuntime {
	pub fn new(max_depth: usize) -> Self {
		let mut env = LispEnv::new(max_depth);
		let scope = global_scope(&mut env);
		Self { scope, env }
	}

	/// runs a startup script, stopping at the first error
	pub fn load(&mut self, name: &str, text: &str) -> LispResult<()> {
		let exprs = read(&mut self.env, name, text)?;
		for expr in &exprs {
			eval(expr, &self.scope, &mut self.env)?;
		}
		log::info!("loaded {} ({} forms)", name, exprs.len());
		Ok(())
	}

	/// nothing gets evaluated if `text` doesn't read, otherwise every form
	/// is evaluated and gets its own result
	pub fn evaluate(&mut self, name: &str, text: &str) -> LispResult<Vec<LispResult<LispExpr>>> {
		let exprs = read(&mut self.env, name, text)?;
		let res = exprs.iter().map(|expr| {
			self.env.depth = 0;
			eval(expr, &self.scope, &mut self.env)
		}).collect();
		drop(exprs);
		self.env.map.gc();
		Ok(res)
	}

	/// what `label` and `defun` have bound at the top level
	pub fn bindings(&self) -> LispResult<Vec<(MappedStr, LispExpr)>> {
		let lock = self.scope.read().map_err(|_| LispError(LispErrorType::Internal, None))?;
		Ok(lock.bindings())
	}
}

#[cfg(test)]
mod tests {
	use std::thread;

	use super::{CORE, LispErrorType, LispRuntime};

	fn render(rt: &mut LispRuntime, text: &str) -> Vec<Result<String, LispErrorType>> {
		rt.evaluate("test", text).unwrap().into_iter()
			.map(|v| v.map(|v| v.to_string()).map_err(|e| e.0))
			.collect()
	}

	fn one(rt: &mut LispRuntime, text: &str) -> String {
		let mut res = render(rt, text);
		assert_eq!(res.len(), 1, "{}", text);
		match res.remove(0) {
			Ok(v) => v,
			Err(e) => panic!("{} failed: {}", text, e),
		}
	}

	// the metacircular evaluator nests deep, more than the default test
	// thread stack likes
	fn with_core<F: FnOnce(&mut LispRuntime) + Send + 'static>(f: F) {
		thread::Builder::new()
			.stack_size(64 * 1024 * 1024)
			.spawn(move || {
				let mut rt = LispRuntime::new(10_000);
				rt.load("core.lisp", CORE).unwrap();
				f(&mut rt);
			})
			.unwrap()
			.join()
			.unwrap();
	}

	#[test]
	fn each_form_gets_a_result() {
		let mut rt = LispRuntime::new(1000);
		let res = render(&mut rt, "'a (car 'b) 'c");
		assert_eq!(res, vec![
			Ok("a".to_string()),
			Err(LispErrorType::TypeMismatch("car", "argument must be a list, got b".to_string())),
			Ok("c".to_string()),
		]);
	}

	#[test]
	fn read_errors_evaluate_nothing() {
		let mut rt = LispRuntime::new(1000);
		let err = rt.evaluate("test", "(defun f (x) x) (car").unwrap_err();
		assert_eq!(err.0, LispErrorType::UnclosedList(1, 17));
		assert!(rt.bindings().unwrap().is_empty());
	}

	#[test]
	fn bindings_persist_between_calls() {
		let mut rt = LispRuntime::new(1000);
		one(&mut rt, "(defun second (l) (car (cdr l)))");
		one(&mut rt, "(label head car)");
		assert_eq!(one(&mut rt, "(second '(a b c))"), "b");
		let names: Vec<_> = rt.bindings().unwrap().into_iter()
			.map(|(k, v)| format!("{} {}", k, v))
			.collect();
		assert_eq!(names, vec!["head <builtin car>", "second <lambda (l)>"]);
	}

	#[test]
	fn interning_is_collected() {
		let mut rt = LispRuntime::new(1000);
		one(&mut rt, "'(some throwaway symbols)");
		let before = rt.env.map.len();
		one(&mut rt, "'(more throwaway symbols)");
		assert_eq!(rt.env.map.len(), before);
	}

	#[test]
	fn recursion_limit_is_fatal_and_recoverable() {
		let mut rt = LispRuntime::new(300);
		one(&mut rt, "(defun forever (x) (forever x))");
		let res = render(&mut rt, "(forever 'a) 'after");
		assert_eq!(res[0], Err(LispErrorType::RecursionLimit(300)));
		assert!(LispErrorType::RecursionLimit(300).is_fatal());
		assert_eq!(res[1], Ok("after".to_string()));
	}

	#[test]
	fn load_stops_at_first_error() {
		let mut rt = LispRuntime::new(1000);
		let err = rt.load("broken.lisp", "(defun a (x) x)\n(car 'x)\n(defun b (x) x)").unwrap_err();
		assert_eq!(err.to_string(), "car: argument must be a list, got x at 2:1");
		let names: Vec<_> = rt.bindings().unwrap().into_iter().map(|(k, _)| k.to_string()).collect();
		assert_eq!(names, vec!["a"]);
	}

	#[test]
	fn core_helpers() {
		with_core(|rt| {
			assert_eq!(one(rt, "(null. 'a)"), "()");
			assert_eq!(one(rt, "(null. '())"), "t");
			assert_eq!(one(rt, "(and. (atom 'a) (eq 'a 'a))"), "t");
			assert_eq!(one(rt, "(and. (atom 'a) (eq 'a 'b))"), "()");
			assert_eq!(one(rt, "(not. (eq 'a 'a))"), "()");
			assert_eq!(one(rt, "(not. (eq 'a 'b))"), "t");
			assert_eq!(one(rt, "(append. '(a b) '(c d))"), "(a b c d)");
			assert_eq!(one(rt, "(append. '() '(c d))"), "(c d)");
			assert_eq!(one(rt, "(pair. '(x y z) '(a b c))"), "((x a) (y b) (z c))");
			assert_eq!(one(rt, "(assoc. 'x '((x a) (y b)))"), "a");
			assert_eq!(one(rt, "(assoc. 'x '((x new) (x a) (y b)))"), "new");
			assert_eq!(one(rt, "(cadr '((a b) (c d) e))"), "(c d)");
			assert_eq!(one(rt, "(caddr '((a b) (c d) e))"), "e");
			assert_eq!(one(rt, "(cdar '((a b) (c d) e))"), "(b)");
			assert_eq!(one(rt, "(subst 'm 'b '(a b (a b c) d))"), "(a m (a m c) d)");
		});
	}

	#[test]
	fn core_can_not_be_loaded_twice() {
		with_core(|rt| {
			let err = rt.load("core.lisp", CORE).unwrap_err();
			assert_eq!(err.0, LispErrorType::AlreadyBound("null.".to_string()));
		});
	}

	#[test]
	fn metacircular_eval() {
		with_core(|rt| {
			assert_eq!(one(rt, "(eval. 'x '((x a) (y b)))"), "a");
			assert_eq!(one(rt, "(eval. '(eq 'a 'a) '())"), "t");
			assert_eq!(one(rt, "(eval. '(cons x '(b c)) '((x a) (y b)))"), "(a b c)");
			assert_eq!(one(rt, "(eval. '(cond ((atom x) 'atom) ('t 'list)) '((x (a b))))"), "list");
			assert_eq!(one(rt, "(eval. '(f '(b c)) '((f (lambda (x) (cons 'a x)))))"), "(a b c)");
			assert_eq!(one(rt, "(eval. '((lambda (x y) (cons x (cdr y))) 'a '(b c d)) '())"), "(a c d)");
			assert_eq!(
				one(rt, "(eval. '((label firstatom (lambda (x) (cond ((atom x) x) ('t (firstatom (car x)))))) y) '((y ((a b) (c d)))))"),
				"a",
			);
		});
	}
}
