pub mod lisp;
pub mod strmap;
pub mod utils;
