use std::ops::{Bound, RangeBounds};

/// inclusive (min, max) argument count, `None` meaning unbounded
pub type Dual = (Option<usize>, Option<usize>);

pub fn range_to_dual(r: impl RangeBounds<usize>) -> Dual {
	let start = match r.start_bound() {
		Bound::Included(start) => Some(*start),
		Bound::Excluded(start) => Some(start + 1),
		Bound::Unbounded => None,
	};
	let end = match r.end_bound() {
		Bound::Included(end) => Some(*end),
		Bound::Excluded(end) => Some(end.saturating_sub(1)),
		Bound::Unbounded => None,
	};
	(start, end)
}

fn plural(n: usize) -> &'static str {
	if n == 1 {""} else {"s"}
}

pub fn format_arg_range(dual: Dual) -> String {
	match dual {
		(Some(start), Some(end)) => if start == end {
			format!("{} argument{}", start, plural(start))
		} else {
			format!("{} to {} arguments", start, end)
		},
		(Some(start), None) => format!("at least {} argument{}", start, plural(start)),
		(None, Some(end)) => format!("at most {} argument{}", end, plural(end)),
		(None, None) => "any number of arguments".to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::{format_arg_range, range_to_dual};

	#[test]
	fn arg_ranges() {
		assert_eq!(format_arg_range(range_to_dual(1..=1)), "1 argument");
		assert_eq!(format_arg_range(range_to_dual(2..=2)), "2 arguments");
		assert_eq!(format_arg_range(range_to_dual(1..=2)), "1 to 2 arguments");
		assert_eq!(format_arg_range(range_to_dual(1..3)), "1 to 2 arguments");
		assert_eq!(format_arg_range(range_to_dual(1..)), "at least 1 argument");
		assert_eq!(format_arg_range(range_to_dual(..=3)), "at most 3 arguments");
		assert_eq!(format_arg_range(range_to_dual(..)), "any number of arguments");
	}
}
