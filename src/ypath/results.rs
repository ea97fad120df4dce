//! How combinators merge the results of their children.
//!
//! Every combinator kind maps to one [`MergePolicy`]. The policies are
//! generic over the node handle and the child evaluation function so they
//! can be exercised without a document.

use super::ast::ExprKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// multi: every child sees the same input, results are concatenated
    Union,
    /// chain: each child's output is the next child's input
    Chain,
    /// logical-or: the first non-empty child result
    FirstNonEmpty,
    /// logical-and: empty if any child is empty, else the last child's result
    AllOrNothing,
}

impl MergePolicy {
    /// The policy of a combinator kind, `None` for leaves.
    pub fn for_kind(kind: ExprKind) -> Option<MergePolicy> {
        match kind {
            ExprKind::Multi => Some(MergePolicy::Union),
            ExprKind::Chain => Some(MergePolicy::Chain),
            ExprKind::LogicalOr => Some(MergePolicy::FirstNonEmpty),
            ExprKind::LogicalAnd => Some(MergePolicy::AllOrNothing),
            _ => None,
        }
    }

    /// Evaluates `children` against `input` with `eval` and merges their
    /// results.
    ///
    /// Children are evaluated left to right. Evaluation stops early once the
    /// outcome is known: at the first non-empty result for
    /// [`FirstNonEmpty`](MergePolicy::FirstNonEmpty), at the first empty one
    /// for [`AllOrNothing`](MergePolicy::AllOrNothing) and
    /// [`Chain`](MergePolicy::Chain). Duplicates are kept.
    ///
    /// # Example
    ///
    /// ```
    /// use ypath::ypath::results::MergePolicy;
    ///
    /// let eval = |child: &u32, input: Vec<u32>| -> Result<Vec<u32>, ()> {
    ///     Ok(input.iter().map(|n| n * child).collect())
    /// };
    /// let union = MergePolicy::Union.combine(&[2, 3], vec![1, 10], eval);
    /// assert_eq!(union, Ok(vec![2, 20, 3, 30]));
    ///
    /// let chain = MergePolicy::Chain.combine(&[2, 3], vec![1, 10], eval);
    /// assert_eq!(chain, Ok(vec![6, 60]));
    /// ```
    pub fn combine<C, T, E, F>(self, children: &[C], input: Vec<T>, mut eval: F) -> Result<Vec<T>, E>
    where
        T: Clone,
        F: FnMut(&C, Vec<T>) -> Result<Vec<T>, E>,
    {
        match self {
            MergePolicy::Union => {
                let mut out = Vec::new();
                for child in children {
                    out.extend(eval(child, input.clone())?);
                }
                Ok(out)
            }
            MergePolicy::Chain => {
                let mut current = input;
                for child in children {
                    if current.is_empty() {
                        break;
                    }
                    current = eval(child, current)?;
                }
                Ok(current)
            }
            MergePolicy::FirstNonEmpty => {
                for child in children {
                    let result = eval(child, input.clone())?;
                    if !result.is_empty() {
                        return Ok(result);
                    }
                }
                Ok(Vec::new())
            }
            MergePolicy::AllOrNothing => {
                let mut last = Vec::new();
                for child in children {
                    last = eval(child, input.clone())?;
                    if last.is_empty() {
                        return Ok(Vec::new());
                    }
                }
                Ok(last)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Children are canned result lists; the input is ignored.
    fn canned(results: &[Vec<u32>]) -> Vec<Vec<u32>> {
        results.to_vec()
    }

    fn run(policy: MergePolicy, children: &[Vec<u32>], calls: &RefCell<usize>) -> Vec<u32> {
        policy
            .combine(children, vec![0], |child, _| -> Result<Vec<u32>, ()> {
                *calls.borrow_mut() += 1;
                Ok(child.clone())
            })
            .unwrap()
    }

    #[test]
    fn test_union_keeps_duplicates_in_child_order() {
        let calls = RefCell::new(0);
        let children = canned(&[vec![1, 2], vec![], vec![2, 1]]);
        assert_eq!(run(MergePolicy::Union, &children, &calls), vec![1, 2, 2, 1]);
        assert_eq!(*calls.borrow(), 3);
    }

    #[test]
    fn test_first_non_empty_short_circuits() {
        let calls = RefCell::new(0);
        let children = canned(&[vec![], vec![7], vec![8]]);
        assert_eq!(run(MergePolicy::FirstNonEmpty, &children, &calls), vec![7]);
        assert_eq!(*calls.borrow(), 2);

        let none = canned(&[vec![], vec![]]);
        assert!(run(MergePolicy::FirstNonEmpty, &none, &calls).is_empty());
    }

    #[test]
    fn test_all_or_nothing() {
        let calls = RefCell::new(0);
        let all = canned(&[vec![1], vec![2, 3]]);
        assert_eq!(run(MergePolicy::AllOrNothing, &all, &calls), vec![2, 3]);

        *calls.borrow_mut() = 0;
        let broken = canned(&[vec![], vec![2]]);
        assert!(run(MergePolicy::AllOrNothing, &broken, &calls).is_empty());
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_chain_stops_on_empty() {
        let calls = RefCell::new(0);
        let children = canned(&[vec![], vec![5]]);
        assert!(run(MergePolicy::Chain, &children, &calls).is_empty());
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_errors_propagate() {
        let result: Result<Vec<u32>, &str> =
            MergePolicy::Union.combine(&[1u32, 2], vec![0], |child, input| {
                if *child == 2 {
                    Err("boom")
                } else {
                    Ok(input)
                }
            });
        assert_eq!(result, Err("boom"));
    }

    #[test]
    fn test_policy_for_kind() {
        assert_eq!(MergePolicy::for_kind(ExprKind::Multi), Some(MergePolicy::Union));
        assert_eq!(MergePolicy::for_kind(ExprKind::LogicalAnd), Some(MergePolicy::AllOrNothing));
        assert_eq!(MergePolicy::for_kind(ExprKind::MapKey), None);
    }
}
