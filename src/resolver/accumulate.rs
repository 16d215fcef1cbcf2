//! Accumulate-then-report resolution
//!
//! A stage resolves every token it is given before deciding whether to
//! fail, so one error names every bad token of the same kind.

use indexmap::IndexSet;

/// Tokens split into those that resolved and those that did not
#[derive(Debug)]
pub struct Resolution<T> {
    pub resolved: Vec<T>,
    /// Rejected tokens, deduplicated, in first-seen order
    pub rejected: Vec<String>,
}

/// Resolve every token, keeping the rejects instead of stopping at the first
pub fn resolve_each<S, T, I, F>(tokens: I, mut resolve: F) -> Resolution<T>
where
    S: AsRef<str>,
    I: IntoIterator<Item = S>,
    F: FnMut(&str) -> Option<T>,
{
    let mut resolved = Vec::new();
    let mut rejected = IndexSet::new();
    for token in tokens {
        let token = token.as_ref();
        match resolve(token) {
            Some(value) => resolved.push(value),
            None => {
                rejected.insert(token.to_string());
            }
        }
    }
    Resolution {
        resolved,
        rejected: rejected.into_iter().collect(),
    }
}

/// Collect the names that fail a check, `Ok` when none do
pub fn reject_unless<S, I, F>(names: I, mut accept: F) -> Result<(), Vec<String>>
where
    S: AsRef<str>,
    I: IntoIterator<Item = S>,
    F: FnMut(&str) -> bool,
{
    let rejected = resolve_each(names, |name| accept(name).then_some(())).rejected;
    if rejected.is_empty() {
        Ok(())
    } else {
        Err(rejected)
    }
}

impl<T> Resolution<T> {
    /// The resolved values, or one error naming every rejected token
    pub fn into_result<E>(self, error: impl FnOnce(Vec<String>) -> E) -> Result<Vec<T>, E> {
        if self.rejected.is_empty() {
            Ok(self.resolved)
        } else {
            Err(error(self.rejected))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_every_reject() {
        let known = ["a", "b"];
        let resolution = resolve_each(["a", "x", "b", "y", "x"], |t| known.contains(&t).then(|| t.len()));
        assert_eq!(resolution.resolved, vec![1, 1]);
        assert_eq!(resolution.rejected, vec!["x", "y"]);
        assert_eq!(resolution.into_result(|bad| bad), Err(vec!["x".to_string(), "y".to_string()]));
    }

    #[test]
    fn test_no_rejects_is_ok() {
        let resolution = resolve_each(vec!["a".to_string()], |t| Some(t.to_uppercase()));
        assert_eq!(resolution.into_result(|_: Vec<String>| ()), Ok(vec!["A".to_string()]));
        assert_eq!(reject_unless(["a", "b"], |n| n != "b"), Err(vec!["b".to_string()]));
    }
}
