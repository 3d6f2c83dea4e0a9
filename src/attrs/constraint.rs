use std::fmt;
use std::sync::Arc;

use super::value::{AttrKind, AttrValue};

type CheckFn = dyn Fn(&AttrValue) -> Result<(), String> + Send + Sync;

/// Predicate a non-`None` attribute value must satisfy.
#[derive(Clone)]
pub struct Constraint {
    description: String,
    check: Arc<CheckFn>,
}

impl Constraint {
    /// Accepts every value.
    pub fn any() -> Self {
        Self::custom("any", |_| Ok(()))
    }

    pub fn custom<F>(description: impl Into<String>, check: F) -> Self
    where
        F: Fn(&AttrValue) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            check: Arc::new(check),
        }
    }

    /// Inclusive integer range.
    pub fn int_range(min: i64, max: i64) -> Self {
        Self::custom(format!("integer in [{}, {}]", min, max), move |v| match v.as_i64() {
            Some(i) if i < min => Err(format!("must be at least {}, got {}", min, i)),
            Some(i) if i > max => Err(format!("must be at most {}, got {}", max, i)),
            Some(_) => Ok(()),
            None => Err("expected an integer".to_string()),
        })
    }

    /// Inclusive float range.
    pub fn float_range(min: f64, max: f64) -> Self {
        Self::custom(format!("number in [{}, {}]", min, max), move |v| match v.as_f64() {
            Some(f) if f.is_nan() => Err("must not be NaN".to_string()),
            Some(f) if f < min || f > max => {
                Err(format!("must be within [{}, {}], got {}", min, max, f))
            }
            Some(_) => Ok(()),
            None => Err("expected a number".to_string()),
        })
    }

    /// Rejects empty strings and empty sequences.
    pub fn non_empty() -> Self {
        Self::custom("non-empty", |v| {
            if v.is_empty() {
                Err("must not be empty".to_string())
            } else {
                Ok(())
            }
        })
    }

    /// String value (or every element of a string sequence) from a fixed set.
    pub fn one_of<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: Vec<String> = allowed.into_iter().map(Into::into).collect();
        let description = format!("one of [{}]", allowed.join(", "));
        Self::custom(description, move |v| {
            let candidates: Vec<&str> = match v {
                AttrValue::String(s) => vec![s.as_str()],
                AttrValue::StringArray(items) => items.iter().map(String::as_str).collect(),
                _ => return Err("expected a string".to_string()),
            };
            match candidates.iter().find(|c| !allowed.iter().any(|a| a == *c)) {
                Some(bad) => Err(format!("'{}' is not one of [{}]", bad, allowed.join(", "))),
                None => Ok(()),
            }
        })
    }

    /// Value must already be of `kind`; no coercion is attempted.
    pub fn kind(kind: AttrKind) -> Self {
        Self::custom(format!("of kind {}", kind), move |v| match v.kind() {
            Some(k) if k == kind => Ok(()),
            Some(k) => Err(format!("expected {}, got {}", kind, k)),
            None => Ok(()),
        })
    }

    pub fn check(&self, value: &AttrValue) -> Result<(), String> {
        (self.check)(value)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Both constraints must hold.
    pub fn and(self, other: Constraint) -> Self {
        let description = format!("{} and {}", self.description, other.description);
        Self::custom(description, move |v| {
            self.check(v)?;
            other.check(v)
        })
    }
}

impl Default for Constraint {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Constraint").field(&self.description).finish()
    }
}
