//! Ordered parameter collections and value bindings over them.

use std::collections::HashMap;
use std::sync::Arc;

use crate::datum::Datum;
use crate::error::{Error, Result};
use crate::parameter::{ParamId, Parameter};

/// An ordered, name-unique collection of parameters.
///
/// A context fixes the declaration order of its parameters, and that order
/// is the index every value vector in the crate is correlated with. Lookup
/// is by position, by name, or by parameter identity.
#[derive(Clone, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "ContextDef", try_from = "ContextDef")
)]
pub struct Context {
    name: Arc<str>,
    parameters: Vec<Parameter>,
    by_id: HashMap<ParamId, usize>,
    by_name: HashMap<Arc<str>, usize>,
}

/// Serialized shape of a [`Context`]; the lookup maps are rebuilt (and
/// revalidated) on the way back in.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct ContextDef {
    name: Arc<str>,
    parameters: Vec<Parameter>,
}

#[cfg(feature = "serde")]
impl From<Context> for ContextDef {
    fn from(ctx: Context) -> Self {
        Self {
            name: ctx.name,
            parameters: ctx.parameters,
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<ContextDef> for Context {
    type Error = Error;

    fn try_from(def: ContextDef) -> Result<Self> {
        Context::new(&def.name, def.parameters)
    }
}

impl Context {
    /// Creates a context from parameters in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] on a duplicate parameter name or a
    /// parameter appearing twice.
    pub fn new(name: impl AsRef<str>, parameters: Vec<Parameter>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(parameters.len());
        let mut by_name = HashMap::with_capacity(parameters.len());
        for (i, p) in parameters.iter().enumerate() {
            if by_id.insert(p.id(), i).is_some() {
                return Err(Error::InvalidValue {
                    reason: format!("parameter '{}' appears twice", p.name()),
                });
            }
            if by_name.insert(p.name_arc(), i).is_some() {
                return Err(Error::InvalidValue {
                    reason: format!("duplicate parameter name '{}'", p.name()),
                });
            }
        }
        Ok(Self {
            name: Arc::from(name.as_ref()),
            parameters,
            by_id,
            by_name,
        })
    }

    /// Returns the context's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Returns `true` if the context holds no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Returns the parameters in declaration order.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Returns the parameter at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `index >= len()`.
    pub fn parameter(&self, index: usize) -> Result<&Parameter> {
        self.parameters.get(index).ok_or(Error::OutOfBounds {
            index,
            len: self.parameters.len(),
        })
    }

    /// Looks a parameter up by name.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&Parameter> {
        self.by_name.get(name).map(|&i| &self.parameters[i])
    }

    /// Returns the declaration index of `param`, or `None` if `param` is
    /// not a member (name equality is not enough; identity is what counts).
    #[must_use]
    pub fn index_of(&self, param: &Parameter) -> Option<usize> {
        self.by_id.get(&param.id()).copied()
    }

    /// Returns the declaration index of the parameter with identity `id`.
    #[must_use]
    pub fn index_of_id(&self, id: ParamId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }
}

impl core::fmt::Display for Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, p) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", p.name())?;
        }
        write!(f, ")")
    }
}

/// A value vector correlated with a [`Context`]'s declaration order.
///
/// Configurations, features, and evaluations all bind values this way; the
/// trait gives them uniform positional and by-name access.
pub trait Binding {
    /// The context the values are correlated with.
    fn context(&self) -> &Context;

    /// The bound values, one per context parameter, in declaration order.
    fn values(&self) -> &[Datum];

    /// Returns the value at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `index` exceeds the context size.
    fn value(&self, index: usize) -> Result<&Datum> {
        self.values().get(index).ok_or(Error::OutOfBounds {
            index,
            len: self.values().len(),
        })
    }

    /// Returns the value bound to the parameter named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if no parameter has that name.
    fn value_by_name(&self, name: &str) -> Result<&Datum> {
        let param = self
            .context()
            .get_by_name(name)
            .ok_or_else(|| Error::InvalidValue {
                reason: format!(
                    "no parameter named '{name}' in context '{}'",
                    self.context().name()
                ),
            })?;
        let idx = self.context().index_of(param).unwrap_or(usize::MAX);
        self.value(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> Vec<Parameter> {
        vec![
            Parameter::int("a", 0, 10).unwrap(),
            Parameter::float("b", 0.0, 1.0).unwrap(),
        ]
    }

    #[test]
    fn test_lookup_by_name_and_index() {
        let ctx = Context::new("params", params()).unwrap();
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.parameter(1).unwrap().name(), "b");
        assert!(matches!(ctx.parameter(2), Err(Error::OutOfBounds { .. })));
        let a = ctx.get_by_name("a").unwrap().clone();
        assert_eq!(ctx.index_of(&a), Some(0));
        assert!(ctx.get_by_name("c").is_none());
    }

    #[test]
    fn test_identity_not_name_equality() {
        let ctx = Context::new("params", params()).unwrap();
        let stranger = Parameter::int("a", 0, 10).unwrap();
        assert_eq!(ctx.index_of(&stranger), None);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let dup = vec![
            Parameter::int("a", 0, 10).unwrap(),
            Parameter::float("a", 0.0, 1.0).unwrap(),
        ];
        assert!(Context::new("params", dup).is_err());

        let p = Parameter::int("a", 0, 10).unwrap();
        assert!(Context::new("params", vec![p.clone(), p]).is_err());
    }

    #[test]
    fn test_display() {
        let ctx = Context::new("params", params()).unwrap();
        assert_eq!(ctx.to_string(), "params(a, b)");
    }
}
