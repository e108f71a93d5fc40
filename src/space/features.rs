//! Contextual feature vectors for feature-aware tuning.
//!
//! A [`FeaturesSpace`] is a plain parameter context with no conditions and
//! no forbidden clauses; [`Features`] bind one in-domain value per feature
//! parameter. Evaluations may carry features, and tuners use them to slice
//! history and optima per deployment context.

use std::sync::Arc;

use crate::datum::Datum;
use crate::error::{Error, Result};
use crate::expr::VariableLookup;
use crate::parameter::Parameter;
use crate::space::context::{Binding, Context};

/// A space of contextual features.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeaturesSpace {
    context: Arc<Context>,
}

impl FeaturesSpace {
    /// Creates a features space over `parameters`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] on duplicate parameter names.
    pub fn new(name: impl AsRef<str>, parameters: Vec<Parameter>) -> Result<Self> {
        Ok(Self {
            context: Arc::new(Context::new(name, parameters)?),
        })
    }

    /// Returns the feature context.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Returns the space's name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.context.name()
    }

    /// Returns the number of feature parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.context.len()
    }

    /// Returns `true` if the space has no feature parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.context.is_empty()
    }

    /// Validates a feature vector: one in-domain, non-inactive value per
    /// parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFeatures`] naming the first violation.
    pub fn check_values(&self, values: &[Datum]) -> Result<()> {
        if values.len() != self.context.len() {
            return Err(Error::InvalidFeatures {
                reason: format!(
                    "expected {} values, got {}",
                    self.context.len(),
                    values.len()
                ),
            });
        }
        for (param, value) in self.context.parameters().iter().zip(values) {
            if !param.check_value(value) {
                return Err(Error::InvalidFeatures {
                    reason: format!("{value} is not in the domain of '{}'", param.name()),
                });
            }
        }
        Ok(())
    }

    /// Returns the default feature vector.
    pub fn default_features(self: &Arc<Self>) -> Features {
        let values = self
            .context
            .parameters()
            .iter()
            .map(Parameter::default_value)
            .collect();
        Features {
            space: Arc::clone(self),
            values,
        }
    }
}

/// One value per feature parameter of a [`FeaturesSpace`].
#[derive(Clone, Debug)]
pub struct Features {
    space: Arc<FeaturesSpace>,
    values: Vec<Datum>,
}

impl Features {
    /// Builds a feature vector, validating it against `space`.
    ///
    /// # Errors
    ///
    /// Same as [`FeaturesSpace::check_values`].
    pub fn new(space: Arc<FeaturesSpace>, values: Vec<Datum>) -> Result<Self> {
        space.check_values(&values)?;
        Ok(Self { space, values })
    }

    /// Returns the space these features belong to.
    #[must_use]
    pub fn space(&self) -> &Arc<FeaturesSpace> {
        &self.space
    }
}

impl Binding for Features {
    fn context(&self) -> &Context {
        self.space.context()
    }

    fn values(&self) -> &[Datum] {
        &self.values
    }
}

impl VariableLookup for Features {
    fn value_of(&self, param: &Parameter) -> Option<Datum> {
        let idx = self.space.context().index_of(param)?;
        self.values.get(idx).cloned()
    }
}

impl PartialEq for Features {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.space, &other.space)
            && self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a.eq_value(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space() -> Arc<FeaturesSpace> {
        Arc::new(
            FeaturesSpace::new(
                "features",
                vec![
                    Parameter::categorical(
                        "region",
                        vec![Datum::from("eu"), Datum::from("us")],
                        0,
                    )
                    .unwrap(),
                    Parameter::int("cores", 1, 65).unwrap(),
                ],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_valid_features() {
        let s = space();
        let f = Features::new(Arc::clone(&s), vec![Datum::from("us"), Datum::Int(8)]).unwrap();
        assert_eq!(f.value_by_name("cores").unwrap(), &Datum::Int(8));
    }

    #[test]
    fn test_invalid_features_rejected() {
        let s = space();
        assert!(Features::new(Arc::clone(&s), vec![Datum::from("asia"), Datum::Int(8)]).is_err());
        assert!(Features::new(Arc::clone(&s), vec![Datum::from("us")]).is_err());
        assert!(Features::new(Arc::clone(&s), vec![Datum::from("us"), Datum::Inactive]).is_err());
    }

    #[test]
    fn test_equality_is_value_wise_within_space() {
        let s = space();
        let a = Features::new(Arc::clone(&s), vec![Datum::from("eu"), Datum::Int(4)]).unwrap();
        let b = Features::new(Arc::clone(&s), vec![Datum::from("eu"), Datum::Int(4)]).unwrap();
        let c = Features::new(Arc::clone(&s), vec![Datum::from("us"), Datum::Int(4)]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        let other = space();
        let d = Features::new(other, vec![Datum::from("eu"), Datum::Int(4)]).unwrap();
        assert_ne!(a, d);
    }

    #[test]
    fn test_default_features() {
        let s = space();
        let f = s.default_features();
        assert_eq!(f.values(), &[Datum::from("eu"), Datum::Int(1)]);
    }
}
