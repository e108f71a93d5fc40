//! Parameter kinds and their domains.
//!
//! A [`Parameter`] is a named, typed dimension of a search space. The five
//! kinds are closed variants of [`ParameterKind`]: numerical ranges,
//! categorical and ordinal finite sets, discrete numeric sets, and
//! free-form strings.
//!
//! Parameters carry identity: each one is assigned a unique [`ParamId`] at
//! creation, and clones share it. Two handles compare and hash equal exactly
//! when they refer to the same logical parameter, which is what contexts and
//! expressions key on.
//!
//! # Example
//!
//! ```
//! use confspace::parameter::Parameter;
//!
//! let x = Parameter::float("x", 0.0, 1.0).unwrap();
//! let mut rng = fastrand::Rng::with_seed(42);
//! let dist = x.default_distribution().unwrap();
//! let v = x.sample(&dist, &mut rng).unwrap();
//! assert!(x.check_value(&v));
//! ```

use core::cmp::Ordering;
use core::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use crate::datum::Datum;
use crate::distribution::{Distribution, RouletteDistribution, Scale, UniformDistribution};
use crate::error::{Error, Result};
use crate::interval::{Interval, Numeric, NumericType};

static NEXT_PARAM_ID: AtomicU64 = AtomicU64::new(0);

/// Retry budget for rejection sampling and forbidden-clause resampling.
///
/// A loop that cannot produce an acceptable draw within this many attempts
/// fails with [`Error::SamplingUnsuccessful`] instead of spinning.
pub const MAX_SAMPLING_ATTEMPTS: usize = 100;

/// A unique identifier for a parameter instance.
///
/// Each parameter is assigned a unique `ParamId` at creation time. Cloning
/// a parameter copies its `ParamId`, so clones refer to the same logical
/// parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParamId(u64);

impl ParamId {
    /// Creates a new unique `ParamId`.
    pub fn new() -> Self {
        Self(NEXT_PARAM_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

impl Default for ParamId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ParamId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "param_{}", self.0)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ParamId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

// Deserialization keeps the stored id so references inside one serialized
// graph stay attached, and advances the global counter past it so later
// fresh parameters cannot collide.
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ParamId {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> core::result::Result<Self, D::Error> {
        let v = u64::deserialize(deserializer)?;
        NEXT_PARAM_ID.fetch_max(v + 1, AtomicOrdering::Relaxed);
        Ok(ParamId(v))
    }
}

/// The domain variants a parameter can have.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParameterKind {
    /// A numeric range `[lower, upper)`, optionally on a quantization grid.
    Numerical {
        /// The half-open domain.
        domain: Interval,
        /// Optional grid step anchored at the lower bound.
        quantization: Option<Numeric>,
    },
    /// A finite unordered set of values; equality comparison only.
    Categorical {
        /// The admissible values.
        values: Vec<Datum>,
        /// Index of the default value.
        default_index: usize,
    },
    /// Like categorical, but construction order defines a strict total order.
    Ordinal {
        /// The admissible values, in order.
        values: Vec<Datum>,
        /// Index of the default value.
        default_index: usize,
    },
    /// A finite set of numeric values sampled as a whole (not a range).
    Discrete {
        /// The admissible values.
        values: Vec<Numeric>,
        /// Index of the default value.
        default_index: usize,
    },
    /// Free-form strings; no bounded domain and no sampling.
    Str,
}

/// A named, typed dimension of a search space.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Parameter {
    id: ParamId,
    name: Arc<str>,
    kind: ParameterKind,
    default: Datum,
}

impl PartialEq for Parameter {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Parameter {}

impl core::hash::Hash for Parameter {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Validates a finite value set and its default index.
fn check_value_set(values: &[Datum], default_index: usize) -> Result<()> {
    if values.is_empty() {
        return Err(Error::InvalidValue {
            reason: "parameter requires at least one value".to_string(),
        });
    }
    if default_index >= values.len() {
        return Err(Error::OutOfBounds {
            index: default_index,
            len: values.len(),
        });
    }
    for (i, v) in values.iter().enumerate() {
        if v.is_inactive() {
            return Err(Error::InvalidValue {
                reason: "inactive cannot be a parameter value".to_string(),
            });
        }
        if values[..i].iter().any(|w| w.eq_value(v)) {
            return Err(Error::InvalidValue {
                reason: format!("duplicate parameter value {v}"),
            });
        }
    }
    Ok(())
}

impl Parameter {
    /// Creates a numerical parameter over `domain` with an explicit default.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain is empty, the quantization has the
    /// wrong type or is not positive, or the default is not in-domain.
    pub fn numerical(
        name: impl AsRef<str>,
        domain: Interval,
        quantization: Option<Numeric>,
        default: Numeric,
    ) -> Result<Self> {
        if domain.is_empty() {
            return Err(Error::InvalidBounds {
                lower: domain.lower().as_f64(),
                upper: domain.upper().as_f64(),
            });
        }
        if let Some(q) = quantization {
            if q.numeric_type() != domain.numeric_type() || q.as_f64() <= 0.0 {
                return Err(Error::InvalidValue {
                    reason: "quantization must be positive and match the domain type".to_string(),
                });
            }
        }
        if default.numeric_type() != domain.numeric_type() || !domain.contains(default) {
            return Err(Error::InvalidValue {
                reason: format!("default {default} is outside the domain {domain}"),
            });
        }
        Ok(Self {
            id: ParamId::new(),
            name: Arc::from(name.as_ref()),
            kind: ParameterKind::Numerical {
                domain,
                quantization,
            },
            default: default.into(),
        })
    }

    /// Creates a float parameter over `[lower, upper)` defaulting to `lower`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBounds`] if `lower >= upper`.
    pub fn float(name: impl AsRef<str>, lower: f64, upper: f64) -> Result<Self> {
        Self::numerical(
            name,
            Interval::float(lower, upper),
            None,
            Numeric::Float(lower),
        )
    }

    /// Creates an integer parameter over `[lower, upper)` defaulting to `lower`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBounds`] if `lower >= upper`.
    pub fn int(name: impl AsRef<str>, lower: i64, upper: i64) -> Result<Self> {
        Self::numerical(name, Interval::int(lower, upper), None, Numeric::Int(lower))
    }

    /// Creates a categorical parameter.
    ///
    /// # Errors
    ///
    /// Returns an error on an empty or duplicated value set, an out-of-range
    /// default index, or an inactive value.
    pub fn categorical(
        name: impl AsRef<str>,
        values: Vec<Datum>,
        default_index: usize,
    ) -> Result<Self> {
        check_value_set(&values, default_index)?;
        let default = values[default_index].clone();
        Ok(Self {
            id: ParamId::new(),
            name: Arc::from(name.as_ref()),
            kind: ParameterKind::Categorical {
                values,
                default_index,
            },
            default,
        })
    }

    /// Creates an ordinal parameter; the value order is the construction
    /// order and defines [`compare_values`](Self::compare_values).
    ///
    /// # Errors
    ///
    /// Same as [`categorical`](Self::categorical).
    pub fn ordinal(
        name: impl AsRef<str>,
        values: Vec<Datum>,
        default_index: usize,
    ) -> Result<Self> {
        check_value_set(&values, default_index)?;
        let default = values[default_index].clone();
        Ok(Self {
            id: ParamId::new(),
            name: Arc::from(name.as_ref()),
            kind: ParameterKind::Ordinal {
                values,
                default_index,
            },
            default,
        })
    }

    /// Creates a discrete parameter over a finite set of numeric values.
    ///
    /// # Errors
    ///
    /// Returns an error on an empty or duplicated value set or an
    /// out-of-range default index.
    pub fn discrete(
        name: impl AsRef<str>,
        values: Vec<Numeric>,
        default_index: usize,
    ) -> Result<Self> {
        let as_datums: Vec<Datum> = values.iter().map(|&v| v.into()).collect();
        check_value_set(&as_datums, default_index)?;
        let default = as_datums[default_index].clone();
        Ok(Self {
            id: ParamId::new(),
            name: Arc::from(name.as_ref()),
            kind: ParameterKind::Discrete {
                values,
                default_index,
            },
            default,
        })
    }

    /// Creates a string parameter with an empty default.
    #[must_use]
    pub fn string(name: impl AsRef<str>) -> Self {
        Self {
            id: ParamId::new(),
            name: Arc::from(name.as_ref()),
            kind: ParameterKind::Str,
            default: Datum::from(""),
        }
    }

    /// Returns this parameter's identity.
    #[must_use]
    pub fn id(&self) -> ParamId {
        self.id
    }

    /// Returns this parameter's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// Returns this parameter's domain variant.
    #[must_use]
    pub fn kind(&self) -> &ParameterKind {
        &self.kind
    }

    /// Returns this parameter's default value.
    #[must_use]
    pub fn default_value(&self) -> Datum {
        self.default.clone()
    }

    /// Returns the distribution used when no override is supplied:
    /// uniform over the domain for numerical parameters, a uniform
    /// roulette over the value set for the finite kinds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] for string parameters, which have no
    /// natural distribution.
    pub fn default_distribution(&self) -> Result<Distribution> {
        match &self.kind {
            ParameterKind::Numerical {
                domain,
                quantization,
            } => Ok(UniformDistribution::new(
                domain.lower(),
                domain.upper(),
                Scale::Linear,
                *quantization,
            )?
            .into()),
            ParameterKind::Categorical { values, .. } | ParameterKind::Ordinal { values, .. } => {
                Ok(RouletteDistribution::uniform(values.len())?.into())
            }
            ParameterKind::Discrete { values, .. } => {
                Ok(RouletteDistribution::uniform(values.len())?.into())
            }
            ParameterKind::Str => Err(Error::Unsupported {
                reason: "string parameters have no distribution",
            }),
        }
    }

    /// Returns `true` if `value` belongs to this parameter's domain.
    ///
    /// [`Datum::Inactive`] never belongs to a domain; activation is the
    /// configuration space's concern, not the parameter's.
    #[must_use]
    pub fn check_value(&self, value: &Datum) -> bool {
        match &self.kind {
            ParameterKind::Numerical {
                domain,
                quantization,
            } => {
                let Some(n) = value.as_numeric() else {
                    return false;
                };
                if n.numeric_type() != domain.numeric_type() || !domain.contains(n) {
                    return false;
                }
                match quantization {
                    Some(Numeric::Int(q)) => {
                        let (Numeric::Int(v), Numeric::Int(lo)) = (n, domain.lower()) else {
                            return false;
                        };
                        (v - lo) % q == 0
                    }
                    Some(Numeric::Float(q)) => {
                        let offset = (n.as_f64() - domain.lower().as_f64()) / q;
                        (offset - offset.round()).abs() < 1e-9
                    }
                    None => true,
                }
            }
            ParameterKind::Categorical { values, .. } | ParameterKind::Ordinal { values, .. } => {
                values.iter().any(|v| v.eq_value(value))
            }
            ParameterKind::Discrete { values, .. } => match value.as_numeric() {
                Some(n) => values
                    .iter()
                    .any(|v| v.compare(&n) == Some(Ordering::Equal)),
                None => false,
            },
            ParameterKind::Str => matches!(value, Datum::Str(_)),
        }
    }

    /// Draws one in-domain value from `distribution`.
    ///
    /// For numerical parameters the draw is accepted directly when the
    /// distribution's support lies inside the domain; otherwise rejection
    /// sampling runs for at most [`MAX_SAMPLING_ATTEMPTS`] attempts. Finite
    /// kinds interpret the draw as an index into their value set.
    ///
    /// # Errors
    ///
    /// - [`Error::Unsupported`] for string parameters.
    /// - [`Error::InvalidDistribution`] when the support cannot reach the
    ///   domain at all (no overlap, wrong shape, or an out-of-range index).
    /// - [`Error::SamplingUnsuccessful`] when rejection sampling exhausts
    ///   its attempt budget.
    pub fn sample(&self, distribution: &Distribution, rng: &mut fastrand::Rng) -> Result<Datum> {
        if distribution.dimension() != 1 {
            return Err(Error::InvalidDistribution {
                reason: "parameter sampling requires a one-dimensional distribution".to_string(),
            });
        }
        match &self.kind {
            ParameterKind::Str => Err(Error::Unsupported {
                reason: "string parameters cannot be sampled",
            }),
            ParameterKind::Numerical { domain, .. } => {
                let support = &distribution.bounds()[0];
                if support.numeric_type() != domain.numeric_type() {
                    return Err(Error::InvalidDistribution {
                        reason: format!(
                            "distribution support {support} does not match the domain type"
                        ),
                    });
                }
                if support.intersect(domain)?.is_empty() {
                    return Err(Error::InvalidDistribution {
                        reason: format!(
                            "distribution support {support} does not overlap the domain {domain}"
                        ),
                    });
                }
                if distribution.oversampling(domain)? {
                    for _ in 0..MAX_SAMPLING_ATTEMPTS {
                        let v = self.quantize(distribution.sample_scalar(rng));
                        if domain.contains(v) {
                            return Ok(v.into());
                        }
                    }
                    Err(Error::SamplingUnsuccessful {
                        attempts: MAX_SAMPLING_ATTEMPTS,
                    })
                } else {
                    Ok(self.quantize(distribution.sample_scalar(rng)).into())
                }
            }
            ParameterKind::Categorical { values, .. } | ParameterKind::Ordinal { values, .. } => {
                let idx = Self::sample_set_index(distribution, values.len(), rng)?;
                Ok(values[idx].clone())
            }
            ParameterKind::Discrete { values, .. } => {
                let idx = Self::sample_set_index(distribution, values.len(), rng)?;
                Ok(values[idx].into())
            }
        }
    }

    /// Orders two values of an ordinal parameter by construction position.
    ///
    /// # Errors
    ///
    /// - [`Error::Unsupported`] if this parameter is not ordinal.
    /// - [`Error::InvalidValue`] if either value is not in the value set.
    pub fn compare_values(&self, a: &Datum, b: &Datum) -> Result<Ordering> {
        let ParameterKind::Ordinal { values, .. } = &self.kind else {
            return Err(Error::Unsupported {
                reason: "value ordering is only defined for ordinal parameters",
            });
        };
        let position = |v: &Datum| -> Result<usize> {
            values
                .iter()
                .position(|w| w.eq_value(v))
                .ok_or_else(|| Error::InvalidValue {
                    reason: format!("{v} is not a value of ordinal parameter '{}'", self.name),
                })
        };
        Ok(position(a)?.cmp(&position(b)?))
    }

    /// Snaps a numerical draw down onto the quantization grid, if any.
    fn quantize(&self, v: Numeric) -> Numeric {
        let ParameterKind::Numerical {
            domain,
            quantization: Some(q),
        } = &self.kind
        else {
            return v;
        };
        match (v, domain.lower(), *q) {
            (Numeric::Int(v), Numeric::Int(lo), Numeric::Int(q)) => {
                Numeric::Int(lo + (v - lo).div_euclid(q) * q)
            }
            (v, lo, q) => {
                let steps = ((v.as_f64() - lo.as_f64()) / q.as_f64()).floor();
                Numeric::Float(lo.as_f64() + steps * q.as_f64())
            }
        }
    }

    /// Interprets a scalar draw as an index into a value set of size `n`.
    #[allow(clippy::cast_sign_loss)]
    fn sample_set_index(
        distribution: &Distribution,
        n: usize,
        rng: &mut fastrand::Rng,
    ) -> Result<usize> {
        match distribution.sample_scalar(rng) {
            Numeric::Int(i) if i >= 0 && (i as usize) < n => Ok(i as usize),
            Numeric::Int(i) => Err(Error::InvalidDistribution {
                reason: format!("index {i} outside the value set of size {n}"),
            }),
            Numeric::Float(_) => Err(Error::InvalidDistribution {
                reason: "finite parameter kinds require an integer index distribution".to_string(),
            }),
        }
    }
}

impl core::fmt::Display for Parameter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name)
    }
}
