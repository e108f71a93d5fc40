//! Weighted trees and tree search spaces.
//!
//! A [`Tree`] node carries a value, a fixed arity, a selection weight, and a
//! stop bias. Sampling a [`TreeSpace`] walks from the root: at each node one
//! of `arity + 1` outcomes is drawn by weight, either descending into a
//! child slot or stopping at the current node. The result is a
//! [`TreeConfiguration`]: the child-index path taken and the values along
//! it.
//!
//! A static space wraps a fully built tree; a dynamic space grows its tree
//! lazily through a child factory, invoked at most once per slot and cached
//! thereafter.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::datum::Datum;
use crate::error::{Error, Result};
use crate::parameter::MAX_SAMPLING_ATTEMPTS;

/// A node in a weighted tree.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tree {
    value: Datum,
    arity: usize,
    weight: f64,
    bias: f64,
    children: Vec<Option<Tree>>,
}

impl Tree {
    /// Creates a node with `arity` empty child slots, weight 1 and bias 1.
    #[must_use]
    pub fn new(value: impl Into<Datum>, arity: usize) -> Self {
        Self {
            value: value.into(),
            arity,
            weight: 1.0,
            bias: 1.0,
            children: vec![None; arity],
        }
    }

    /// Returns the node's value.
    #[must_use]
    pub fn value(&self) -> &Datum {
        &self.value
    }

    /// Returns the number of child slots.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Returns the selection weight this node carries in its parent's draw.
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Sets the selection weight.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] unless the weight is finite and
    /// non-negative.
    pub fn set_weight(&mut self, weight: f64) -> Result<()> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::InvalidValue {
                reason: format!("tree weight must be finite and non-negative, got {weight}"),
            });
        }
        self.weight = weight;
        Ok(())
    }

    /// Returns the stop bias: the weight of the "stop here" outcome.
    #[must_use]
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Sets the stop bias.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] unless the bias is finite and
    /// non-negative.
    pub fn set_bias(&mut self, bias: f64) -> Result<()> {
        if !bias.is_finite() || bias < 0.0 {
            return Err(Error::InvalidValue {
                reason: format!("tree bias must be finite and non-negative, got {bias}"),
            });
        }
        self.bias = bias;
        Ok(())
    }

    /// Returns the child in `slot`, if one is attached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `slot >= arity`.
    pub fn child(&self, slot: usize) -> Result<Option<&Tree>> {
        self.children
            .get(slot)
            .map(Option::as_ref)
            .ok_or(Error::OutOfBounds {
                index: slot,
                len: self.arity,
            })
    }

    /// Attaches a child in `slot`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `slot >= arity`.
    pub fn set_child(&mut self, slot: usize, child: Tree) -> Result<()> {
        let len = self.arity;
        let entry = self
            .children
            .get_mut(slot)
            .ok_or(Error::OutOfBounds { index: slot, len })?;
        *entry = Some(child);
        Ok(())
    }

    /// Draws one of `arity + 1` outcomes by weight: `Some(slot)` to descend,
    /// `None` to stop at this node.
    ///
    /// Attached children contribute their own weight, empty slots the
    /// default weight 1, and stopping contributes the bias. With every
    /// weight at its default each outcome is equally likely.
    pub fn sample_slot(&self, rng: &mut fastrand::Rng) -> Option<usize> {
        let slot_weight = |slot: &Option<Tree>| slot.as_ref().map_or(1.0, Tree::weight);
        let total: f64 = self.children.iter().map(slot_weight).sum::<f64>() + self.bias;
        if total <= 0.0 {
            return None;
        }
        let mut u = rng.f64() * total;
        for (i, slot) in self.children.iter().enumerate() {
            u -= slot_weight(slot);
            if u < 0.0 {
                return Some(i);
            }
        }
        None
    }
}

/// The position and values of one sampled tree walk.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeConfiguration {
    position: Vec<usize>,
    values: Vec<Datum>,
}

impl TreeConfiguration {
    /// Returns the child-index path from the root.
    #[must_use]
    pub fn position(&self) -> &[usize] {
        &self.position
    }

    /// Returns the node values along the path, root first.
    #[must_use]
    pub fn values(&self) -> &[Datum] {
        &self.values
    }

    /// Returns the walk's depth (the root is depth 0).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.position.len()
    }
}

/// Produces the child for a slot of a dynamic tree, given the parent node
/// and the slot index.
pub type ChildFactory = dyn Fn(&Tree, usize) -> Result<Tree> + Send + Sync;

/// A search space over tree positions.
pub struct TreeSpace {
    name: Arc<str>,
    root: Mutex<Tree>,
    factory: Option<Box<ChildFactory>>,
    rng: Mutex<fastrand::Rng>,
}

impl core::fmt::Debug for TreeSpace {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TreeSpace")
            .field("name", &self.name)
            .field("dynamic", &self.factory.is_some())
            .finish_non_exhaustive()
    }
}

impl TreeSpace {
    /// Creates a static space over an already-built tree. Walking into an
    /// empty child slot stops at the current node.
    #[must_use]
    pub fn fixed(name: impl AsRef<str>, root: Tree) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            root: Mutex::new(root),
            factory: None,
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    /// Creates a dynamic space whose tree grows on demand: an empty child
    /// slot reached by a walk is filled by `factory` and cached.
    #[must_use]
    pub fn dynamic(
        name: impl AsRef<str>,
        root: Tree,
        factory: impl Fn(&Tree, usize) -> Result<Tree> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            root: Mutex::new(root),
            factory: Some(Box::new(factory)),
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    /// Reseeds the space's sampling stream.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
            ..self
        }
    }

    /// Returns the space's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calls `f` with the node at `position`, materializing dynamic
    /// children along the way.
    ///
    /// # Errors
    ///
    /// - [`Error::OutOfBounds`] if the position leaves the tree, or names an
    ///   empty slot in a static space.
    /// - Factory errors are propagated as is.
    fn with_node_at<R>(&self, position: &[usize], f: impl FnOnce(&Tree) -> R) -> Result<R> {
        let mut root = self.root.lock();
        let mut node: &mut Tree = &mut root;
        for &slot in position {
            node = self.materialize_child(node, slot)?.ok_or_else(|| {
                Error::OutOfBounds {
                    index: slot,
                    len: 0,
                }
            })?;
        }
        Ok(f(node))
    }

    /// Fills `slot` of `node` through the factory if empty and dynamic,
    /// then returns it. `Ok(None)` means an empty slot in a static space.
    fn materialize_child<'a>(
        &self,
        node: &'a mut Tree,
        slot: usize,
    ) -> Result<Option<&'a mut Tree>> {
        if slot >= node.arity {
            return Err(Error::OutOfBounds {
                index: slot,
                len: node.arity,
            });
        }
        if node.children[slot].is_none() {
            let Some(factory) = &self.factory else {
                return Ok(None);
            };
            let child = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                factory(node, slot)
            })) {
                Ok(result) => result?,
                Err(_) => {
                    return Err(Error::External(
                        "tree child factory panicked".to_string(),
                    ));
                }
            };
            node.children[slot] = Some(child);
        }
        Ok(node.children[slot].as_mut())
    }

    /// Returns the values along `position`, root first.
    ///
    /// # Errors
    ///
    /// Same as the position lookup: [`Error::OutOfBounds`] for a path that
    /// leaves the tree, factory errors for dynamic growth.
    pub fn values_at(&self, position: &[usize]) -> Result<Vec<Datum>> {
        let mut values = Vec::with_capacity(position.len() + 1);
        for depth in 0..=position.len() {
            let value = self.with_node_at(&position[..depth], |n| n.value.clone())?;
            values.push(value);
        }
        Ok(values)
    }

    /// Builds the configuration at an explicit position.
    ///
    /// # Errors
    ///
    /// Same as [`values_at`](Self::values_at).
    pub fn configuration_at(&self, position: &[usize]) -> Result<TreeConfiguration> {
        Ok(TreeConfiguration {
            values: self.values_at(position)?,
            position: position.to_vec(),
        })
    }

    /// Draws one tree walk.
    ///
    /// # Errors
    ///
    /// Factory errors and panics are propagated; a factory that keeps
    /// refusing to stop is cut off by [`MAX_SAMPLING_ATTEMPTS`] levels of
    /// depth with [`Error::SamplingUnsuccessful`].
    pub fn sample(&self) -> Result<TreeConfiguration> {
        let mut rng = self.rng.lock();
        let mut root = self.root.lock();
        let mut position = Vec::new();
        let mut values = vec![root.value.clone()];
        let mut node: &mut Tree = &mut root;
        loop {
            if position.len() >= MAX_SAMPLING_ATTEMPTS {
                return Err(Error::SamplingUnsuccessful {
                    attempts: MAX_SAMPLING_ATTEMPTS,
                });
            }
            let Some(slot) = node.sample_slot(&mut rng) else {
                break;
            };
            let Some(child) = self.materialize_child(node, slot)? else {
                // Static tree, empty slot: the walk ends here.
                break;
            };
            position.push(slot);
            values.push(child.value.clone());
            node = child;
        }
        Ok(TreeConfiguration { position, values })
    }

    /// Draws `count` tree walks.
    ///
    /// # Errors
    ///
    /// Same as [`sample`](Self::sample); fails on the first bad draw.
    pub fn samples(&self, count: usize) -> Result<Vec<TreeConfiguration>> {
        (0..count).map(|_| self.sample()).collect()
    }
}
