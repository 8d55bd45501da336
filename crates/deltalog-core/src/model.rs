//! Stable-model containers returned by the solving engine.

use std::collections::BTreeSet;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::symbol::Symbol;

/// One stable model: a set of ground atoms.
///
/// Atoms are kept in a sorted set so two models with the same atoms compare
/// and hash equal regardless of the order the engine reported them.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Model {
    atoms: BTreeSet<Symbol>,
}

impl Model {
    /// Builds a model from the given atoms.
    pub fn of(atoms: impl IntoIterator<Item = Symbol>) -> Self {
        Self {
            atoms: atoms.into_iter().collect(),
        }
    }

    /// Number of atoms in the model.
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    /// True when the model has no atoms.
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// True when the model contains the given atom.
    pub fn contains(&self, atom: &Symbol) -> bool {
        self.atoms.contains(atom)
    }

    /// Iterates over the atoms in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.atoms.iter()
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, atom) in self.atoms.iter().enumerate() {
            if idx > 0 {
                write!(f, " ")?;
            }
            write!(f, "{atom}")?;
        }
        Ok(())
    }
}

/// An order-independent collection of stable models.
///
/// Models are sorted on construction so the list itself is a canonical
/// grouping key for "same set of stable models".
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct ModelList {
    models: Vec<Model>,
}

impl ModelList {
    /// Builds a sorted model list from the given models.
    pub fn of(models: impl IntoIterator<Item = Model>) -> Self {
        let mut models: Vec<Model> = models.into_iter().collect();
        models.sort();
        Self { models }
    }

    /// The empty model list.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of models in the list.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// True when the list holds no models.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Returns the model at the given position, if any.
    pub fn get(&self, index: usize) -> Option<&Model> {
        self.models.get(index)
    }

    /// Iterates over the models in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &Model> {
        self.models.iter()
    }
}

impl Display for ModelList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.models.is_empty() {
            return write!(f, "-");
        }
        for (idx, model) in self.models.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{model}")?;
        }
        Ok(())
    }
}
