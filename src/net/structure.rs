//! P/T 网静态结构元素：库所、迁移、弧与标识。
//!
//! 这些类型与外部加载器交换的文档结构一一对应，标识符均为字符串，
//! 弧的端点在数据模型层面不做类型区分。
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::net::ids::PlaceId;
use crate::net::index_vec::IndexVec;

pub type Weight = u64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("place id `{0}` is declared more than once")]
    DuplicatePlace(String),
    #[error("transition id `{0}` is declared more than once")]
    DuplicateTransition(String),
    #[error("arc {from} -> {to} references unknown id `{missing}`")]
    DanglingArc {
        from: String,
        to: String,
        missing: String,
    },
    #[error("arc {from} -> {to} does not touch any transition")]
    DetachedArc { from: String, to: String },
    #[error("arc {from} -> {to} has zero multiplicity")]
    ZeroMultiplicity { from: String, to: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    #[serde(default)]
    pub tokens: Weight,
}

impl Place {
    pub fn new(id: impl Into<String>, tokens: Weight) -> Self {
        Self {
            id: id.into(),
            tokens,
        }
    }
}

impl PartialEq for Place {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Place {}

impl Hash for Place {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    pub id: String,
}

impl Transition {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Transition").field(&self.id).finish()
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arc {
    pub source_id: String,
    pub destination_id: String,
    #[serde(default = "default_multiplicity")]
    pub multiplicity: Weight,
}

fn default_multiplicity() -> Weight {
    1
}

impl Arc {
    pub fn new(
        source_id: impl Into<String>,
        destination_id: impl Into<String>,
        multiplicity: Weight,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            destination_id: destination_id.into(),
            multiplicity,
        }
    }
}

impl fmt::Debug for Arc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Arc({} -> {} x{})",
            self.source_id, self.destination_id, self.multiplicity
        )
    }
}

/// A Petri net as delivered by the document loader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetriNet {
    #[serde(default, alias = "place")]
    pub places: Vec<Place>,
    #[serde(default, alias = "transition")]
    pub transitions: Vec<Transition>,
    #[serde(default, alias = "arc")]
    pub arcs: Vec<Arc>,
}

impl PetriNet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, id: impl Into<String>, tokens: Weight) -> Self {
        self.places.push(Place::new(id, tokens));
        self
    }

    pub fn with_transition(mut self, id: impl Into<String>) -> Self {
        self.transitions.push(Transition::new(id));
        self
    }

    pub fn with_arc(
        mut self,
        source_id: impl Into<String>,
        destination_id: impl Into<String>,
        multiplicity: Weight,
    ) -> Self {
        self.arcs.push(Arc::new(source_id, destination_id, multiplicity));
        self
    }

    pub fn transition_ids(&self) -> HashSet<&str> {
        self.transitions.iter().map(|t| t.id.as_str()).collect()
    }

    /// 判断本网的全部库所、迁移和弧是否都出现在 `other` 中。
    pub fn is_subset_of(&self, other: &PetriNet) -> bool {
        let places: HashSet<&Place> = other.places.iter().collect();
        let transitions: HashSet<&Transition> = other.transitions.iter().collect();
        let arcs: HashSet<&Arc> = other.arcs.iter().collect();

        self.places.iter().all(|p| places.contains(p))
            && self.transitions.iter().all(|t| transitions.contains(t))
            && self.arcs.iter().all(|a| arcs.contains(a))
    }

    /// Full structural validation. Returns the first problem found.
    ///
    /// The reachability engine itself only insists on unique ids; dangling
    /// endpoints are resolved lazily unless the caller opts into strict arcs.
    pub fn validate(&self) -> Result<(), ModelError> {
        let places = self.check_unique_ids()?;
        let transitions = self.transition_ids();

        for arc in &self.arcs {
            if arc.multiplicity == 0 {
                return Err(ModelError::ZeroMultiplicity {
                    from: arc.source_id.clone(),
                    to: arc.destination_id.clone(),
                });
            }
            let source_is_transition = transitions.contains(arc.source_id.as_str());
            let destination_is_transition = transitions.contains(arc.destination_id.as_str());
            if !source_is_transition && !destination_is_transition {
                return Err(ModelError::DetachedArc {
                    from: arc.source_id.clone(),
                    to: arc.destination_id.clone(),
                });
            }
            for endpoint in [&arc.source_id, &arc.destination_id] {
                let known = places.contains(endpoint.as_str())
                    || transitions.contains(endpoint.as_str());
                if !known {
                    return Err(ModelError::DanglingArc {
                        from: arc.source_id.clone(),
                        to: arc.destination_id.clone(),
                        missing: endpoint.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub(crate) fn check_unique_ids(&self) -> Result<HashSet<&str>, ModelError> {
        let mut places = HashSet::with_capacity(self.places.len());
        for place in &self.places {
            if !places.insert(place.id.as_str()) {
                return Err(ModelError::DuplicatePlace(place.id.clone()));
            }
        }
        let mut transitions = HashSet::with_capacity(self.transitions.len());
        for transition in &self.transitions {
            if !transitions.insert(transition.id.as_str()) {
                return Err(ModelError::DuplicateTransition(transition.id.clone()));
            }
        }
        Ok(places)
    }
}

/// 标识：编译网中每个库所的 token 数。
///
/// 同一张网内的两个标识按值比较；跨网比较需经由库所名称
/// （见 `analysis::correspondence`）。
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Marking(IndexVec<PlaceId, Weight>);

impl Marking {
    pub fn new(tokens: IndexVec<PlaceId, Weight>) -> Self {
        Self(tokens)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlaceId, Weight)> + '_ {
        self.0.iter_enumerated().map(|(place, tokens)| (place, *tokens))
    }

    /// Places outside the table count as empty.
    pub fn tokens(&self, place: PlaceId) -> Weight {
        self.0.get(place).copied().unwrap_or(0)
    }

    pub(crate) fn tokens_mut(&mut self, place: PlaceId) -> &mut Weight {
        &mut self.0[place]
    }

    pub fn total(&self) -> Weight {
        self.0.iter().fold(0, |acc, t| acc.saturating_add(*t))
    }
}

impl fmt::Debug for Marking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
