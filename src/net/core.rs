//! 运行时：把字符串标识的 `PetriNet` 编译为按索引访问的网，并给出可发生与发生语义。
use std::collections::HashMap;
use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::net::ids::{PlaceId, TransitionId};
use crate::net::incidence::Incidence;
use crate::net::index_vec::{Idx, IndexVec};
use crate::net::structure::{Arc, Marking, ModelError, PetriNet, Weight};

#[derive(Debug, Error)]
pub enum FireError {
    #[error("transition {0:?} is out of bounds")]
    OutOfBounds(TransitionId),
    #[error("transition {0:?} is not enabled under the supplied marking")]
    NotEnabled(TransitionId),
    #[error("token count overflow at place {0:?}")]
    TokenOverflow(PlaceId),
}

/// 处理弧端点不存在的策略。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArcPolicy {
    /// Unknown endpoints become implicit places holding no tokens.
    #[default]
    Lenient,
    /// Unknown endpoints are rejected with [`ModelError::DanglingArc`].
    Strict,
}

#[derive(Debug, Clone)]
pub struct CompiledPlace {
    pub name: String,
    pub tokens: Weight,
    /// `false` for places only mentioned by an arc endpoint.
    pub declared: bool,
}

#[derive(Clone, Debug)]
pub struct Net {
    pub places: IndexVec<PlaceId, CompiledPlace>,
    pub transitions: IndexVec<TransitionId, String>,
    pub pre: Incidence,
    pub post: Incidence,
}

impl Net {
    pub fn from_model(model: &PetriNet, policy: ArcPolicy) -> Result<Self, ModelError> {
        model.check_unique_ids()?;

        let mut places: IndexVec<PlaceId, CompiledPlace> =
            IndexVec::with_capacity(model.places.len());
        let mut place_index: HashMap<&str, PlaceId> = HashMap::new();
        for place in &model.places {
            let id = places.push(CompiledPlace {
                name: place.id.clone(),
                tokens: place.tokens,
                declared: true,
            });
            place_index.insert(place.id.as_str(), id);
        }

        let transitions: IndexVec<TransitionId, String> =
            model.transitions.iter().map(|t| t.id.clone()).collect();
        let transition_index: HashMap<&str, TransitionId> = transitions
            .iter_enumerated()
            .map(|(id, name)| (name.as_str(), id))
            .collect();

        let mut pre = Incidence::new(transitions.len());
        let mut post = Incidence::new(transitions.len());

        for arc in &model.arcs {
            let input_of = transition_index.get(arc.destination_id.as_str()).copied();
            let output_of = transition_index.get(arc.source_id.as_str()).copied();
            if input_of.is_none() && output_of.is_none() {
                log::debug!("ignoring arc {:?}: no transition endpoint", arc);
                continue;
            }

            if let Some(transition) = input_of {
                let place = resolve_place(
                    &arc.source_id,
                    arc,
                    policy,
                    &mut places,
                    &mut place_index,
                    &transition_index,
                )?;
                pre.add(transition, place, arc.multiplicity);
            }
            if let Some(transition) = output_of {
                let place = resolve_place(
                    &arc.destination_id,
                    arc,
                    policy,
                    &mut places,
                    &mut place_index,
                    &transition_index,
                )?;
                post.add(transition, place, arc.multiplicity);
            }
        }

        Ok(Self {
            places,
            transitions,
            pre,
            post,
        })
    }

    pub fn places_len(&self) -> usize {
        self.places.len()
    }

    pub fn transitions_len(&self) -> usize {
        self.transitions.len()
    }

    pub fn place_name(&self, place: PlaceId) -> &str {
        &self.places[place].name
    }

    pub fn transition_name(&self, transition: TransitionId) -> &str {
        &self.transitions[transition]
    }

    pub fn initial_marking(&self) -> Marking {
        Marking::new(self.places.iter().map(|p| p.tokens).collect())
    }

    /// 迁移可发生当且仅当每条输入弧的源库所 token 数不少于弧权重；输出弧不参与判定。
    pub fn is_enabled(&self, transition: TransitionId, marking: &Marking) -> bool {
        if transition.index() >= self.transitions_len() {
            return false;
        }
        self.pre
            .arcs(transition)
            .iter()
            .all(|&(place, weight)| marking.tokens(place) >= weight)
    }

    pub fn enabled_transitions(&self, marking: &Marking) -> Vec<TransitionId> {
        self.transitions
            .indices()
            .filter(|&transition| self.is_enabled(transition, marking))
            .collect()
    }

    pub fn fire_transition(
        &self,
        marking: &Marking,
        transition: TransitionId,
    ) -> Result<Marking, FireError> {
        if transition.index() >= self.transitions_len() {
            return Err(FireError::OutOfBounds(transition));
        }
        if !self.is_enabled(transition, marking) {
            return Err(FireError::NotEnabled(transition));
        }

        let mut next = marking.clone();
        for &(place, weight) in self.pre.arcs(transition) {
            // 可发生性已保证不会下溢
            *next.tokens_mut(place) -= weight;
        }
        for &(place, weight) in self.post.arcs(transition) {
            let tokens = next.tokens_mut(place);
            *tokens = tokens
                .checked_add(weight)
                .ok_or(FireError::TokenOverflow(place))?;
        }
        Ok(next)
    }

    pub fn to_dot(&self) -> String {
        let mut dot = String::new();
        let _ = writeln!(&mut dot, "digraph PetriNet {{");
        let _ = writeln!(&mut dot, "    rankdir=LR;");
        let _ = writeln!(&mut dot, "    node [fontname=\"Helvetica\"];");

        for (place_id, place) in self.places.iter_enumerated() {
            let style = if place.declared { "filled" } else { "dashed" };
            let _ = writeln!(
                &mut dot,
                "    place_{} [label=\"{}\\n{}\", shape=circle, style={}, fillcolor=\"#e3f2fd\"];",
                place_id.index(),
                escape_label(&place.name),
                place.tokens,
                style
            );
        }

        for (transition_id, name) in self.transitions.iter_enumerated() {
            let _ = writeln!(
                &mut dot,
                "    trans_{} [label=\"{}\", shape=box, style=filled, fillcolor=\"#ffe0b2\"];",
                transition_id.index(),
                escape_label(name)
            );
        }

        for transition in self.transitions.indices() {
            for &(place, weight) in self.pre.arcs(transition) {
                write_arc(
                    &mut dot,
                    &format!("place_{}", place.index()),
                    &format!("trans_{}", transition.index()),
                    weight,
                );
            }
            for &(place, weight) in self.post.arcs(transition) {
                write_arc(
                    &mut dot,
                    &format!("trans_{}", transition.index()),
                    &format!("place_{}", place.index()),
                    weight,
                );
            }
        }

        let _ = writeln!(&mut dot, "}}");
        dot
    }

    pub fn write_dot<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_dot())
    }
}

fn resolve_place<'m>(
    name: &'m str,
    arc: &Arc,
    policy: ArcPolicy,
    places: &mut IndexVec<PlaceId, CompiledPlace>,
    place_index: &mut HashMap<&'m str, PlaceId>,
    transition_index: &HashMap<&str, TransitionId>,
) -> Result<PlaceId, ModelError> {
    if let Some(id) = place_index.get(name) {
        return Ok(*id);
    }
    if policy == ArcPolicy::Strict && !transition_index.contains_key(name) {
        return Err(ModelError::DanglingArc {
            from: arc.source_id.clone(),
            to: arc.destination_id.clone(),
            missing: name.to_string(),
        });
    }
    let id = places.push(CompiledPlace {
        name: name.to_string(),
        tokens: 0,
        declared: false,
    });
    place_index.insert(name, id);
    log::trace!("implicit place {:?} for arc endpoint `{}`", id, name);
    Ok(id)
}

fn write_arc(dot: &mut String, from: &str, to: &str, weight: Weight) {
    if weight == 1 {
        let _ = writeln!(dot, "    {} -> {};", from, to);
    } else {
        let _ = writeln!(dot, "    {} -> {} [label=\"{}\"];", from, to, weight);
    }
}

pub(crate) fn escape_label(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
