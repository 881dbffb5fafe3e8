//! Visual effects: the closed set of effect ids, the registry that builds
//! them, and the controller that keeps at most one alive.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    render::{RenderGraph, Size},
    PlayerError,
};

mod controller;
mod effects;

pub use controller::EffectController;
pub use effects::{CalmBreath, SoftPulse, Starfield};

/// Identifier of a built-in visual effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisualEffectId {
    CalmBreath,
    SoftPulse,
    Starfield,
}

impl VisualEffectId {
    pub const ALL: [VisualEffectId; 3] = [Self::CalmBreath, Self::SoftPulse, Self::Starfield];

    /// Resolves a timeline effect id, `None` when it is outside the set.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == value)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CalmBreath => "calm-breath",
            Self::SoftPulse => "soft-pulse",
            Self::Starfield => "starfield",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::CalmBreath => "Calm Breath",
            Self::SoftPulse => "Soft Pulse",
            Self::Starfield => "Starfield",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for VisualEffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisualEffectId {
    type Err = PlayerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| PlayerError::UnresolvedEffect(value.to_string()))
    }
}

/// A live animation attached to the render graph.
///
/// `update` receives the milliseconds elapsed since the previous frame and
/// must only accumulate relative time. `destroy` consumes the effect and has
/// to remove every node it added before returning.
pub trait RunningEffect {
    fn update(&mut self, graph: &mut RenderGraph, delta_ms: f64);
    fn resize(&mut self, graph: &mut RenderGraph, size: Size);
    fn destroy(self: Box<Self>, graph: &mut RenderGraph);
}

pub type EffectFactory = Box<dyn Fn(&mut RenderGraph, Size) -> Box<dyn RunningEffect>>;

/// Immutable mapping with exactly one factory per [`VisualEffectId`].
pub struct EffectRegistry {
    factories: [EffectFactory; 3],
}

impl EffectRegistry {
    /// Builds a registry by asking `make` for the factory of every id.
    pub fn from_fn(make: impl FnMut(VisualEffectId) -> EffectFactory) -> Self {
        Self {
            factories: VisualEffectId::ALL.map(make),
        }
    }

    /// Registry wired to the built-in animations.
    pub fn builtin() -> Self {
        Self::from_fn(|id| match id {
            VisualEffectId::CalmBreath => factory(CalmBreath::spawn),
            VisualEffectId::SoftPulse => factory(SoftPulse::spawn),
            VisualEffectId::Starfield => factory(Starfield::spawn),
        })
    }

    pub fn create(
        &self,
        id: VisualEffectId,
        graph: &mut RenderGraph,
        size: Size,
    ) -> Box<dyn RunningEffect> {
        (self.factories[id.index()])(graph, size)
    }
}

fn factory<E>(spawn: fn(&mut RenderGraph, Size) -> E) -> EffectFactory
where
    E: RunningEffect + 'static,
{
    Box::new(
        move |graph: &mut RenderGraph, size: Size| -> Box<dyn RunningEffect> {
            Box::new(spawn(graph, size))
        },
    )
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectRegistry")
            .field("effects", &VisualEffectId::ALL)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_only_known_ids() {
        assert_eq!(
            VisualEffectId::parse("calm-breath"),
            Some(VisualEffectId::CalmBreath)
        );
        assert_eq!(
            "starfield".parse::<VisualEffectId>().unwrap(),
            VisualEffectId::Starfield
        );
        assert!(VisualEffectId::parse("Calm-Breath").is_none());

        let err = "unknown-effect".parse::<VisualEffectId>().unwrap_err();
        assert!(format!("{err}").contains("unknown-effect"));
    }

    #[test]
    fn display_names_are_title_case() {
        let names: Vec<_> = VisualEffectId::ALL
            .iter()
            .map(|id| id.display_name())
            .collect();
        assert_eq!(names, vec!["Calm Breath", "Soft Pulse", "Starfield"]);
    }

    #[test]
    fn serde_uses_timeline_ids() {
        let json = serde_json::to_string(&VisualEffectId::SoftPulse).unwrap();
        assert_eq!(json, "\"soft-pulse\"");
    }

    #[test]
    fn builtin_effects_clean_up_after_themselves() {
        let registry = EffectRegistry::builtin();
        let size = Size::new(640.0, 360.0);

        for id in VisualEffectId::ALL {
            let mut graph = RenderGraph::new();
            let mut effect = registry.create(id, &mut graph, size);
            assert!(!graph.is_empty(), "{id} should add nodes");

            effect.update(&mut graph, 16.0);
            effect.resize(&mut graph, Size::new(320.0, 200.0));
            effect.update(&mut graph, 16.0);
            effect.destroy(&mut graph);

            assert!(graph.is_empty(), "{id} leaked nodes");
        }
    }
}
