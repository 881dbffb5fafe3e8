use super::{EffectRegistry, RunningEffect, VisualEffectId};
use crate::render::{RenderGraph, Size};

/// Owns the render graph and at most one running effect.
///
/// Every effect created through [`EffectController::switch_to`] is destroyed
/// exactly once: by the next switch, by [`EffectController::clear`], or when
/// the controller is dropped.
pub struct EffectController {
    graph: RenderGraph,
    registry: EffectRegistry,
    running: Option<(VisualEffectId, Box<dyn RunningEffect>)>,
}

impl EffectController {
    pub fn new(registry: EffectRegistry) -> Self {
        Self::with_graph(RenderGraph::new(), registry)
    }

    pub fn with_graph(graph: RenderGraph, registry: EffectRegistry) -> Self {
        Self {
            graph,
            registry,
            running: None,
        }
    }

    /// Destroys the current effect, then instantiates `id` at `size`.
    pub fn switch_to(&mut self, id: VisualEffectId, size: Size) {
        self.clear();
        let effect = self.registry.create(id, &mut self.graph, size);
        self.running = Some((id, effect));
    }

    pub fn update(&mut self, delta_ms: f64) {
        if let Some((_, effect)) = self.running.as_mut() {
            effect.update(&mut self.graph, delta_ms);
        }
    }

    pub fn resize(&mut self, size: Size) {
        if let Some((_, effect)) = self.running.as_mut() {
            effect.resize(&mut self.graph, size);
        }
    }

    /// Destroys the running effect if there is one.
    pub fn clear(&mut self) {
        if let Some((id, effect)) = self.running.take() {
            tracing::debug!(effect_id = %id, "destroying visual effect");
            effect.destroy(&mut self.graph);
        }
    }

    pub fn active(&self) -> Option<VisualEffectId> {
        self.running.as_ref().map(|(id, _)| *id)
    }

    pub fn graph(&self) -> &RenderGraph {
        &self.graph
    }
}

impl Drop for EffectController {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for EffectController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectController")
            .field("active", &self.active())
            .field("nodes", &self.graph.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::scene::EffectFactory;

    type CallLog = Rc<RefCell<Vec<String>>>;

    struct SpyEffect {
        id: VisualEffectId,
        log: CallLog,
    }

    impl RunningEffect for SpyEffect {
        fn update(&mut self, _graph: &mut RenderGraph, delta_ms: f64) {
            self.log
                .borrow_mut()
                .push(format!("update:{}:{delta_ms}", self.id));
        }

        fn resize(&mut self, _graph: &mut RenderGraph, size: Size) {
            self.log
                .borrow_mut()
                .push(format!("resize:{}:{}x{}", self.id, size.width, size.height));
        }

        fn destroy(self: Box<Self>, _graph: &mut RenderGraph) {
            self.log.borrow_mut().push(format!("destroy:{}", self.id));
        }
    }

    fn spy_registry(log: &CallLog) -> EffectRegistry {
        EffectRegistry::from_fn(|id| -> EffectFactory {
            let log = log.clone();
            Box::new(move |_graph: &mut RenderGraph, _size: Size| -> Box<dyn RunningEffect> {
                log.borrow_mut().push(format!("create:{id}"));
                Box::new(SpyEffect {
                    id,
                    log: log.clone(),
                })
            })
        })
    }

    fn size() -> Size {
        Size::new(800.0, 450.0)
    }

    #[test]
    fn destroys_the_previous_effect_before_creating_the_next_one() {
        let log = CallLog::default();
        let mut controller = EffectController::new(spy_registry(&log));

        controller.switch_to(VisualEffectId::CalmBreath, size());
        controller.switch_to(VisualEffectId::SoftPulse, size());

        assert_eq!(
            *log.borrow(),
            vec![
                "create:calm-breath",
                "destroy:calm-breath",
                "create:soft-pulse",
            ]
        );
        assert_eq!(controller.active(), Some(VisualEffectId::SoftPulse));
    }

    #[test]
    fn clear_destroys_once_and_is_idempotent() {
        let log = CallLog::default();
        let mut controller = EffectController::new(spy_registry(&log));

        controller.switch_to(VisualEffectId::CalmBreath, size());
        controller.clear();
        controller.clear();

        let destroys = log
            .borrow()
            .iter()
            .filter(|entry| entry.starts_with("destroy:"))
            .count();
        assert_eq!(destroys, 1);
        assert!(controller.active().is_none());
    }

    #[test]
    fn forwards_frames_only_while_running() {
        let log = CallLog::default();
        let mut controller = EffectController::new(spy_registry(&log));

        controller.update(16.0);
        controller.resize(Size::new(10.0, 20.0));
        assert!(log.borrow().is_empty());

        controller.switch_to(VisualEffectId::Starfield, size());
        controller.update(16.0);
        controller.resize(Size::new(10.0, 20.0));

        assert_eq!(
            *log.borrow(),
            vec![
                "create:starfield",
                "update:starfield:16",
                "resize:starfield:10x20",
            ]
        );
    }

    #[test]
    fn dropping_the_controller_destroys_the_running_effect() {
        let log = CallLog::default();
        {
            let mut controller = EffectController::new(spy_registry(&log));
            controller.switch_to(VisualEffectId::SoftPulse, size());
        }

        assert_eq!(
            log.borrow().last().map(String::as_str),
            Some("destroy:soft-pulse")
        );
    }

    #[test]
    fn builtin_switches_leave_a_single_effect_on_the_graph() {
        let mut controller = EffectController::new(EffectRegistry::builtin());

        controller.switch_to(VisualEffectId::CalmBreath, size());
        let calm_nodes = controller.graph().len();
        controller.switch_to(VisualEffectId::SoftPulse, size());
        controller.update(16.0);

        assert_eq!(calm_nodes, 3);
        assert_eq!(controller.graph().len(), 5);

        controller.clear();
        assert!(controller.graph().is_empty());
    }
}
