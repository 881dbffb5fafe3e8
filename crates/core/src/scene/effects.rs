use std::f64::consts::TAU;

use rand::{rngs::StdRng, Rng, SeedableRng};

use super::RunningEffect;
use crate::render::{Node, NodeId, RenderGraph, Shape, Size};

const STAR_COUNT: usize = 90;
const STAR_MARGIN: f32 = 5.0;
const STAR_TINTS: [u32; 3] = [0xd5f2ff, 0xbde0fe, 0xffffff];

fn with_node(graph: &mut RenderGraph, id: NodeId, apply: impl FnOnce(&mut Node)) {
    if let Some(node) = graph.node_mut(id) {
        apply(node);
    }
}

/// Maps a sine wave with the given period onto `[0, 1]`.
fn wave(elapsed_ms: f64, period_ms: f64) -> f32 {
    (((elapsed_ms / period_ms) * TAU).sin() as f32 + 1.0) / 2.0
}

/// Aura and core circles that breathe together on a slow sine.
#[derive(Debug)]
pub struct CalmBreath {
    root: NodeId,
    aura: NodeId,
    core: NodeId,
    elapsed_ms: f64,
}

impl CalmBreath {
    pub fn spawn(graph: &mut RenderGraph, size: Size) -> Self {
        let root = graph.add_group(None);
        let aura = graph.add_node(root, Shape::Circle { radius: 170.0 }, 0x8ecae6);
        let core = graph.add_node(root, Shape::Circle { radius: 120.0 }, 0x219ebc);
        with_node(graph, aura, |node| node.alpha = 0.35);
        with_node(graph, core, |node| node.alpha = 0.9);

        let mut effect = Self {
            root,
            aura,
            core,
            elapsed_ms: 0.0,
        };
        effect.resize(graph, size);
        effect
    }
}

impl RunningEffect for CalmBreath {
    fn update(&mut self, graph: &mut RenderGraph, delta_ms: f64) {
        self.elapsed_ms += delta_ms;
        let breath = wave(self.elapsed_ms, 1900.0);

        with_node(graph, self.core, |node| {
            node.scale = 0.8 + breath * 0.22;
            node.alpha = 0.68 + breath * 0.26;
        });
        with_node(graph, self.aura, |node| {
            node.scale = 0.95 + breath * 0.45;
            node.alpha = 0.2 + breath * 0.35;
        });
        let wobble = (self.elapsed_ms / 3200.0).sin() as f32 * 0.03;
        with_node(graph, self.root, |node| node.rotation = wobble);
    }

    fn resize(&mut self, graph: &mut RenderGraph, size: Size) {
        with_node(graph, self.root, |node| node.position = size.center());
    }

    fn destroy(self: Box<Self>, graph: &mut RenderGraph) {
        graph.remove(self.root);
    }
}

/// Glowing centre with three staggered rings expanding outwards.
#[derive(Debug)]
pub struct SoftPulse {
    root: NodeId,
    glow: NodeId,
    rings: [NodeId; 3],
    elapsed_ms: f64,
}

impl SoftPulse {
    const RING_CYCLE_MS: f64 = 1800.0;
    const RING_STAGGER_MS: f64 = 450.0;

    pub fn spawn(graph: &mut RenderGraph, size: Size) -> Self {
        let root = graph.add_group(None);
        let glow = graph.add_node(root, Shape::Circle { radius: 70.0 }, 0xf4a261);
        with_node(graph, glow, |node| node.alpha = 0.8);

        let rings = [0, 1, 2].map(|index| {
            let color = if index % 2 == 0 { 0xe76f51 } else { 0xf4a261 };
            let ring = graph.add_node(
                root,
                Shape::Ring {
                    radius: 90.0,
                    stroke_width: 6.0,
                },
                color,
            );
            with_node(graph, ring, |node| node.alpha = 0.0);
            ring
        });

        let mut effect = Self {
            root,
            glow,
            rings,
            elapsed_ms: 0.0,
        };
        effect.resize(graph, size);
        effect
    }
}

impl RunningEffect for SoftPulse {
    fn update(&mut self, graph: &mut RenderGraph, delta_ms: f64) {
        self.elapsed_ms += delta_ms;

        let glow = wave(self.elapsed_ms, 1400.0);
        with_node(graph, self.glow, |node| {
            node.scale = 0.88 + glow * 0.26;
            node.alpha = 0.45 + glow * 0.4;
        });

        for (index, ring) in self.rings.iter().enumerate() {
            let offset = self.elapsed_ms + index as f64 * Self::RING_STAGGER_MS;
            let phase = (offset % Self::RING_CYCLE_MS / Self::RING_CYCLE_MS) as f32;
            with_node(graph, *ring, |node| {
                node.scale = 0.45 + phase * 1.15;
                node.alpha = (1.0 - phase).max(0.0) * 0.75;
            });
        }
    }

    fn resize(&mut self, graph: &mut RenderGraph, size: Size) {
        with_node(graph, self.root, |node| node.position = size.center());
    }

    fn destroy(self: Box<Self>, graph: &mut RenderGraph) {
        graph.remove(self.root);
    }
}

#[derive(Debug)]
struct Star {
    node: NodeId,
    velocity: [f32; 2],
    twinkle_offset: f64,
}

/// Drifting, twinkling sprites that wrap around the surface edges.
#[derive(Debug)]
pub struct Starfield {
    root: NodeId,
    stars: Vec<Star>,
    size: Size,
    elapsed_ms: f64,
}

impl Starfield {
    pub fn spawn(graph: &mut RenderGraph, size: Size) -> Self {
        Self::spawn_with_rng(graph, size, &mut StdRng::from_entropy())
    }

    pub fn spawn_with_rng(graph: &mut RenderGraph, size: Size, rng: &mut impl Rng) -> Self {
        let root = graph.add_group(None);

        let stars = (0..STAR_COUNT)
            .map(|index| {
                let node = graph.add_node(
                    root,
                    Shape::Sprite {
                        size: 1.5 + rng.gen::<f32>() * 3.0,
                    },
                    STAR_TINTS[index % STAR_TINTS.len()],
                );
                let position = [
                    rng.gen::<f32>() * size.width,
                    rng.gen::<f32>() * size.height,
                ];
                let alpha = 0.35 + rng.gen::<f32>() * 0.55;
                with_node(graph, node, |star| {
                    star.position = position;
                    star.alpha = alpha;
                });

                Star {
                    node,
                    velocity: [
                        -0.01 - rng.gen::<f32>() * 0.03,
                        0.01 + rng.gen::<f32>() * 0.05,
                    ],
                    twinkle_offset: rng.gen::<f64>() * TAU,
                }
            })
            .collect();

        Self {
            root,
            stars,
            size,
            elapsed_ms: 0.0,
        }
    }
}

impl RunningEffect for Starfield {
    fn update(&mut self, graph: &mut RenderGraph, delta_ms: f64) {
        self.elapsed_ms += delta_ms;
        let Size { width, height } = self.size;
        let delta = delta_ms as f32;

        for star in &self.stars {
            let twinkle = ((self.elapsed_ms * 0.003 + star.twinkle_offset).sin() as f32 + 1.0) / 2.0;
            with_node(graph, star.node, |node| {
                let [x, y] = &mut node.position;
                *x += star.velocity[0] * delta;
                *y += star.velocity[1] * delta;

                if *x < -STAR_MARGIN {
                    *x = width + STAR_MARGIN;
                }
                if *y > height + STAR_MARGIN {
                    *y = -STAR_MARGIN;
                }

                node.alpha = 0.2 + twinkle * 0.7;
            });
        }
    }

    fn resize(&mut self, _graph: &mut RenderGraph, size: Size) {
        self.size = size;
    }

    fn destroy(self: Box<Self>, graph: &mut RenderGraph) {
        graph.remove(self.root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_starfield(graph: &mut RenderGraph, size: Size) -> Starfield {
        Starfield::spawn_with_rng(graph, size, &mut StdRng::seed_from_u64(7))
    }

    #[test]
    fn calm_breath_centres_on_resize() {
        let mut graph = RenderGraph::new();
        let mut effect = CalmBreath::spawn(&mut graph, Size::new(800.0, 400.0));
        assert_eq!(graph.node(effect.root).unwrap().position, [400.0, 200.0]);

        effect.resize(&mut graph, Size::new(100.0, 50.0));
        assert_eq!(graph.node(effect.root).unwrap().position, [50.0, 25.0]);
    }

    #[test]
    fn calm_breath_depends_only_on_elapsed_time() {
        let size = Size::new(200.0, 200.0);
        let mut coarse_graph = RenderGraph::new();
        let mut coarse = CalmBreath::spawn(&mut coarse_graph, size);
        coarse.update(&mut coarse_graph, 500.0);

        let mut fine_graph = RenderGraph::new();
        let mut fine = CalmBreath::spawn(&mut fine_graph, size);
        for _ in 0..10 {
            fine.update(&mut fine_graph, 50.0);
        }

        let coarse_scale = coarse_graph.node(coarse.core).unwrap().scale;
        let fine_scale = fine_graph.node(fine.core).unwrap().scale;
        assert!((coarse_scale - fine_scale).abs() < 1e-4);
    }

    #[test]
    fn soft_pulse_rings_stay_in_range() {
        let mut graph = RenderGraph::new();
        let mut effect = SoftPulse::spawn(&mut graph, Size::new(300.0, 300.0));

        for _ in 0..120 {
            effect.update(&mut graph, 33.0);
            for ring in effect.rings {
                let node = graph.node(ring).unwrap();
                assert!((0.45..=1.6).contains(&node.scale));
                assert!((0.0..=0.75).contains(&node.alpha));
            }
        }
    }

    #[test]
    fn starfield_spawns_inside_the_surface() {
        let mut graph = RenderGraph::new();
        let size = Size::new(320.0, 180.0);
        let effect = seeded_starfield(&mut graph, size);

        assert_eq!(effect.stars.len(), STAR_COUNT);
        assert_eq!(graph.len(), STAR_COUNT + 1);
        for star in &effect.stars {
            let [x, y] = graph.node(star.node).unwrap().position;
            assert!((0.0..=size.width).contains(&x));
            assert!((0.0..=size.height).contains(&y));
        }
    }

    #[test]
    fn starfield_wraps_stars_around_edges() {
        let mut graph = RenderGraph::new();
        let size = Size::new(100.0, 100.0);
        let mut effect = seeded_starfield(&mut graph, size);

        for _ in 0..500 {
            effect.update(&mut graph, 40.0);
        }

        for star in &effect.stars {
            let [x, y] = graph.node(star.node).unwrap().position;
            assert!(x >= -STAR_MARGIN - 2.0 && x <= size.width + STAR_MARGIN);
            assert!(y >= -STAR_MARGIN && y <= size.height + STAR_MARGIN + 2.0);
        }
    }
}
