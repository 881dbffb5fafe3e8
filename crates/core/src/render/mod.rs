use std::collections::BTreeMap;

/// Width and height of the render surface in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> [f32; 2] {
        [self.width / 2.0, self.height / 2.0]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

/// Drawable primitive carried by a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Container whose transform applies to its children.
    Group,
    Circle { radius: f32 },
    Ring { radius: f32, stroke_width: f32 },
    Sprite { size: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub shape: Shape,
    pub color: u32,
    pub position: [f32; 2],
    pub scale: f32,
    pub alpha: f32,
    pub rotation: f32,
}

impl Node {
    fn new(parent: Option<NodeId>, shape: Shape, color: u32) -> Self {
        Self {
            parent,
            shape,
            color,
            position: [0.0, 0.0],
            scale: 1.0,
            alpha: 1.0,
            rotation: 0.0,
        }
    }
}

/// Retained node tree that visual effects attach to. The host draws it every
/// frame; the core only mutates it.
#[derive(Debug, Default)]
pub struct RenderGraph {
    nodes: BTreeMap<NodeId, Node>,
    next_id: u64,
}

impl RenderGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&mut self, parent: Option<NodeId>) -> NodeId {
        self.insert(Node::new(parent, Shape::Group, 0))
    }

    pub fn add_node(&mut self, parent: NodeId, shape: Shape, color: u32) -> NodeId {
        self.insert(Node::new(Some(parent), shape, color))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Removes `id` and every node below it. Returns how many nodes were
    /// dropped.
    pub fn remove(&mut self, id: NodeId) -> usize {
        if self.nodes.remove(&id).is_none() {
            return 0;
        }

        let children: Vec<_> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.parent == Some(id))
            .map(|(child, _)| *child)
            .collect();

        1 + children
            .into_iter()
            .map(|child| self.remove(child))
            .sum::<usize>()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in creation order, parents before their children.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }
}
