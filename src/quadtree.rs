use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::list::List;
use crate::point::{Coord, CoordKey, Locate};
use crate::rect::{Quadrant, Rect, QUADRANTS};
use crate::{QuadtreeVisitor, Region};

/// Handle to a node of a [`Quadtree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(i32);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Leaf,
    Branch,
}

#[derive(Copy, Clone, Debug)]
struct Node {
    rect: Rect,
    depth: u32,
    // Index of the first of four consecutive children, or NO_CHILDREN for a leaf.
    first_child: i32,
    // Slot in the leaf storage, or NO_LEAF for a branch.
    leaf: i32,
    count: usize,
}

impl Node {
    const NO_CHILDREN: i32 = -1;
    const NO_LEAF: i32 = -1;

    fn is_leaf(&self) -> bool {
        self.first_child == Self::NO_CHILDREN
    }

    fn children(&self) -> std::ops::Range<i32> {
        self.first_child..self.first_child + 4
    }

    /// Pushes the children so that popping yields them in quadrant order.
    fn push_children(&self, to_process: &mut List<i32>) {
        for child in self.children().rev() {
            to_process.push(child);
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        Self {
            rect: Rect::default(),
            depth: 0,
            first_child: Self::NO_CHILDREN,
            leaf: Self::NO_LEAF,
            count: 0,
        }
    }
}

/// Point storage of a leaf.
///
/// `records` keeps every inserted value in insertion order. `buckets` counts
/// occurrences per distinct coordinate in first-seen order and is what the
/// capacity check looks at.
#[derive(Clone, Debug)]
struct Leaf<P> {
    records: Vec<P>,
    buckets: Vec<(Coord, usize)>,
    index: HashMap<CoordKey, usize>,
}

impl<P> Default for Leaf<P> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            buckets: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<P: Locate> Leaf<P> {
    fn push(&mut self, record: P) {
        let coord = record.coord();
        match self.index.get(&coord.key()) {
            Some(&bucket) => self.buckets[bucket].1 += 1,
            None => {
                self.index.insert(coord.key(), self.buckets.len());
                self.buckets.push((coord, 1));
            }
        }
        self.records.push(record);
    }

    fn distinct(&self) -> usize {
        self.buckets.len()
    }
}

/// A point quadtree.
///
/// Nodes live in a flat arena; the four children of a branch occupy
/// consecutive slots. Leaves split once they hold more than `capacity`
/// distinct coordinates. Nodes are never merged or removed.
#[derive(Clone, Debug)]
pub struct Quadtree<P> {
    capacity: usize,
    max_depth: u32,
    nodes: List<Node>,
    leaves: List<Leaf<P>>,
}

impl<P: Locate> Quadtree<P> {
    const ROOT: i32 = 0;

    /// Creates an empty tree over `rect` whose leaves hold up to `capacity`
    /// distinct coordinates.
    pub fn new(rect: Rect, capacity: usize) -> Result<Self> {
        Self::with_config(
            rect,
            &Config {
                capacity,
                ..Config::default()
            },
        )
    }

    pub fn with_config(rect: Rect, config: &Config) -> Result<Self> {
        if config.capacity == 0 {
            return Err(Error::InvalidCapacity);
        }
        let mut leaves = List::new();
        let leaf = leaves.insert(Leaf::default());
        let mut nodes = List::new();
        nodes.push(Node {
            rect,
            leaf,
            ..Node::default()
        });
        Ok(Self {
            capacity: config.capacity,
            max_depth: config.max_depth,
            nodes,
            leaves,
        })
    }

    /// Builds a tree over the bounding box of `points` with the default
    /// configuration and inserts every point in order.
    pub fn from_points<I>(points: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
    {
        Self::from_points_with(points, &Config::default())
    }

    pub fn from_points_with<I>(points: I, config: &Config) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
    {
        let points: Vec<P> = points.into_iter().collect();
        let rect = Rect::bounding(points.iter().map(|p| p.coord()))?;
        let mut tree = Self::with_config(rect, config)?;
        for point in points {
            tree.insert(point)?;
        }

        if tracing::enabled!(tracing::Level::DEBUG) {
            let stats = tree.stats();
            debug!(
                points = tree.len(),
                capacity = tree.capacity,
                leaves = stats.leaves,
                branches = stats.branches,
                depth = stats.max_depth,
                "built quadtree"
            );
        }
        Ok(tree)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn root(&self) -> NodeRef<'_, P> {
        NodeRef {
            tree: self,
            idx: Self::ROOT,
        }
    }

    pub fn node(&self, id: NodeId) -> Result<NodeRef<'_, P>> {
        if !self.nodes.contains(id.0) {
            return Err(Error::UnknownNode(id.0));
        }
        Ok(NodeRef {
            tree: self,
            idx: id.0,
        })
    }

    pub fn rect(&self) -> Rect {
        self.root().rect()
    }

    pub fn kind(&self) -> NodeKind {
        self.root().kind()
    }

    pub fn total_point_count(&self) -> usize {
        self.root().total_point_count()
    }

    pub fn len(&self) -> usize {
        self.total_point_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_coords<L: Locate>(&self, point: &L) -> bool {
        self.root().contains_coords(point)
    }

    /// Routes `record` down to the leaf owning its coordinate.
    ///
    /// Fails with [`Error::OutOfBounds`] when the coordinate lies outside the
    /// root rectangle; the tree is left untouched in that case.
    pub fn insert(&mut self, record: P) -> Result<()> {
        self.node_insert(Self::ROOT, record)
    }

    /// Inserts every record, skipping the ones that cannot be placed.
    ///
    /// Returns the input position and error of each rejected record.
    pub fn insert_all<I>(&mut self, records: I) -> Vec<(usize, Error)>
    where
        I: IntoIterator<Item = P>,
    {
        let mut rejected = Vec::new();
        for (position, record) in records.into_iter().enumerate() {
            if let Err(err) = self.insert(record) {
                warn!(position, %err, "rejected point");
                rejected.push((position, err));
            }
        }
        rejected
    }

    /// Turns the leaf `id` into a branch with four fresh leaves and re-homes
    /// its records. The point count of `id` does not change.
    pub fn subdivide(&mut self, id: NodeId) -> Result<()> {
        let node = *self.node(id)?.node();
        if !node.is_leaf() {
            return Err(Error::InvalidState);
        }
        self.split(id.0)
    }

    pub fn count_overlapping<R: Region + ?Sized>(&self, region: &R) -> usize {
        self.root().count_overlapping(region)
    }

    pub fn get_overlapping<R: Region + ?Sized>(&self, region: &R) -> Vec<&P> {
        self.root().get_overlapping(region)
    }

    pub fn all_points(&self) -> Vec<&P> {
        self.root().all_points()
    }

    pub fn walk(&self) -> Walk<'_, P> {
        self.root().walk()
    }

    /// Visits every branch and leaf depth-first, reporting each stored
    /// record after its leaf.
    pub fn traverse<V>(&self, visitor: &mut V)
    where
        V: QuadtreeVisitor<P>,
    {
        let mut to_process = List::<i32>::new();
        to_process.push(Self::ROOT);

        while let Some(idx) = to_process.pop() {
            let node = self.nodes.get(idx);
            if node.is_leaf() {
                visitor.leaf(node.depth, &node.rect, node.count);
                for record in &self.leaves.get(node.leaf).records {
                    visitor.record(record);
                }
            } else {
                visitor.branch(node.depth, &node.rect, node.count);
                node.push_children(&mut to_process);
            }
        }
    }

    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        self.traverse(&mut stats);
        stats
    }

    fn child_containing(&self, node: &Node, coord: Coord) -> Option<i32> {
        node.children()
            .find(|&child| self.nodes.get(child).rect.contains(coord))
    }

    fn node_insert(&mut self, start: i32, record: P) -> Result<()> {
        let coord = record.coord();
        if !self.nodes.get(start).rect.contains(coord) {
            return Err(Error::OutOfBounds {
                x: coord.x,
                y: coord.y,
            });
        }

        // Find the leaf first so counts only move once placement is certain.
        let mut path = List::<i32>::new();
        let mut idx = start;
        loop {
            path.push(idx);
            let node = *self.nodes.get(idx);
            if node.is_leaf() {
                break;
            }
            idx = self
                .child_containing(&node, coord)
                .ok_or(Error::OutOfBounds {
                    x: coord.x,
                    y: coord.y,
                })?;
        }
        while let Some(visited) = path.pop() {
            self.nodes.get_mut(visited).count += 1;
        }

        self.leaf_insert(idx, record);
        Ok(())
    }

    fn leaf_insert(&mut self, idx: i32, record: P) {
        let node = *self.nodes.get(idx);
        let leaf = self.leaves.get_mut(node.leaf);
        leaf.push(record);

        // If the leaf holds too many distinct coordinates, split it.
        if leaf.distinct() > self.capacity {
            if node.depth >= self.max_depth {
                debug!(
                    depth = node.depth,
                    rect = ?node.rect,
                    "leaf at maximum depth, not splitting"
                );
            } else if let Err(err) = self.split(idx) {
                warn!(%err, rect = ?node.rect, "leaf could not be split");
            }
        }
    }

    /// Replaces a leaf by four children and moves its records down.
    ///
    /// Fails without touching the tree when some record has no quadrant.
    fn split(&mut self, idx: i32) -> Result<()> {
        let node = *self.nodes.get(idx);
        let quadrants = node.rect.quadrants();
        let homeless = self
            .leaves
            .get(node.leaf)
            .buckets
            .iter()
            .find(|(coord, _)| !quadrants.iter().any(|q| q.contains(*coord)));
        if let Some(&(coord, _)) = homeless {
            return Err(Error::OutOfBounds {
                x: coord.x,
                y: coord.y,
            });
        }

        let records = self.leaves.erase(node.leaf).records;
        debug!(
            depth = node.depth,
            rect = ?node.rect,
            records = records.len(),
            "subdividing leaf"
        );

        // Initialize 4 child nodes in quadrant order.
        let mut first_child = Node::NO_CHILDREN;
        for rect in quadrants {
            let leaf = self.leaves.insert(Leaf::default());
            let child = self.nodes.push(Node {
                rect,
                depth: node.depth + 1,
                leaf,
                ..Node::default()
            });
            if first_child == Node::NO_CHILDREN {
                first_child = child;
            }
        }

        let branch = self.nodes.get_mut(idx);
        branch.first_child = first_child;
        branch.leaf = Node::NO_LEAF;
        let branch = *branch;

        // Transfer the records of the former leaf to its new children.
        for record in records {
            let coord = record.coord();
            let child = self
                .child_containing(&branch, coord)
                .ok_or(Error::OutOfBounds {
                    x: coord.x,
                    y: coord.y,
                })?;
            self.node_insert(child, record)?;
        }
        Ok(())
    }

    fn count_from<R: Region + ?Sized>(&self, start: i32, region: &R) -> usize {
        let mut total = 0;
        let mut to_process = List::<i32>::new();
        to_process.push(start);

        while let Some(idx) = to_process.pop() {
            let node = self.nodes.get(idx);
            if region.contains_rect(&node.rect) {
                // Every point below is inside.
                total += node.count;
            } else if region.intersects_rect(&node.rect) {
                if node.is_leaf() {
                    total += self
                        .leaves
                        .get(node.leaf)
                        .buckets
                        .iter()
                        .filter(|(coord, _)| region.contains_coord(*coord))
                        .map(|(_, frequency)| frequency)
                        .sum::<usize>();
                } else {
                    node.push_children(&mut to_process);
                }
            }
        }
        total
    }

    fn overlapping_from<'a, R: Region + ?Sized>(&'a self, start: i32, region: &R) -> Vec<&'a P> {
        let mut out = Vec::new();
        let mut to_process = List::<i32>::new();
        to_process.push(start);

        while let Some(idx) = to_process.pop() {
            let node = self.nodes.get(idx);
            if region.contains_rect(&node.rect) {
                self.collect_from(idx, &mut out);
            } else if region.intersects_rect(&node.rect) {
                if node.is_leaf() {
                    out.extend(
                        self.leaves
                            .get(node.leaf)
                            .records
                            .iter()
                            .filter(|record| region.contains_coord(record.coord())),
                    );
                } else {
                    node.push_children(&mut to_process);
                }
            }
        }
        out
    }

    fn collect_from<'a>(&'a self, start: i32, out: &mut Vec<&'a P>) {
        let mut to_process = List::<i32>::new();
        to_process.push(start);

        while let Some(idx) = to_process.pop() {
            let node = self.nodes.get(idx);
            if node.is_leaf() {
                out.extend(self.leaves.get(node.leaf).records.iter());
            } else {
                node.push_children(&mut to_process);
            }
        }
    }
}

/// Borrowed view of one node and the subtree below it.
#[derive(Debug)]
pub struct NodeRef<'a, P> {
    tree: &'a Quadtree<P>,
    idx: i32,
}

impl<P> Clone for NodeRef<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for NodeRef<'_, P> {}

impl<'a, P: Locate> NodeRef<'a, P> {
    fn node(&self) -> &'a Node {
        self.tree.nodes.get(self.idx)
    }

    fn leaf(&self) -> Option<&'a Leaf<P>> {
        let node = self.node();
        node.is_leaf().then(|| self.tree.leaves.get(node.leaf))
    }

    pub fn id(&self) -> NodeId {
        NodeId(self.idx)
    }

    pub fn is_root(&self) -> bool {
        self.idx == Quadtree::<P>::ROOT
    }

    pub fn rect(&self) -> Rect {
        self.node().rect
    }

    pub fn kind(&self) -> NodeKind {
        match self.node().is_leaf() {
            true => NodeKind::Leaf,
            false => NodeKind::Branch,
        }
    }

    pub fn depth(&self) -> u32 {
        self.node().depth
    }

    /// Points inserted at or below this node, repeats included.
    pub fn total_point_count(&self) -> usize {
        self.node().count
    }

    /// The four children in quadrant order, or `None` for a leaf.
    pub fn children(&self) -> Option<[NodeRef<'a, P>; 4]> {
        let node = self.node();
        if node.is_leaf() {
            return None;
        }
        let tree = self.tree;
        let fc = node.first_child;
        Some(QUADRANTS.map(|q| NodeRef {
            tree,
            idx: fc + q.index() as i32,
        }))
    }

    pub fn child(&self, quadrant: Quadrant) -> Option<NodeRef<'a, P>> {
        self.children().map(|children| children[quadrant.index()])
    }

    /// Records stored directly in this node. Empty for a branch.
    pub fn records(&self) -> &'a [P] {
        self.leaf().map(|leaf| leaf.records.as_slice()).unwrap_or(&[])
    }

    /// Distinct coordinates stored directly in this node with their
    /// occurrence counts, in first-seen order. Empty for a branch.
    pub fn distinct_coords(&self) -> &'a [(Coord, usize)] {
        self.leaf().map(|leaf| leaf.buckets.as_slice()).unwrap_or(&[])
    }

    pub fn contains_coords<L: Locate>(&self, point: &L) -> bool {
        self.node().rect.contains(point.coord())
    }

    pub fn count_overlapping<R: Region + ?Sized>(&self, region: &R) -> usize {
        self.tree.count_from(self.idx, region)
    }

    pub fn get_overlapping<R: Region + ?Sized>(&self, region: &R) -> Vec<&'a P> {
        self.tree.overlapping_from(self.idx, region)
    }

    pub fn all_points(&self) -> Vec<&'a P> {
        let mut out = Vec::with_capacity(self.total_point_count());
        self.tree.collect_from(self.idx, &mut out);
        out
    }

    pub fn walk(&self) -> Walk<'a, P> {
        let mut to_process = List::new();
        to_process.push(self.idx);
        Walk {
            tree: self.tree,
            to_process,
            buckets: Default::default(),
            current: None,
        }
    }
}

/// Lazy depth-first iterator over the coordinates of a subtree.
///
/// Each distinct coordinate of a leaf is yielded once per insertion.
#[derive(Debug)]
pub struct Walk<'a, P> {
    tree: &'a Quadtree<P>,
    to_process: List<i32>,
    buckets: std::slice::Iter<'a, (Coord, usize)>,
    current: Option<(Coord, usize)>,
}

impl<P: Locate> Iterator for Walk<'_, P> {
    type Item = Coord;

    fn next(&mut self) -> Option<Coord> {
        let tree = self.tree;
        loop {
            if let Some((coord, remaining)) = &mut self.current {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Some(*coord);
                }
            }
            if let Some(&bucket) = self.buckets.next() {
                self.current = Some(bucket);
                continue;
            }

            let node = tree.nodes.get(self.to_process.pop()?);
            if node.is_leaf() {
                self.buckets = tree.leaves.get(node.leaf).buckets.iter();
            } else {
                node.push_children(&mut self.to_process);
            }
        }
    }
}

/// Shape summary collected by [`Quadtree::stats`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub leaves: usize,
    pub branches: usize,
    pub max_depth: u32,
    pub records: usize,
}

impl<P> QuadtreeVisitor<P> for TreeStats {
    fn record(&mut self, _record: &P) {
        self.records += 1;
    }

    fn leaf(&mut self, depth: u32, _rect: &Rect, _count: usize) {
        self.leaves += 1;
        self.max_depth = self.max_depth.max(depth);
    }

    fn branch(&mut self, depth: u32, _rect: &Rect, _count: usize) {
        self.branches += 1;
        self.max_depth = self.max_depth.max(depth);
    }
}
