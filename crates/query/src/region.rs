//! Projection of query matches onto contiguous slot ranges — the unit of
//! edit targeting.

use syntax::{PathWalker, RedNode};

use crate::query::{Query, QueryKind};

/// A contiguous run of slots inside one parent, produced by a query match.
#[derive(Clone)]
pub struct Region {
    parent: RedNode,
    parent_path: Vec<u32>,
    start_slot: u32,
    consumed: u32,
    first: Option<RedNode>,
    position: u32,
}

impl Region {
    pub fn parent(&self) -> &RedNode {
        &self.parent
    }

    /// Slot-index path from the root to the parent container.
    pub fn parent_path(&self) -> &[u32] {
        &self.parent_path
    }

    pub fn start_slot(&self) -> u32 {
        self.start_slot
    }

    /// Number of slots the match claimed; 0 for zero-width matches.
    pub fn consumed(&self) -> u32 {
        self.consumed
    }

    pub fn end_slot(&self) -> Option<u32> {
        (self.consumed > 0).then(|| self.start_slot + self.consumed - 1)
    }

    /// The node at the start slot, when one exists.
    pub fn first(&self) -> Option<&RedNode> {
        self.first.as_ref()
    }

    /// Absolute position where the region begins.
    pub fn position(&self) -> u32 {
        self.position
    }

    /// Absolute position just past the region's last claimed slot.
    pub fn position_after(&self) -> u32 {
        match self.end_slot().and_then(|last| self.parent.child(last as usize)) {
            Some(last) => last.end_position(),
            None => self.position,
        }
    }

    /// The red nodes in the claimed slots, in order; empty for zero-width
    /// regions.
    pub fn nodes(&self) -> impl Iterator<Item = RedNode> + use<> {
        let parent = self.parent.clone();
        let start = self.start_slot as usize;
        let end = start + self.consumed as usize;
        (start..end).filter_map(move |slot| parent.child(slot))
    }
}

impl std::fmt::Debug for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Region")
            .field("path", &self.parent_path)
            .field("start_slot", &self.start_slot)
            .field("consumed", &self.consumed)
            .field("position", &self.position)
            .finish()
    }
}

pub type RegionIter = Box<dyn Iterator<Item = Region>>;

impl Query {
    /// Projects every match under `root` to a region: one path-tracking walk,
    /// one `try_match` per node. Lazy, so `first()`-style consumers stop
    /// after the k-th match.
    pub fn resolve_regions(&self, root: &RedNode) -> RegionIter {
        match self.kind_ref() {
            QueryKind::First(inner) => Box::new(inner.resolve_regions(root).take(1)),
            QueryKind::Last(inner) => Box::new(inner.resolve_regions(root).last().into_iter()),
            QueryKind::Nth(inner, n) => Box::new(inner.resolve_regions(root).skip(*n).take(1)),
            QueryKind::Skip(inner, n) => Box::new(inner.resolve_regions(root).skip(*n)),
            QueryKind::Take(inner, n) => Box::new(inner.resolve_regions(root).take(*n)),
            QueryKind::Filter { inner, pred } => {
                let pred = pred.clone();
                Box::new(
                    inner
                        .resolve_regions(root)
                        .filter(move |region| region.first().is_some_and(|node| pred(node))),
                )
            }
            QueryKind::WithText { inner, filter } => {
                let filter = filter.clone();
                Box::new(inner.resolve_regions(root).filter(move |region| {
                    region
                        .first()
                        .and_then(|node| node.green().text())
                        .is_some_and(|text| filter.accepts(text))
                }))
            }
            // Navigation queries resolve to the region of their target node.
            QueryKind::Sibling { .. } | QueryKind::Parent(_) | QueryKind::Ancestor(_) | QueryKind::Boundary { .. } => {
                Box::new(self.select(root).filter_map(|target| region_of(&target)))
            }
            QueryKind::InnerContent(container) => Box::new(container.select(root).filter_map(|node| {
                if !node.green().is_container() {
                    return None;
                }
                let parent_path = path_of(&node)?;
                Some(Region {
                    position: node.inner_start_position(),
                    first: node.child(0),
                    start_slot: 0,
                    consumed: node.slot_count() as u32,
                    parent_path,
                    parent: node,
                })
            })),
            _ => Box::new(WalkRegions { walker: PathWalker::new(root.clone()), query: self.clone() }),
        }
    }
}

struct WalkRegions {
    walker: PathWalker,
    query: Query,
}

impl Iterator for WalkRegions {
    type Item = Region;

    fn next(&mut self) -> Option<Region> {
        while let Some(node) = self.walker.next() {
            // the root itself is not a slot in any parent
            let Some(slot) = node.slot_index() else { continue };
            if let Some(consumed) = self.query.try_match(&node) {
                let full = self.walker.path();
                let parent_path = full[..full.len() - 1].to_vec();
                return Some(Region {
                    parent: node.parent().expect("node has a slot index").clone(),
                    parent_path,
                    start_slot: slot,
                    consumed: consumed as u32,
                    position: node.position(),
                    first: Some(node),
                });
            }
        }
        None
    }
}

/// Region covering exactly `node` inside its parent.
fn region_of(node: &RedNode) -> Option<Region> {
    let parent = node.parent()?.clone();
    let slot = node.slot_index()?;
    let mut parent_path = path_of(node)?;
    parent_path.pop();
    Some(Region {
        parent,
        parent_path,
        start_slot: slot,
        consumed: 1,
        first: Some(node.clone()),
        position: node.position(),
    })
}

/// Slot-index path from the root to `node`; `None` if the chain crosses a
/// delimiter cursor.
fn path_of(node: &RedNode) -> Option<Vec<u32>> {
    let mut path = Vec::new();
    let mut current = node.clone();
    while let Some(parent) = current.parent().cloned() {
        path.push(current.slot_index()?);
        current = parent;
    }
    path.reverse();
    Some(path)
}
