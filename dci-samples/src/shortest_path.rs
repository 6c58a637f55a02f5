//! Dijkstra's shortest path on a Manhattan street grid.
//!
//! Each visited intersection gets its own `CalculateShortestPath` context,
//! run through opaque dispatch from the previous one. The contexts of one
//! search share their bookkeeping, so the stack grows by one frame per
//! visited node and the route is assembled at the deepest frame.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use dci::context::context_ref;
use dci::dispatch::Executable;
use dci::engine::Engine;
use dci::errors::DciError;
use dci::role::{Role, RoleIdentity};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, trace};

/// Distance marking a node not yet reached.
pub const INFINITY: u32 = u32::MAX;

/// Errors raised by a path search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// No route connects the two nodes.
    #[error("No route from {from} to {to}")]
    Unreachable {
        /// Search origin.
        from: Node,
        /// Search destination.
        to: Node,
    },

    /// Two neighboring nodes have no distance recorded.
    #[error("No distance between {from} and {to}")]
    MissingEdge {
        /// First node.
        from: Node,
        /// Second node.
        to: Node,
    },

    /// The engine refused to run a context.
    #[error(transparent)]
    Engine(#[from] DciError),
}

/// An intersection, named by a single letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Node(pub char);

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl RoleIdentity for Node {
    fn same_player(&self, bound: &Self) -> bool {
        self == bound
    }

    fn describe(&self) -> String {
        format!("node {self}")
    }
}

/// Which way a street runs from a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Down the street.
    East,
    /// Along the avenue.
    South,
}

/// A grid of intersections where streets run east and avenues run south.
#[derive(Debug, Clone, Default)]
pub struct ManhattanGeometry {
    nodes: Vec<Node>,
    distances: HashMap<(Node, Node), u32>,
    east_neighbor_of: HashMap<Node, Node>,
    south_neighbor_of: HashMap<Node, Node>,
}

impl ManhattanGeometry {
    /// Creates a geometry with one node per letter and no streets.
    #[must_use]
    pub fn new(names: &str) -> Self {
        Self {
            nodes: names.chars().map(Node).collect(),
            ..Self::default()
        }
    }

    /// The 3x3 sample city.
    ///
    /// ```text
    /// a - 2 - b - 3 - c
    /// |       |       |
    /// 1       2       1
    /// |       |       |
    /// d - 1 - e - 1 - f
    /// |               |
    /// 2               4
    /// |               |
    /// g - 1 - h - 2 - i
    /// ```
    #[must_use]
    pub fn little_city() -> Self {
        Self::new("abcdefghi")
            .with_street('a', 'b', 2, Direction::East)
            .with_street('b', 'c', 3, Direction::East)
            .with_street('c', 'f', 1, Direction::South)
            .with_street('f', 'i', 4, Direction::South)
            .with_street('b', 'e', 2, Direction::South)
            .with_street('d', 'e', 1, Direction::East)
            .with_street('e', 'f', 1, Direction::East)
            .with_street('a', 'd', 1, Direction::South)
            .with_street('d', 'g', 2, Direction::South)
            .with_street('g', 'h', 1, Direction::East)
            .with_street('h', 'i', 2, Direction::East)
    }

    /// Adds a street of length `distance` running from `from` in `direction`.
    #[must_use]
    pub fn with_street(mut self, from: char, to: char, distance: u32, direction: Direction) -> Self {
        let (from, to) = (Node(from), Node(to));
        self.distances.insert((from, to), distance);
        match direction {
            Direction::East => self.east_neighbor_of.insert(from, to),
            Direction::South => self.south_neighbor_of.insert(from, to),
        };
        self
    }

    /// Returns every node.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns the street length from `a` to `b`.
    #[must_use]
    pub fn distance_between(&self, a: Node, b: Node) -> Option<u32> {
        self.distances.get(&(a, b)).copied()
    }

    /// Returns the next node down the street.
    #[must_use]
    pub fn east_of(&self, node: Node) -> Option<Node> {
        self.east_neighbor_of.get(&node).copied()
    }

    /// Returns the next node along the avenue.
    #[must_use]
    pub fn south_of(&self, node: Node) -> Option<Node> {
        self.south_neighbor_of.get(&node).copied()
    }
}

#[derive(Debug)]
struct SearchState {
    tentative: HashMap<Node, u32>,
    unvisited: BTreeSet<Node>,
    path_to: HashMap<Node, Node>,
    deepest: usize,
}

/// One step of the search, with `current` as the intersection being visited.
#[derive(Debug)]
pub struct CalculateShortestPath {
    origin: Node,
    destination: Node,
    current: Node,
    map: Role<ManhattanGeometry>,
    state: Arc<Mutex<SearchState>>,
}

impl CalculateShortestPath {
    /// Starts a search from `origin` to `destination` over `map`.
    #[must_use]
    pub fn new(origin: Node, destination: Node, map: Arc<ManhattanGeometry>) -> Self {
        let mut tentative: HashMap<Node, u32> =
            map.nodes().iter().map(|node| (*node, INFINITY)).collect();
        tentative.insert(origin, 0);
        let mut unvisited: BTreeSet<Node> = map.nodes().iter().copied().collect();
        unvisited.remove(&origin);

        Self {
            origin,
            destination,
            current: origin,
            map: Role::bind("map", map),
            state: Arc::new(Mutex::new(SearchState {
                tentative,
                unvisited,
                path_to: HashMap::new(),
                deepest: 0,
            })),
        }
    }

    /// Runs the search and returns the route, origin first.
    pub fn run(self: &Arc<Self>, engine: &Engine) -> Result<Vec<Node>, PathError> {
        engine.run(self, |ctx| ctx.calculate_path(engine))
    }

    /// Returns the tentative distance recorded for `node`.
    #[must_use]
    pub fn distance_to(&self, node: Node) -> Option<u32> {
        self.state
            .lock()
            .tentative
            .get(&node)
            .copied()
            .filter(|d| *d != INFINITY)
    }

    /// Returns the deepest stack depth reached by the search.
    #[must_use]
    pub fn deepest(&self) -> usize {
        self.state.lock().deepest
    }

    fn calculate_path(&self, engine: &Engine) -> Result<Vec<Node>, PathError> {
        let depth = engine.depth()?;
        {
            let mut state = self.state.lock();
            state.deepest = state.deepest.max(depth);
        }
        trace!(node = %self.current, depth, "Visiting intersection");

        let here = self.current.tentative_distance(engine)?;
        for neighbor in self.current.unvisited_neighbors(engine)? {
            let street = self
                .map
                .distance_between(self.current, neighbor)
                .ok_or(PathError::MissingEdge {
                    from: self.current,
                    to: neighbor,
                })?;
            if neighbor.relabel_as(engine, here.saturating_add(street))? {
                self.state.lock().path_to.insert(neighbor, self.current);
            }
        }

        self.state.lock().unvisited.remove(&self.current);

        match self.map.nearest_unvisited(engine)? {
            Some(next) => {
                let step = Arc::new(self.visiting(next));
                engine.run_opaque::<Vec<Node>, PathError>(context_ref(step))
            }
            None => self.generate_path(),
        }
    }

    fn visiting(&self, next: Node) -> Self {
        Self {
            origin: self.origin,
            destination: self.destination,
            current: next,
            map: self.map.clone(),
            state: Arc::clone(&self.state),
        }
    }

    fn generate_path(&self) -> Result<Vec<Node>, PathError> {
        let state = self.state.lock();
        let mut route = vec![self.destination];
        let mut node = self.destination;
        while node != self.origin {
            node = *state.path_to.get(&node).ok_or(PathError::Unreachable {
                from: self.origin,
                to: self.destination,
            })?;
            route.push(node);
        }
        route.reverse();

        debug!(
            from = %self.origin,
            to = %self.destination,
            hops = route.len() - 1,
            "Shortest path found"
        );
        Ok(route)
    }
}

impl Executable for CalculateShortestPath {
    type Output = Vec<Node>;
    type Error = PathError;

    fn execute(&self, engine: &Engine) -> Result<Vec<Node>, PathError> {
        self.calculate_path(engine)
    }
}

/// Behavior of the intersection being visited.
pub trait CurrentIntersection {
    /// Returns the south then east neighbors not yet visited.
    fn unvisited_neighbors(&self, engine: &Engine) -> Result<Vec<Node>, PathError>;
}

impl CurrentIntersection for Node {
    fn unvisited_neighbors(&self, engine: &Engine) -> Result<Vec<Node>, PathError> {
        let ctx = engine.current_bound::<CalculateShortestPath, _, _>(self, |c| &c.current)?;
        let state = ctx.state.lock();

        Ok([ctx.map.south_of(*self), ctx.map.east_of(*self)]
            .into_iter()
            .flatten()
            .filter(|node| state.unvisited.contains(node))
            .collect())
    }
}

/// Behavior of a node as part of the distance graph.
pub trait DistanceGraph {
    /// Returns the tentative distance from the origin.
    fn tentative_distance(&self, engine: &Engine) -> Result<u32, PathError>;

    /// Lowers the tentative distance to `distance` if that is shorter.
    /// Returns true if the node was relabeled.
    fn relabel_as(&self, engine: &Engine, distance: u32) -> Result<bool, PathError>;
}

impl DistanceGraph for Node {
    fn tentative_distance(&self, engine: &Engine) -> Result<u32, PathError> {
        let ctx = engine.current::<CalculateShortestPath>()?;
        let distance = ctx.state.lock().tentative.get(self).copied();
        Ok(distance.unwrap_or(INFINITY))
    }

    fn relabel_as(&self, engine: &Engine, distance: u32) -> Result<bool, PathError> {
        let ctx = engine.current::<CalculateShortestPath>()?;
        let mut state = ctx.state.lock();
        let tentative = state.tentative.entry(*self).or_insert(INFINITY);
        if distance < *tentative {
            *tentative = distance;
            return Ok(true);
        }
        Ok(false)
    }
}

/// Behavior of the city map.
pub trait CityMap {
    /// Returns the closest reached node that is still unvisited.
    fn nearest_unvisited(&self, engine: &Engine) -> Result<Option<Node>, PathError>;
}

impl CityMap for Role<ManhattanGeometry> {
    fn nearest_unvisited(&self, engine: &Engine) -> Result<Option<Node>, PathError> {
        let ctx = engine.current_bound::<CalculateShortestPath, _, _>(self, |c| &c.map)?;
        let state = ctx.state.lock();

        Ok(state
            .unvisited
            .iter()
            .filter_map(|node| {
                let distance = state.tentative.get(node).copied().unwrap_or(INFINITY);
                (distance != INFINITY).then_some((distance, *node))
            })
            .min()
            .map(|(_, node)| node))
    }
}
