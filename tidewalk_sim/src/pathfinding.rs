// A* pathfinding over the tile grid.
//
// Stateless: every call builds its own open set, scores, and parent links
// and drops them on return. Movement is 4-directional with unit step cost;
// the heuristic is Manhattan distance, which is admissible and consistent
// for that move set, so a node is never improved after it is closed.
//
// The open set is a `BinaryHeap` (min-heap via reversed ordering, ties
// broken by insertion order so equal-`f` nodes come out first-in first-out).
// Best-known `g` per coordinate lives in a `BTreeMap`; a neighbor is only
// re-pushed when a path strictly better than its recorded `g` is found.
// Superseded heap entries are skipped when popped.
//
// Walkability is entirely the caller's business: `ChunkManager::find_path()`
// supplies generated grass plus the caller's own blockers. The map is
// unbounded, so `max_distance` caps how far a search may wander before
// giving up on a goal it cannot reach.
//
// **Critical constraint: determinism.** Same predicate, same endpoints,
// same path. No `HashMap`, no floats.

use crate::types::TileCoord;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};
use tracing::debug;

/// Default search depth, in steps.
pub const DEFAULT_MAX_DISTANCE: u32 = 100;

/// Entry in the A* open set (min-heap via reversed ordering).
struct OpenEntry {
    coord: TileCoord,
    f_score: u32,
    order: u64,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f_score == other.f_score && self.order == other.order
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap: smallest f_score, then oldest, is "greatest".
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| other.order.cmp(&self.order))
    }
}

/// Find a shortest path from `start` to `goal` with the default depth cap.
///
/// See `find_path_bounded`.
pub fn find_path<F>(start: TileCoord, goal: TileCoord, is_walkable: F) -> Option<Vec<TileCoord>>
where
    F: Fn(TileCoord) -> bool,
{
    find_path_bounded(start, goal, is_walkable, DEFAULT_MAX_DISTANCE)
}

/// Find a shortest path from `start` to `goal` using A*.
///
/// Returns the coordinates from start to goal inclusive, or `None` if the
/// goal tile is not walkable, no path exists, or every route is longer
/// than `max_distance` steps. `start == goal` always yields `[start]`.
/// The start tile itself is never tested for walkability.
pub fn find_path_bounded<F>(
    start: TileCoord,
    goal: TileCoord,
    is_walkable: F,
    max_distance: u32,
) -> Option<Vec<TileCoord>>
where
    F: Fn(TileCoord) -> bool,
{
    if start == goal {
        return Some(vec![start]);
    }
    if !is_walkable(goal) {
        return None;
    }

    // g_score[coord] = cost of cheapest known path from start to coord.
    let mut g_score: BTreeMap<TileCoord, u32> = BTreeMap::new();
    let mut came_from: BTreeMap<TileCoord, TileCoord> = BTreeMap::new();
    let mut closed: BTreeSet<TileCoord> = BTreeSet::new();
    let mut open = BinaryHeap::new();
    let mut order: u64 = 0;
    let mut depth_limited = false;

    g_score.insert(start, 0);
    open.push(OpenEntry {
        coord: start,
        f_score: start.manhattan_distance(goal),
        order,
    });

    while let Some(current) = open.pop() {
        if current.coord == goal {
            return Some(reconstruct_path(&came_from, start, goal));
        }

        if !closed.insert(current.coord) {
            continue;
        }

        let Some(&current_g) = g_score.get(&current.coord) else {
            continue;
        };
        if current_g >= max_distance {
            depth_limited = true;
            continue;
        }

        for neighbor in current.coord.neighbors() {
            if closed.contains(&neighbor) || !is_walkable(neighbor) {
                continue;
            }

            let tentative_g = current_g + 1;
            if g_score.get(&neighbor).is_some_and(|&g| g <= tentative_g) {
                continue;
            }

            g_score.insert(neighbor, tentative_g);
            came_from.insert(neighbor, current.coord);
            order += 1;
            open.push(OpenEntry {
                coord: neighbor,
                f_score: tentative_g.saturating_add(neighbor.manhattan_distance(goal)),
                order,
            });
        }
    }

    debug!(
        %start,
        %goal,
        visited = closed.len(),
        depth_limited,
        "no path found"
    );
    None
}

/// Pick the walkable tile orthogonally adjacent to `target` that is closest
/// (Manhattan) to `start`.
///
/// Candidates are checked left, right, up, down; the first of equally
/// close candidates wins. Returns `None` if none of the four is walkable.
pub fn find_nearest_orthogonal_position<F>(
    start: TileCoord,
    target: TileCoord,
    is_walkable: F,
) -> Option<TileCoord>
where
    F: Fn(TileCoord) -> bool,
{
    target
        .neighbors()
        .filter(|&candidate| is_walkable(candidate))
        .min_by_key(|candidate| candidate.manhattan_distance(start))
}

/// Walk parent links back from `goal` and reverse.
fn reconstruct_path(
    came_from: &BTreeMap<TileCoord, TileCoord>,
    start: TileCoord,
    goal: TileCoord,
) -> Vec<TileCoord> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        match came_from.get(&current) {
            Some(&prev) => {
                path.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    path.reverse();
    path
}
