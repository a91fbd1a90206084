use std::collections::VecDeque;

use eframe::egui::{Vec2, vec2};
use health_graph::{LayoutAlgorithm, LayoutConfig};

use crate::util::stable_pair;

pub(super) fn place(
    layout: &LayoutConfig,
    node_ids: &[String],
    edges: &[(usize, usize)],
    node_radii: &[f32],
) -> Vec<Vec2> {
    match layout.algorithm {
        LayoutAlgorithm::Breadthfirst => breadthfirst(node_ids, edges, node_radii, layout.padding),
        LayoutAlgorithm::ForceDirected => {
            force_layout(node_ids, edges, node_radii, layout.padding, layout.iterations)
        }
    }
}

/// Rows by BFS depth from the nodes without incoming edges. Nodes not
/// reachable from any such root start their own tree.
pub(super) fn breadthfirst(
    node_ids: &[String],
    edges: &[(usize, usize)],
    node_radii: &[f32],
    padding: f32,
) -> Vec<Vec2> {
    let n = node_ids.len();
    if n == 0 {
        return Vec::new();
    }

    let mut outgoing = vec![Vec::new(); n];
    let mut indegree = vec![0usize; n];
    for &(from, to) in edges {
        if from >= n || to >= n || from == to {
            continue;
        }
        outgoing[from].push(to);
        indegree[to] += 1;
    }

    let mut depth = vec![usize::MAX; n];
    let roots = (0..n)
        .filter(|&index| indegree[index] == 0)
        .chain(0..n)
        .collect::<Vec<_>>();
    for root in roots {
        if depth[root] != usize::MAX {
            continue;
        }
        depth[root] = 0;
        let mut queue = VecDeque::from([root]);
        while let Some(node) = queue.pop_front() {
            for &next in &outgoing[node] {
                if depth[next] == usize::MAX {
                    depth[next] = depth[node] + 1;
                    queue.push_back(next);
                }
            }
        }
    }

    let max_radius = node_radii.iter().copied().fold(6.0_f32, f32::max);
    let column_gap = (max_radius * 2.0) + 48.0 + padding;
    let row_gap = (max_radius * 2.0) + 72.0 + padding;

    let level_count = depth.iter().copied().max().unwrap_or(0) + 1;
    let mut levels = vec![Vec::new(); level_count];
    for (index, &level) in depth.iter().enumerate() {
        levels[level].push(index);
    }

    let mut positions = vec![Vec2::ZERO; n];
    let top = -((level_count - 1) as f32) * row_gap * 0.5;
    for (level, members) in levels.iter().enumerate() {
        let left = -((members.len().saturating_sub(1)) as f32) * column_gap * 0.5;
        for (slot, &index) in members.iter().enumerate() {
            positions[index] = vec2(
                left + slot as f32 * column_gap,
                top + level as f32 * row_gap,
            );
        }
    }

    positions
}

/// Spring embedding seeded from the breadthfirst rows, so the result keeps
/// the top-down reading of the graph while untangling crossings.
pub(super) fn force_layout(
    node_ids: &[String],
    edges: &[(usize, usize)],
    node_radii: &[f32],
    padding: f32,
    iterations: usize,
) -> Vec<Vec2> {
    let n = node_ids.len();
    let mut positions = breadthfirst(node_ids, edges, node_radii, padding);
    if n < 2 {
        return positions;
    }
    for (position, id) in positions.iter_mut().zip(node_ids) {
        let (jx, jy) = stable_pair(id);
        *position += vec2(jx, jy) * 12.0;
    }

    let links = edges
        .iter()
        .copied()
        .filter(|&(from, to)| from < n && to < n && from != to)
        .collect::<Vec<_>>();
    let spacing = node_radii.iter().copied().fold(6.0_f32, f32::max) * 2.0 + 48.0 + padding;
    let start_temperature = spacing;

    for step in 0..iterations {
        let mut disp = repulsion(&positions, node_radii, spacing, padding);
        for &(from, to) in &links {
            let delta = positions[from] - positions[to];
            let distance = delta.length().max(0.5);
            let pull = delta / distance * (distance * distance / spacing);
            disp[from] -= pull;
            disp[to] += pull;
        }

        let temperature = start_temperature * (1.0 - step as f32 / iterations as f32);
        let mut largest = 0.0_f32;
        for (position, displacement) in positions.iter_mut().zip(&disp) {
            let length = displacement.length();
            if length > 0.0 {
                let moved = length.min(temperature);
                *position += *displacement / length * moved;
                largest = largest.max(moved);
            }
        }
        if largest < 0.5 {
            break;
        }
    }

    recenter(&mut positions);
    positions
}

/// Inverse-distance push between every pair, plus a hard push for pairs
/// closer than their radii and `padding` allow.
fn repulsion(positions: &[Vec2], node_radii: &[f32], spacing: f32, padding: f32) -> Vec<Vec2> {
    let n = positions.len();
    let mut disp = vec![Vec2::ZERO; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let delta = positions[i] - positions[j];
            let distance = delta.length().max(0.5);
            let direction = delta / distance;

            let mut push = spacing * spacing / distance;
            let clearance = node_radii.get(i).copied().unwrap_or(24.0)
                + node_radii.get(j).copied().unwrap_or(24.0)
                + padding;
            if distance < clearance {
                push += (clearance - distance) * 2.0;
            }
            disp[i] += direction * push;
            disp[j] -= direction * push;
        }
    }
    disp
}

fn recenter(positions: &mut [Vec2]) {
    if positions.is_empty() {
        return;
    }
    let center = positions.iter().fold(Vec2::ZERO, |sum, &p| sum + p) / positions.len() as f32;
    for position in positions {
        *position -= center;
    }
}

/// Spot for a node that appears next to an already placed anchor, such as a
/// child revealed by expanding its parent.
pub(super) fn near(anchor: Vec2, id: &str, spread: f32) -> Vec2 {
    let (jx, jy) = stable_pair(id);
    let mut direction = vec2(jx, jy);
    if direction.length_sq() <= 0.0001 {
        direction = vec2(1.0, 0.0);
    }
    anchor + direction.normalized() * spread
}
