//! Tidy tree positioning for fixed-size nodes (Reingold-Tilford style).
//!
//! Each subtree is summarized by its contour: per level, the leftmost and
//! rightmost node centers relative to the subtree root. Siblings are placed
//! left to right, each pushed right until its contour clears the accumulated
//! contour of the siblings before it by `separation`; the parent is then
//! centered over its first and last child.
//!
//! Both passes are iterative so very deep plans do not exhaust the stack.

use std::collections::{HashMap, VecDeque};

type Contour = VecDeque<(f32, f32)>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TidyPlacement {
    pub index: usize,
    pub parent: Option<usize>,
    /// Node center relative to the root center.
    pub center_x: f32,
    pub level: usize,
}

/// Places the subtree under `root`, pre-order. `children` must only yield
/// the nodes that take part in layout.
pub(crate) fn tidy_positions<'a, F>(root: usize, separation: f32, children: F) -> Vec<TidyPlacement>
where
    F: Fn(usize) -> &'a [usize],
{
    let mut order: Vec<(usize, Option<usize>, usize)> = Vec::new();
    let mut stack = vec![(root, None, 0usize)];
    while let Some((idx, parent, level)) = stack.pop() {
        order.push((idx, parent, level));
        for &child in children(idx).iter().rev() {
            stack.push((child, Some(idx), level + 1));
        }
    }

    let mut contours: HashMap<usize, Contour> = HashMap::new();
    let mut relative: HashMap<usize, f32> = HashMap::new();

    // Reverse pre-order visits every child before its parent.
    for &(idx, _, _) in order.iter().rev() {
        let kids = children(idx);
        let contour = match kids.split_first() {
            None => Contour::from([(0.0, 0.0)]),
            Some((&first, rest)) => {
                let mut acc = contours.remove(&first).unwrap_or_default();
                let mut positions = Vec::with_capacity(kids.len());
                positions.push(0.0f32);
                for &child in rest {
                    let next = contours.remove(&child).unwrap_or_default();
                    let shift = acc
                        .iter()
                        .zip(next.iter())
                        .map(|(placed, incoming)| placed.1 - incoming.0 + separation)
                        .fold(f32::MIN, f32::max);
                    merge_contour(&mut acc, &next, shift);
                    positions.push(shift);
                }
                let mid = (positions[0] + positions[positions.len() - 1]) / 2.0;
                for (&child, pos) in kids.iter().zip(positions) {
                    relative.insert(child, pos - mid);
                }
                if mid != 0.0 {
                    for level in acc.iter_mut() {
                        level.0 -= mid;
                        level.1 -= mid;
                    }
                }
                acc.push_front((0.0, 0.0));
                acc
            }
        };
        contours.insert(idx, contour);
    }

    let mut centers: HashMap<usize, f32> = HashMap::with_capacity(order.len());
    let mut placements = Vec::with_capacity(order.len());
    for (idx, parent, level) in order {
        let center_x = match parent {
            Some(parent) => {
                centers.get(&parent).copied().unwrap_or(0.0)
                    + relative.get(&idx).copied().unwrap_or(0.0)
            }
            None => 0.0,
        };
        centers.insert(idx, center_x);
        placements.push(TidyPlacement {
            index: idx,
            parent,
            center_x,
            level,
        });
    }
    placements
}

fn merge_contour(acc: &mut Contour, next: &Contour, shift: f32) {
    for (level, &(left, right)) in next.iter().enumerate() {
        match acc.get_mut(level) {
            Some(existing) => existing.1 = existing.1.max(right + shift),
            None => acc.push_back((left + shift, right + shift)),
        }
    }
}
