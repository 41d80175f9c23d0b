//! Drag-and-drop ordering for list nodes.

use serde::{Deserialize, Serialize};

/// Vertical extent of a rendered list element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub top: f64,
    pub height: f64,
}

impl Span {
    pub fn midpoint(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Slot among `siblings` where a dragged element lands: before the first
/// sibling whose midpoint lies below the pointer, else at the end.
pub fn drop_index(siblings: &[Span], pointer_y: f64) -> usize {
    siblings
        .iter()
        .position(|s| pointer_y < s.midpoint())
        .unwrap_or(siblings.len())
}

/// Order produced by dropping the element at position `dragged` of `order`.
///
/// `spans[i]` is the extent of `order[i]` before the drag. Returns `None`
/// when the inputs disagree in length or `dragged` is out of range.
pub fn drag_reorder(
    order: &[usize],
    dragged: usize,
    spans: &[Span],
    pointer_y: f64,
) -> Option<Vec<usize>> {
    if spans.len() != order.len() || dragged >= order.len() {
        return None;
    }
    let mut rest = order.to_vec();
    let moved = rest.remove(dragged);
    let siblings: Vec<Span> = spans
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != dragged)
        .map(|(_, s)| *s)
        .collect();
    let at = drop_index(&siblings, pointer_y).min(rest.len());
    rest.insert(at, moved);
    Some(rest)
}

/// Normalize an order read back from the page into a permutation of `0..len`.
///
/// Duplicates keep their first position, out-of-range entries are dropped,
/// and indices the page never mentioned are appended in their prior order.
pub fn canonical_order(live: &[usize], len: usize) -> Vec<usize> {
    let mut seen = vec![false; len];
    let mut order = Vec::with_capacity(len);
    for &index in live {
        if index < len && !seen[index] {
            seen[index] = true;
            order.push(index);
        }
    }
    order.extend((0..len).filter(|i| !seen[*i]));
    order
}

/// Rearrange `items` so that position `i` holds `items[order[i]]`.
pub fn apply_order<T: Clone>(items: &[T], order: &[usize]) -> Vec<T> {
    canonical_order(order, items.len())
        .into_iter()
        .map(|i| items[i].clone())
        .collect()
}

/// Move the element at `from` so it ends up at index `to` (clamped).
pub fn move_order(len: usize, from: usize, to: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    if from >= len {
        return order;
    }
    let moved = order.remove(from);
    order.insert(to.min(order.len()), moved);
    order
}
