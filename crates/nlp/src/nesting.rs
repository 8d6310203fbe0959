//! Nesting depth of a derivation.
//!
//! Replays the links of an accepted derivation over the atom positions, left
//! to right, with an auxiliary stack: a position that closes the link opened
//! on top of the stack pops it, any other linked position pushes. The depth is
//! the highest the stack gets.

use std::collections::HashSet;

use crate::pregroup::Link;

/// Maximum number of simultaneously open links.
///
/// Links produced by the reduction engine never cross, so the result lies
/// between 0 and `links.len()`. Positions at or beyond `atom_count` are
/// ignored.
pub fn nesting_depth(links: &[Link], atom_count: usize) -> usize {
    let closing: HashSet<(usize, usize)> = links.iter().map(|l| (l.left, l.right)).collect();
    let linked: HashSet<usize> = links.iter().flat_map(|l| [l.left, l.right]).collect();

    let mut open: Vec<usize> = Vec::new();
    let mut depth = 0;
    for position in 0..atom_count {
        match open.last() {
            Some(&top) if closing.contains(&(top, position)) => {
                open.pop();
            }
            _ if linked.contains(&position) => open.push(position),
            _ => {}
        }
        depth = depth.max(open.len());
    }
    depth
}
