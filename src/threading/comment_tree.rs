//! Comment tree reconstruction
//!
//! The upstream delivers comments as a flat list. The only hierarchy signal is
//! each comment's ancestry path (`0.12.57`): the second to last segment names
//! the direct parent, a single segment (or a parent of `0`) means top level.
//!
//! ## Algorithm
//!
//! 1. Every comment starts out unsettled
//! 2. Each pass tries to attach every unsettled comment under its parent,
//!    which succeeds once the parent itself has been attached
//! 3. Passes repeat until nothing is left or [`MAX_PASSES`] is reached
//! 4. Whatever is still unsettled is dropped and reported
//!
//! A child listed before its parent is simply picked up by a later pass, so the
//! input never needs sorting by depth. In practice threads settle in one to five
//! passes, each smaller than the last.
//!
//! Settled comments are kept in an ID index, so attaching is a hash lookup
//! rather than a walk of the tree built so far. When IDs repeat, the first
//! settled occurrence is the one later replies attach to.

use std::collections::HashMap;

use crate::models::Comment;

/// Hard cap on attachment passes.
pub const MAX_PASSES: usize = 50;

/// ID of the synthetic node every top-level comment hangs from.
pub const ROOT_ID: i64 = 0;

/// Result of building a comment tree.
#[derive(Debug, Clone, Default)]
pub struct CommentForest {
    /// Top-level comments, each owning its replies.
    pub roots: Vec<Comment>,
    /// IDs of comments whose parent never turned up.
    pub dropped: Vec<i64>,
    /// Number of attachment passes performed.
    pub passes: usize,
}

/// Direct parent named by an ancestry path.
///
/// Paths with a single segment, and paths whose parent segment is not a number,
/// resolve to [`ROOT_ID`].
pub fn parent_id(path: &str) -> i64 {
    let mut segments = path.rsplit('.');
    segments.next();
    segments
        .next()
        .and_then(|segment| segment.trim().parse::<i64>().ok())
        .unwrap_or(ROOT_ID)
}

/// Build a forest from a flat comment list.
///
/// Any `children` already present on the input are discarded; the builder is
/// the only thing that fills them in. Sibling order follows attachment order,
/// which for a well ordered input is the input order.
pub fn build_comment_tree(mut comments: Vec<Comment>) -> CommentForest {
    for comment in &mut comments {
        comment.children.clear();
    }

    let parent_ids: Vec<i64> = comments.iter().map(|c| parent_id(&c.path)).collect();

    // Settled comment ID -> slot in `comments`
    let mut settled: HashMap<i64, usize> = HashMap::with_capacity(comments.len());
    // (slot, parent slot) in settle order; `None` parent means top level
    let mut placements: Vec<(usize, Option<usize>)> = Vec::with_capacity(comments.len());

    let mut unsettled: Vec<usize> = (0..comments.len()).collect();
    let mut passes = 0;

    while !unsettled.is_empty() && passes < MAX_PASSES {
        passes += 1;
        let mut remaining = Vec::new();

        for slot in unsettled {
            let parent = parent_ids[slot];
            let target = if parent == ROOT_ID {
                Some(None)
            } else {
                settled.get(&parent).map(|&parent_slot| Some(parent_slot))
            };

            match target {
                Some(parent_slot) => {
                    placements.push((slot, parent_slot));
                    settled.entry(comments[slot].id).or_insert(slot);
                }
                None => remaining.push(slot),
            }
        }

        unsettled = remaining;
    }

    let dropped = unsettled.iter().map(|&slot| comments[slot].id).collect();
    let roots = assemble(comments, &placements);

    CommentForest {
        roots,
        dropped,
        passes,
    }
}

/// Move comments into their parents.
///
/// Walking placements backwards guarantees every reply is moved before its
/// parent, so each node is complete by the time it is moved itself. Children
/// arrive in reverse and are flipped once their parent is reached.
fn assemble(comments: Vec<Comment>, placements: &[(usize, Option<usize>)]) -> Vec<Comment> {
    let mut slots: Vec<Option<Comment>> = comments.into_iter().map(Some).collect();
    let mut roots = Vec::new();

    for &(slot, parent_slot) in placements.iter().rev() {
        let Some(mut comment) = slots[slot].take() else {
            continue;
        };
        comment.children.reverse();

        match parent_slot.and_then(|parent| slots[parent].as_mut()) {
            Some(parent) => parent.children.push(comment),
            None => roots.push(comment),
        }
    }

    roots.reverse();
    roots
}
