//! Draw-tree stencil planning: a pre/post-order walk
//! that assigns each node a stencil reference one greater than its parent's,
//! so nested clips nest correctly in the increment/decrement stencil pair.

use super::types::DrawCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TraversalEvent {
    Pre(usize),
    Post(usize),
}

pub(super) fn plan_traversal(
    draw_tree: &mut easy_tree::Tree<DrawCommand>,
    subtree_root: Option<usize>,
) -> (Vec<TraversalEvent>, ahash::HashMap<usize, u32>, ahash::HashMap<usize, u32>) {
    let mut stencil_refs: ahash::HashMap<usize, u32> = ahash::HashMap::default();
    let mut parent_stencils: ahash::HashMap<usize, u32> = ahash::HashMap::default();

    let mut plan_state: (Vec<u32>, Vec<TraversalEvent>) = (Vec::new(), Vec::new());

    let pre_fn = |node_id: usize, _draw_command: &mut DrawCommand, state: &mut (Vec<u32>, Vec<TraversalEvent>)| {
        let (stencil_stack, events) = state;
        let parent_stencil = stencil_stack.last().copied().unwrap_or(0);
        let this_stencil = parent_stencil + 1;
        parent_stencils.insert(node_id, parent_stencil);
        stencil_refs.insert(node_id, this_stencil);
        stencil_stack.push(this_stencil);
        events.push(TraversalEvent::Pre(node_id));
    };

    let post_fn = |node_id: usize, _draw_command: &mut DrawCommand, state: &mut (Vec<u32>, Vec<TraversalEvent>)| {
        let (stencil_stack, events) = state;
        stencil_stack.pop();
        events.push(TraversalEvent::Post(node_id));
    };

    match subtree_root {
        Some(root_id) => draw_tree.traverse_subtree_mut(root_id, pre_fn, post_fn, &mut plan_state),
        None => draw_tree.traverse_mut(pre_fn, post_fn, &mut plan_state),
    }

    (plan_state.1, stencil_refs, parent_stencils)
}

pub(super) fn compute_node_depth(tree: &easy_tree::Tree<DrawCommand>, node_id: usize) -> usize {
    let mut depth = 0;
    let mut current = node_id;
    while let Some(parent) = tree.parent_index_unchecked(current) {
        depth += 1;
        current = parent;
    }
    depth
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::types::PathDrawData;
    use crate::geometry::Mat2D;
    use crate::paint::RenderPaint;

    fn leaf(path_id: u64) -> DrawCommand {
        DrawCommand::Path(PathDrawData {
            path_id,
            fill_mesh: Vec::new(),
            stroke_mesh: None,
            paint: RenderPaint::default(),
            transform: Mat2D::IDENTITY,
            fill_range: None,
            stroke_range: None,
        })
    }

    #[test]
    fn compute_node_depth_returns_zero_for_root() {
        let mut tree = easy_tree::Tree::new();
        let root = tree.add_node(leaf(1));
        assert_eq!(compute_node_depth(&tree, root), 0);
    }

    #[test]
    fn plan_traversal_produces_balanced_events_and_stencil_refs() {
        let mut tree = easy_tree::Tree::new();
        let root = tree.add_node(leaf(1));
        let child = tree.add_child(root, leaf(2));
        let grandchild = tree.add_child(child, leaf(3));

        let (events, stencil_refs, parent_stencils) = plan_traversal(&mut tree, None);

        assert_eq!(events.len(), 6);
        assert_eq!(stencil_refs.get(&root), Some(&1));
        assert_eq!(stencil_refs.get(&child), Some(&2));
        assert_eq!(stencil_refs.get(&grandchild), Some(&3));
        assert_eq!(parent_stencils.get(&root), Some(&0));
        assert_eq!(parent_stencils.get(&child), Some(&1));
        assert_eq!(parent_stencils.get(&grandchild), Some(&2));
    }
}
