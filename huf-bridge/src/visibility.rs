use crate::surface::Surface;
use tracing::warn;

/// Result of a best-effort tree mutation.
///
/// The host boundary collapses this to nothing; it exists so callers and tests can tell a
/// clean mutation from a skipped or swallowed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeOutcome {
    Applied,
    /// Nothing to act on: unknown widget or parent.
    NotApplicable,
    /// The surface refused the mutation and the failure was swallowed.
    IgnoredFailure,
}

/// Marks `node` hidden and removes it from `parent`, keeping it alive.
pub fn detach<S: Surface>(
    surface: &mut S,
    node: &S::Node,
    parent: Option<&S::Node>,
    marker: &str,
) -> TreeOutcome {
    surface.set_attribute(node, marker, "false");

    let Some(parent) = parent else {
        return TreeOutcome::NotApplicable;
    };
    match surface.remove_child(parent, node) {
        Ok(()) => TreeOutcome::Applied,
        Err(e) => {
            warn!(error = %e, "detach ignored");
            TreeOutcome::IgnoredFailure
        }
    }
}

/// Reconnects `node` under `parent`.
///
/// With an index the node goes before the child currently at `index + 1`; when that child
/// does not exist (or the insertion is refused) the node is appended instead.
pub fn attach<S: Surface>(
    surface: &mut S,
    node: &S::Node,
    parent: &S::Node,
    index: Option<usize>,
    marker: &str,
) -> TreeOutcome {
    surface.set_attribute(node, marker, "true");

    if let Some(index) = index {
        let reference = index
            .checked_add(1)
            .and_then(|pos| surface.children(parent).into_iter().nth(pos));
        if let Some(reference) = reference {
            match surface.insert_before(parent, node, &reference) {
                Ok(()) => return TreeOutcome::Applied,
                Err(e) => warn!(error = %e, index, "positional attach failed, appending"),
            }
        }
    }

    match surface.append_child(parent, node) {
        Ok(()) => TreeOutcome::Applied,
        Err(e) => {
            warn!(error = %e, "attach ignored");
            TreeOutcome::IgnoredFailure
        }
    }
}
