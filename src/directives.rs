//! Pre-layout tree rewrites driven by `pos` and `parent` directives. Both
//! accept a `;`-separated entry list; node names may be quoted to carry
//! spaces or `=` signs. Malformed or unresolvable entries are skipped with a
//! debug log so one bad directive never poisons the rest.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::model::{Compartment, Node};

/// A raw directive as a parser hands it over: `#pos: A=10,20` becomes
/// `key = "pos"`, `value = "A=10,20"`.
#[derive(Debug, Clone)]
pub struct Directive {
    pub key: String,
    pub value: String,
}

impl Directive {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DirectiveError {
    #[error("unknown node `{0}`")]
    UnknownNode(String),
    #[error("unknown parent `{0}`")]
    UnknownParent(String),
    #[error("parent `{1}` is inside the subtree of `{0}`")]
    CyclicParent(String, String),
}

static POS_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?:^|;)\s*(?:"([^"]+)"|([^=;]+?))\s*=\s*([+-]?\d+(?:\.\d+)?)\s*,\s*([+-]?\d+(?:\.\d+)?)"#,
    )
    .expect("pos entry pattern is valid")
});

static PARENT_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:^|;)\s*(?:"([^"]+)"|([^=;]+?))\s*=\s*(?:"([^"]+)"|([^;]+))"#)
        .expect("parent entry pattern is valid")
});

/// Apply all recognized directives to the tree. Unknown keys are ignored;
/// later entries for the same node override earlier ones.
pub fn apply_directives(root: &mut Compartment, directives: &[Directive]) {
    for directive in directives {
        match directive.key.trim().to_ascii_lowercase().as_str() {
            "pos" | "position" => apply_pos(root, &directive.value),
            "parent" => apply_parent(root, &directive.value),
            _ => {}
        }
    }
}

fn apply_pos(root: &mut Compartment, value: &str) {
    for captures in POS_ENTRY.captures_iter(value) {
        let id = captures
            .get(1)
            .or_else(|| captures.get(2))
            .map(|m| m.as_str().trim())
            .unwrap_or_default();
        let x: f32 = match captures[3].parse() {
            Ok(x) => x,
            Err(_) => continue,
        };
        let y: f32 = match captures[4].parse() {
            Ok(y) => y,
            Err(_) => continue,
        };
        if id.is_empty() || !set_position(root, id, x, y) {
            debug!("pos directive skipped: unknown node `{id}`");
        }
    }
}

fn set_position(part: &mut Compartment, id: &str, x: f32, y: f32) -> bool {
    let mut found = false;
    for node in &mut part.nodes {
        if node.id == id {
            node.attrs.x = Some(x);
            node.attrs.y = Some(y);
            found = true;
        }
        for child in &mut node.parts {
            found |= set_position(child, id, x, y);
        }
    }
    found
}

fn apply_parent(root: &mut Compartment, value: &str) {
    for captures in PARENT_ENTRY.captures_iter(value) {
        let child = captures
            .get(1)
            .or_else(|| captures.get(2))
            .map(|m| m.as_str().trim())
            .unwrap_or_default();
        let parent = captures
            .get(3)
            .or_else(|| captures.get(4))
            .map(|m| m.as_str().trim())
            .unwrap_or_default();
        if child.is_empty() || parent.is_empty() {
            continue;
        }
        if let Err(error) = reparent(root, child, parent) {
            debug!("parent directive skipped: {error}");
        }
    }
}

/// Move the node `child_id` into the title compartment of `parent_id`, or to
/// the root when `parent_id` is the literal `root` (case-insensitive).
/// Validation happens before any mutation so a rejected entry leaves the
/// tree untouched.
pub fn reparent(
    root: &mut Compartment,
    child_id: &str,
    parent_id: &str,
) -> Result<(), DirectiveError> {
    let to_root = parent_id.eq_ignore_ascii_case("root");

    let Some(child) = find_node(root, child_id) else {
        return Err(DirectiveError::UnknownNode(child_id.to_string()));
    };
    if !to_root {
        if child_id == parent_id || node_contains(child, parent_id) {
            return Err(DirectiveError::CyclicParent(
                child_id.to_string(),
                parent_id.to_string(),
            ));
        }
        if find_node(root, parent_id).is_none() {
            return Err(DirectiveError::UnknownParent(parent_id.to_string()));
        }
    }

    // Already in place: nothing to move.
    let destination_holds_child = if to_root {
        root.nodes.iter().any(|n| n.id == child_id)
    } else {
        find_node(root, parent_id)
            .and_then(|parent| parent.parts.first())
            .is_some_and(|part| part.nodes.iter().any(|n| n.id == child_id))
    };
    if destination_holds_child {
        return Ok(());
    }

    let Some(node) = take_node(root, child_id) else {
        return Err(DirectiveError::UnknownNode(child_id.to_string()));
    };
    if to_root {
        root.nodes.push(node);
        return Ok(());
    }
    let Some(parent) = find_node_mut(root, parent_id) else {
        // Unreachable after the checks above; keep the node rather than lose it.
        root.nodes.push(node);
        return Err(DirectiveError::UnknownParent(parent_id.to_string()));
    };
    if parent.parts.is_empty() {
        parent.parts.push(Compartment::default());
    }
    parent.parts[0].nodes.push(node);
    Ok(())
}

fn find_node<'a>(part: &'a Compartment, id: &str) -> Option<&'a Node> {
    for node in &part.nodes {
        if node.id == id {
            return Some(node);
        }
        for child in &node.parts {
            if let Some(found) = find_node(child, id) {
                return Some(found);
            }
        }
    }
    None
}

fn find_node_mut<'a>(part: &'a mut Compartment, id: &str) -> Option<&'a mut Node> {
    for node in &mut part.nodes {
        if node.id == id {
            return Some(node);
        }
        for child in &mut node.parts {
            if let Some(found) = find_node_mut(child, id) {
                return Some(found);
            }
        }
    }
    None
}

fn node_contains(node: &Node, id: &str) -> bool {
    node.parts
        .iter()
        .any(|part| find_node(part, id).is_some())
}

fn take_node(part: &mut Compartment, id: &str) -> Option<Node> {
    if let Some(index) = part.nodes.iter().position(|n| n.id == id) {
        return Some(part.nodes.remove(index));
    }
    for node in &mut part.nodes {
        for child in &mut node.parts {
            if let Some(found) = take_node(child, id) {
                return Some(found);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Compartment {
        let mut root = Compartment::default();
        let mut outer = Node::new("Outer", "class");
        outer.parts[0].nodes.push(Node::new("Inner", "class"));
        root.nodes.push(outer);
        root.nodes.push(Node::new("Free", "class"));
        root
    }

    #[test]
    fn pos_sets_coordinates_anywhere_in_the_tree() {
        let mut root = tree();
        apply_directives(
            &mut root,
            &[Directive::new("pos", "Free=10,20; Inner=-5,7.5")],
        );
        assert_eq!(root.nodes[1].attrs.x, Some(10.0));
        assert_eq!(root.nodes[1].attrs.y, Some(20.0));
        let inner = &root.nodes[0].parts[0].nodes[0];
        assert_eq!(inner.attrs.x, Some(-5.0));
        assert_eq!(inner.attrs.y, Some(7.5));
    }

    #[test]
    fn position_alias_and_key_case_are_accepted() {
        let mut root = tree();
        apply_directives(
            &mut root,
            &[
                Directive::new("Position", "Free=10,20"),
                Directive::new(" POS ", "Inner=1,2"),
            ],
        );
        assert_eq!(root.nodes[1].attrs.x, Some(10.0));
        assert_eq!(root.nodes[1].attrs.y, Some(20.0));
        let inner = &root.nodes[0].parts[0].nodes[0];
        assert_eq!(inner.attrs.x, Some(1.0));
        assert_eq!(inner.attrs.y, Some(2.0));
    }

    #[test]
    fn pos_with_quoted_name() {
        let mut root = Compartment::default();
        root.nodes.push(Node::new("a;b", "class"));
        apply_directives(&mut root, &[Directive::new("pos", "\"a;b\"=1,2")]);
        assert_eq!(root.nodes[0].attrs.x, Some(1.0));
    }

    #[test]
    fn pos_skips_unknown_and_malformed_entries() {
        let mut root = tree();
        apply_directives(
            &mut root,
            &[Directive::new("pos", "Missing=1,2; garbage; Free=3,4")],
        );
        assert_eq!(root.nodes[1].attrs.x, Some(3.0));
        assert_eq!(root.nodes[1].attrs.y, Some(4.0));
    }

    #[test]
    fn parent_moves_node_into_title_compartment() {
        let mut root = tree();
        apply_directives(&mut root, &[Directive::new("parent", "Free=Outer")]);
        assert_eq!(root.nodes.len(), 1);
        let outer_children = &root.nodes[0].parts[0].nodes;
        assert!(outer_children.iter().any(|n| n.id == "Free"));
    }

    #[test]
    fn parent_root_detaches_to_top_level() {
        let mut root = tree();
        apply_directives(&mut root, &[Directive::new("parent", "Inner=ROOT")]);
        assert!(root.nodes.iter().any(|n| n.id == "Inner"));
        assert!(root.nodes[0].parts[0].nodes.is_empty());
    }

    #[test]
    fn parent_rejects_cycles() {
        let mut root = tree();
        let result = reparent(&mut root, "Outer", "Inner");
        assert_eq!(
            result,
            Err(DirectiveError::CyclicParent(
                "Outer".to_string(),
                "Inner".to_string()
            ))
        );
        // Tree unchanged.
        assert_eq!(root.nodes.len(), 2);
        assert_eq!(root.nodes[0].parts[0].nodes.len(), 1);
    }

    #[test]
    fn parent_to_current_parent_is_a_no_op() {
        let mut root = tree();
        let result = reparent(&mut root, "Inner", "Outer");
        assert_eq!(result, Ok(()));
        assert_eq!(root.nodes[0].parts[0].nodes.len(), 1);
    }

    #[test]
    fn unknown_parent_is_reported() {
        let mut root = tree();
        assert_eq!(
            reparent(&mut root, "Free", "Nowhere"),
            Err(DirectiveError::UnknownParent("Nowhere".to_string()))
        );
    }
}
