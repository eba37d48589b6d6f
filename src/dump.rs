//! JSON export of a positioned diagram for external renderers and tooling.

use serde::Serialize;

use crate::model::LayoutedCompartment;

/// Top-level export document. The canvas size duplicates the root size so
/// consumers do not have to reach into the tree for it.
#[derive(Serialize)]
struct Document<'a> {
    width: f32,
    height: f32,
    root: &'a LayoutedCompartment,
}

/// Serialize a positioned tree to pretty-printed JSON.
pub fn to_json(root: &LayoutedCompartment) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Document {
        width: root.width,
        height: root.height,
        root,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec2;

    #[test]
    fn export_carries_canvas_size_and_tree() {
        let root = LayoutedCompartment {
            lines: vec!["title".to_string()],
            width: 120.0,
            height: 60.0,
            offset: Vec2::new(8.0, 8.0),
            x: 0.0,
            y: 0.0,
            nodes: Vec::new(),
            assocs: Vec::new(),
        };
        let text = to_json(&root).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["width"], 120.0);
        assert_eq!(value["height"], 60.0);
        assert_eq!(value["root"]["lines"][0], "title");
        assert_eq!(value["root"]["offset"]["x"], 8.0);
    }
}
