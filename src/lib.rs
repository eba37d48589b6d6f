//! Diagram layout engine: turns a tree of nested compartments, nodes, and
//! associations into a fully positioned geometric model with orthogonally
//! routed edge paths and placed labels.
//!
//! The pipeline is `apply_directives` (optional tree rewrites), then
//! [`layout`], then optionally [`dump::to_json`] for export. Text metrics
//! and inter-node graph placement are injected through the [`Measurer`] and
//! [`GraphLayout`] traits; [`FontMeasurer`] and [`DagreLayout`] are the
//! production implementations.

pub mod config;
pub mod directives;
pub mod dump;
pub mod geometry;
pub mod layout;
pub mod measure;
pub mod model;
pub mod style;

pub use config::{Config, Direction};
pub use directives::{Directive, DirectiveError, apply_directives};
pub use layout::{DagreLayout, GraphLayout, GraphResult, GraphSpec, layout};
pub use measure::{FontMeasurer, FontStyle, Measurer};
pub use model::{Association, Compartment, LayoutedCompartment, LayoutedNode, Node};
