//! Presentational painters for levels and prerequisite paths.
//!
//! Everything here is a pure function of status, progress and time; the
//! canvas decides what to paint and in which order.

mod edge;
mod node;

pub(super) use edge::{EdgeEmphasis, paint_edge};
pub(super) use node::{NodeEmphasis, node_screen_radius, node_style, paint_node};
