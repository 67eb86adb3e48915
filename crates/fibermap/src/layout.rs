//! Tree layout of the topology overview.
//!
//! Every node and cable block takes one group of rows. A node's first
//! outbound cable sits on the node's own row, one column to the right;
//! further cables start below the previous cable's subtree. A cable with a
//! single box shares its row with that box; with two or more boxes the boxes
//! start one group lower.
//!
//! Two kinds of vertical connector tie the blocks together:
//!
//! - a *branch* line in the node column, from just below a node with two or
//!   more outbound cables down to the row the last cable starts on;
//! - a *route* line in the cable column, from just below a cable with two or
//!   more boxes down to the row above the last box.
//!
//! Whether a connector is needed is decided before the node or cable is
//! drawn, but it can only be flushed once the start row of its last child is
//! known. The walk keeps pending connectors on an explicit task stack and
//! threads the row cursor through it, returning the next free row.

mod block;
mod columns;

pub use block::LayoutNode;
pub use columns::{ORIGIN_COLUMN, node_column, segment_column};

use std::collections::HashSet;

use log::{debug, info, trace, warn};

use fibermap_core::{
    draw::{RowSpan, StyleTag, Surface},
    identifier::Id,
    network::{CableSegment, Level, OriginPoint},
    repository::Repository,
};

use crate::{config::LayoutConfig, error::FibermapError};

/// What a laid-out span belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
    Origin,
    Box,
    Segment,
}

/// Rows occupied by one node or cable together with everything below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeSpan {
    pub code: Id,
    pub kind: SpanKind,
    pub column: u32,
    pub rows: RowSpan,
    /// The node or cable this one hangs off; `None` for origins.
    pub parent: Option<Id>,
}

/// Result of laying out one or more trees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutOutcome {
    /// First row not used by the layout.
    pub next_row: u32,
    /// Subtree spans, in the order they were completed.
    pub spans: Vec<NodeSpan>,
}

impl LayoutOutcome {
    /// Returns the span recorded for `code` and `kind`.
    pub fn span_of(&self, code: Id, kind: SpanKind) -> Option<&NodeSpan> {
        self.spans
            .iter()
            .find(|span| span.code == code && span.kind == kind)
    }

    /// Spans hanging directly off `parent`, in row order.
    pub fn children_of(&self, parent: Id) -> Vec<&NodeSpan> {
        let mut children: Vec<&NodeSpan> = self
            .spans
            .iter()
            .filter(|span| span.parent == Some(parent))
            .collect();
        children.sort_by_key(|span| span.rows);
        children
    }
}

/// Returns the first row of the branch line of `node`, or `None` if the node
/// has fewer than two outbound first segments.
///
/// `row` is the row the node block starts on.
///
/// # Errors
///
/// Propagates repository read failures.
pub fn needs_box_branch_line<R>(
    repository: &R,
    node: Id,
    via: Option<Id>,
    row: u32,
    config: &LayoutConfig,
) -> Result<Option<u32>, FibermapError>
where
    R: Repository + ?Sized,
{
    let branches = repository.get_first_segments(node, via)?.len();
    Ok((branches >= 2).then(|| row + config.group_rows()))
}

/// Returns the first row of the route line of `segment`, or `None` if its
/// section hosts fewer than two boxes.
///
/// `row` is the row the cable block starts on.
///
/// # Errors
///
/// Propagates repository read failures.
pub fn needs_segment_route_line<R>(
    repository: &R,
    segment: &CableSegment,
    row: u32,
    config: &LayoutConfig,
) -> Result<Option<u32>, FibermapError>
where
    R: Repository + ?Sized,
{
    let boxes = repository.get_boxes_on_section(segment.section)?.len();
    Ok((boxes >= 2).then(|| row + config.group_rows()))
}

/// A vertical connector waiting for the start row of the last child.
#[derive(Debug, Clone, Copy)]
struct PendingLine {
    column: u32,
    first_row: u32,
}

impl PendingLine {
    fn flush(self, last_row: u32, surface: &mut dyn Surface) {
        if last_row < self.first_row {
            return;
        }
        trace!(column = self.column, first = self.first_row, last = last_row; "Connector");
        surface.connect(RowSpan::new(self.first_row, last_row), self.column, StyleTag::Route);
    }
}

#[derive(Debug)]
enum Task {
    Node {
        node: LayoutNode,
        upper: Option<Level>,
        via: Option<Id>,
        parent: Option<Id>,
        /// Route line of the hosting cable, flushed above this node.
        route_line: Option<PendingLine>,
    },
    Segment {
        segment: CableSegment,
        upper: Option<Level>,
        parent: Id,
        /// Branch line of the parent node, flushed down to this cable.
        branch_line: Option<PendingLine>,
    },
    Close {
        code: Id,
        kind: SpanKind,
        column: u32,
        first_row: u32,
        parent: Option<Id>,
    },
}

/// Lays out distribution trees onto a [`Surface`].
pub struct TopologyLayout<'a, R: ?Sized> {
    repository: &'a R,
    config: &'a LayoutConfig,
}

impl<'a, R> TopologyLayout<'a, R>
where
    R: Repository + ?Sized,
{
    pub fn new(repository: &'a R, config: &'a LayoutConfig) -> Self {
        Self { repository, config }
    }

    /// Lays out every origin, ascending by code, starting at the configured first row.
    ///
    /// # Errors
    ///
    /// Propagates repository read failures.
    pub fn layout_all(&self, surface: &mut dyn Surface) -> Result<LayoutOutcome, FibermapError> {
        let roots = self.repository.get_root_nodes()?;
        info!(roots = roots.len(); "Laying out topology");

        let mut outcome = LayoutOutcome {
            next_row: self.config.first_row(),
            spans: Vec::new(),
        };
        for root in roots {
            let tree = self.layout_root(root, outcome.next_row, surface)?;
            outcome.next_row = tree.next_row;
            outcome.spans.extend(tree.spans);
        }

        info!(rows = outcome.next_row, blocks = outcome.spans.len(); "Topology laid out");
        Ok(outcome)
    }

    /// Lays out the tree of `root` starting at `row` and returns the next free row.
    ///
    /// # Errors
    ///
    /// Propagates repository read failures.
    pub fn layout_root(
        &self,
        root: OriginPoint,
        row: u32,
        surface: &mut dyn Surface,
    ) -> Result<LayoutOutcome, FibermapError> {
        debug!(root:% = root.code, row; "Laying out origin");
        self.run(
            Task::Node {
                node: LayoutNode::Origin(root),
                upper: None,
                via: None,
                parent: None,
                route_line: None,
            },
            row,
            surface,
        )
    }

    fn run(
        &self,
        first: Task,
        row: u32,
        surface: &mut dyn Surface,
    ) -> Result<LayoutOutcome, FibermapError> {
        let group = self.config.group_rows();
        let mut cursor = row;
        let mut spans = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![first];

        while let Some(task) = stack.pop() {
            match task {
                Task::Node {
                    node,
                    upper,
                    via,
                    parent,
                    route_line,
                } => {
                    if let Some(line) = route_line {
                        line.flush(cursor.saturating_sub(1), surface);
                    }
                    let code = node.code();
                    if !visited.insert(code) {
                        warn!(node:% = code; "Node reached twice, not drawn again");
                        continue;
                    }

                    let column = columns::node_column(upper);
                    let branch_start =
                        needs_box_branch_line(self.repository, code, via, cursor, self.config)?;
                    block::draw_node(surface, self.config, &node, cursor, column, branch_start.is_some());

                    let segments = self.repository.get_first_segments(code, via)?;
                    if segments.is_empty() {
                        let first_row = cursor;
                        cursor += group;
                        if node.is_origin() {
                            cursor += group;
                        }
                        spans.push(NodeSpan {
                            code,
                            kind: node_kind(&node),
                            column,
                            rows: RowSpan::new(first_row, cursor - 1),
                            parent,
                        });
                        continue;
                    }

                    stack.push(Task::Close {
                        code,
                        kind: node_kind(&node),
                        column,
                        first_row: cursor,
                        parent,
                    });
                    let last = segments.len() - 1;
                    for (idx, segment) in segments.into_iter().enumerate().rev() {
                        let branch_line = branch_start
                            .filter(|_| idx == last)
                            .map(|first_row| PendingLine { column, first_row });
                        stack.push(Task::Segment {
                            segment,
                            upper,
                            parent: code,
                            branch_line,
                        });
                    }
                }

                Task::Segment {
                    segment,
                    upper,
                    parent,
                    branch_line,
                } => {
                    if let Some(line) = branch_line {
                        line.flush(cursor, surface);
                    }

                    let column = columns::segment_column(segment.level);
                    let route_start =
                        needs_segment_route_line(self.repository, &segment, cursor, self.config)?;
                    block::draw_segment(
                        surface,
                        self.config,
                        &segment,
                        upper,
                        cursor,
                        route_start.is_some(),
                    );

                    let first_row = cursor;
                    let boxes = self.repository.get_boxes_on_section(segment.section)?;
                    if boxes.is_empty() {
                        cursor += group;
                        spans.push(NodeSpan {
                            code: segment.code,
                            kind: SpanKind::Segment,
                            column,
                            rows: RowSpan::new(first_row, cursor - 1),
                            parent: Some(parent),
                        });
                        continue;
                    }
                    if boxes.len() >= 2 {
                        cursor += group;
                    }

                    stack.push(Task::Close {
                        code: segment.code,
                        kind: SpanKind::Segment,
                        column,
                        first_row,
                        parent: Some(parent),
                    });
                    let last = boxes.len() - 1;
                    for (idx, b) in boxes.into_iter().enumerate().rev() {
                        let route_line = route_start
                            .filter(|_| idx == last)
                            .map(|first_row| PendingLine { column, first_row });
                        stack.push(Task::Node {
                            node: LayoutNode::Box(b),
                            upper: Some(segment.level),
                            via: Some(segment.section),
                            parent: Some(segment.code),
                            route_line,
                        });
                    }
                }

                Task::Close {
                    code,
                    kind,
                    column,
                    first_row,
                    parent,
                } => {
                    let last_row = cursor.max(first_row + 1) - 1;
                    spans.push(NodeSpan {
                        code,
                        kind,
                        column,
                        rows: RowSpan::new(first_row, last_row),
                        parent,
                    });
                }
            }
        }

        Ok(LayoutOutcome {
            next_row: cursor,
            spans,
        })
    }
}

fn node_kind(node: &LayoutNode) -> SpanKind {
    if node.is_origin() {
        SpanKind::Origin
    } else {
        SpanKind::Box
    }
}
