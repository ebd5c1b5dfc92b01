use thiserror::Error;

/// The only way the layout core refuses an input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("no nodes to lay out")]
    EmptyGraph,
}
