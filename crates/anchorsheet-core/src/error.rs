use crate::NodeId;

/// Errors raised by the sheet and its drag recognizer.
///
/// Every fallible operation validates its input before touching any state,
/// so an `Err` always leaves the recognizer and the controller untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    /// Illegal settle target, a second content child, or a capture request
    /// for a node outside the tracked container.
    InvalidArgument(String),
    /// The drag machinery was driven before any content was attached or
    /// before the container was laid out.
    PreconditionViolated(&'static str),
}

impl SheetError {
    pub(crate) fn not_a_child(node: NodeId, container: NodeId) -> Self {
        SheetError::InvalidArgument(format!(
            "node {node} is not a descendant of the tracked container {container}"
        ))
    }
}

impl std::fmt::Display for SheetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetError::InvalidArgument(reason) => write!(f, "invalid argument: {reason}"),
            SheetError::PreconditionViolated(reason) => {
                write!(f, "precondition violated: {reason}")
            }
        }
    }
}

impl std::error::Error for SheetError {}
