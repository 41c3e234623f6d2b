use anchorsheet_core::SheetError;

/// The discrete states of the sheet. Exactly one is current at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SheetState {
    /// The child follows the pointer.
    Dragging,
    /// A settle animation is moving the child toward a resting state.
    Settling,
    /// Top at the min offset.
    Expanded,
    /// Top at the max offset; only the peek height is visible.
    #[default]
    Collapsed,
    /// Top at the container height, reached by a downward fling.
    Hidden,
    /// Top at the anchor offset.
    Anchor,
    /// Top at the container height, requested programmatically.
    ForceHidden,
}

impl SheetState {
    /// True for every state the child can come to rest in.
    pub fn is_resting(self) -> bool {
        !matches!(self, SheetState::Dragging | SheetState::Settling)
    }

    pub fn as_i32(self) -> i32 {
        match self {
            SheetState::Dragging => 1,
            SheetState::Settling => 2,
            SheetState::Expanded => 3,
            SheetState::Collapsed => 4,
            SheetState::Hidden => 5,
            SheetState::Anchor => 6,
            SheetState::ForceHidden => 7,
        }
    }
}

impl TryFrom<i32> for SheetState {
    type Error = SheetError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => SheetState::Dragging,
            2 => SheetState::Settling,
            3 => SheetState::Expanded,
            4 => SheetState::Collapsed,
            5 => SheetState::Hidden,
            6 => SheetState::Anchor,
            7 => SheetState::ForceHidden,
            other => {
                return Err(SheetError::InvalidArgument(format!(
                    "unknown sheet state {other}"
                )))
            }
        })
    }
}

impl From<SheetState> for i32 {
    fn from(state: SheetState) -> Self {
        state.as_i32()
    }
}
