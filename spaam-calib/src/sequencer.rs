/// What the display shows while waiting for the next confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    /// Every target is shown at once. A confirmation here is recorded against target 0.
    Grid,
    /// Only the target with this index is shown.
    Target(usize),
}

/// Walks through the alignment targets one confirmation at a time.
///
/// The sequence starts on [`TargetState::Grid`], visits every target and then
/// returns to the grid. It never finishes: each lap keeps adding alignments and
/// refining the solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSequencer {
    state: TargetState,
    targets: usize,
}

impl TargetSequencer {
    pub fn new(targets: usize) -> Self {
        Self {
            state: TargetState::Grid,
            targets,
        }
    }

    pub fn state(&self) -> TargetState {
        self.state
    }

    /// The target a confirmation in the current state belongs to.
    pub fn target_index(&self) -> usize {
        match self.state {
            TargetState::Grid => 0,
            TargetState::Target(index) => index,
        }
    }

    pub fn advance(&mut self) {
        let next = self.target_index() + 1;
        self.state = if next >= self.targets {
            TargetState::Grid
        } else {
            TargetState::Target(next)
        };
    }

    pub fn reset(&mut self) {
        self.state = TargetState::Grid;
    }
}
