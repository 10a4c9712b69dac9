use thiserror::Error;

/// Lifecycle of the presentation pipeline.
///
/// `Created → SurfaceBound → [Rendering ⇄ Resizing] → Terminated`
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PresentPhase {
    Created,
    SurfaceBound,
    Rendering,
    Resizing,
    Terminated,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PhaseEvent {
    BindSurface,
    Render,
    BeginResize,
    FinishResize,
    Terminate,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
#[error("presenter cannot handle {event:?} while {from:?}")]
pub struct PhaseError {
    pub from: PresentPhase,
    pub event: PhaseEvent,
}

impl PresentPhase {
    pub fn next(self, event: PhaseEvent) -> Result<PresentPhase, PhaseError> {
        use PhaseEvent as E;
        use PresentPhase as P;

        let to = match (self, event) {
            (P::Terminated, _) => None,
            (_, E::Terminate) => Some(P::Terminated),
            (P::Created, E::BindSurface) => Some(P::SurfaceBound),
            (P::SurfaceBound | P::Rendering, E::Render) => Some(P::Rendering),
            (P::SurfaceBound | P::Rendering, E::BeginResize) => Some(P::Resizing),
            (P::Resizing, E::FinishResize) => Some(P::Rendering),
            _ => None,
        };

        to.ok_or(PhaseError { from: self, event })
    }

    /// Whether the surface exists and frames may be produced.
    pub fn is_live(self) -> bool {
        matches!(self, PresentPhase::SurfaceBound | PresentPhase::Rendering)
    }
}
