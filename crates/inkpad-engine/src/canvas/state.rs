//! CPU-side layout/access tracking for the canvas image.
//!
//! wgpu performs the actual memory barriers itself; this tracker is what lets
//! the canvas refuse uses its current state does not allow, and makes every
//! state change an explicit, logged, submitted step.

use bitflags::bitflags;
use thiserror::Error;

/// What the canvas image is currently laid out for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CanvasLayout {
    /// Freshly created or resized; contents are garbage.
    Undefined,
    ColorAttachment,
    /// Sampled by the presenter and the target of the ink pass.
    ShaderReadOnly,
    TransferSrc,
    TransferDst,
}

bitflags! {
    /// Memory accesses the last use of the image performed.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    pub struct CanvasAccess: u32 {
        const COLOR_ATTACHMENT_READ  = 1 << 0;
        const COLOR_ATTACHMENT_WRITE = 1 << 1;
        const SHADER_READ            = 1 << 2;
        const TRANSFER_READ          = 1 << 3;
        const TRANSFER_WRITE         = 1 << 4;
    }
}

/// Coarse pipeline stages a transition orders against.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PipelineStage {
    TopOfPipe,
    ColorAttachmentOutput,
    FragmentShader,
    Transfer,
    BottomOfPipe,
}

/// One recorded state change.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Transition {
    pub from_layout: CanvasLayout,
    pub to_layout: CanvasLayout,
    pub src_access: CanvasAccess,
    pub dst_access: CanvasAccess,
    pub src_stage: PipelineStage,
    pub dst_stage: PipelineStage,
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum CanvasStateError {
    #[error("canvas cannot {operation}: layout is {actual:?}, needs {expected:?}")]
    WrongLayout {
        operation: &'static str,
        expected: CanvasLayout,
        actual: CanvasLayout,
    },
    #[error("canvas cannot transition into {0:?}")]
    IllegalTarget(CanvasLayout),
}

/// Tracked state of the canvas image.
#[derive(Debug, Clone)]
pub struct CanvasState {
    layout: CanvasLayout,
    access: CanvasAccess,
    /// Transitions into `ShaderReadOnly` since the last create/clear.
    ready_transitions: u32,
    draws: u64,
}

impl CanvasState {
    pub fn new() -> Self {
        Self {
            layout: CanvasLayout::Undefined,
            access: CanvasAccess::empty(),
            ready_transitions: 0,
            draws: 0,
        }
    }

    #[inline]
    pub fn layout(&self) -> CanvasLayout {
        self.layout
    }

    #[inline]
    pub fn access(&self) -> CanvasAccess {
        self.access
    }

    #[inline]
    pub fn ready_transitions(&self) -> u32 {
        self.ready_transitions
    }

    /// Draws recorded since the last create/clear.
    #[inline]
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Forgets the contents (resize/recreate). Back to `Undefined`.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Validates a transition and returns the barrier to record. Does not
    /// change the tracked state; call [`commit`](Self::commit) once the
    /// barrier has executed.
    pub fn plan(
        &self,
        dst_access: CanvasAccess,
        to_layout: CanvasLayout,
        src_stage: PipelineStage,
        dst_stage: PipelineStage,
    ) -> Result<Transition, CanvasStateError> {
        if to_layout == CanvasLayout::Undefined {
            return Err(CanvasStateError::IllegalTarget(to_layout));
        }
        Ok(Transition {
            from_layout: self.layout,
            to_layout,
            src_access: self.access,
            dst_access,
            src_stage,
            dst_stage,
        })
    }

    pub fn commit(&mut self, t: Transition) {
        log::debug!(
            "canvas {:?} -> {:?} ({:?} -> {:?})",
            t.from_layout,
            t.to_layout,
            t.src_stage,
            t.dst_stage
        );
        if t.from_layout == CanvasLayout::Undefined {
            self.ready_transitions = 0;
            self.draws = 0;
        }
        if t.to_layout == CanvasLayout::ShaderReadOnly {
            self.ready_transitions += 1;
        }
        self.layout = t.to_layout;
        self.access = t.dst_access;
    }

    /// Marks the start of a clear: contents are discarded and the image is
    /// written as a color attachment.
    pub fn begin_clear(&mut self) {
        self.commit(Transition {
            from_layout: CanvasLayout::Undefined,
            to_layout: CanvasLayout::ColorAttachment,
            src_access: CanvasAccess::empty(),
            dst_access: CanvasAccess::COLOR_ATTACHMENT_WRITE,
            src_stage: PipelineStage::TopOfPipe,
            dst_stage: PipelineStage::ColorAttachmentOutput,
        });
    }

    /// Checks that `operation` may run in the current layout.
    pub fn require(
        &self,
        operation: &'static str,
        expected: CanvasLayout,
    ) -> Result<(), CanvasStateError> {
        if self.layout == expected {
            Ok(())
        } else {
            Err(CanvasStateError::WrongLayout {
                operation,
                expected,
                actual: self.layout,
            })
        }
    }

    /// Returns the image from an export copy to `ShaderReadOnly`. The image
    /// was ready before the export started, so this does not count as a new
    /// ready transition.
    pub fn end_export(&mut self) -> Result<(), CanvasStateError> {
        self.require("finish export", CanvasLayout::TransferSrc)?;
        log::debug!("canvas TransferSrc -> ShaderReadOnly (export done)");
        self.layout = CanvasLayout::ShaderReadOnly;
        self.access = CanvasAccess::SHADER_READ;
        Ok(())
    }

    /// Records `count` ink draws. The ink pass starts and ends in
    /// `ShaderReadOnly`, so the layout is unchanged.
    pub fn record_draws(&mut self, count: u64) -> Result<(), CanvasStateError> {
        self.require("draw", CanvasLayout::ShaderReadOnly)?;
        self.draws += count;
        self.access = CanvasAccess::COLOR_ATTACHMENT_WRITE | CanvasAccess::SHADER_READ;
        Ok(())
    }
}

impl Default for CanvasState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_ready(state: &mut CanvasState) {
        let t = state
            .plan(
                CanvasAccess::SHADER_READ,
                CanvasLayout::ShaderReadOnly,
                PipelineStage::ColorAttachmentOutput,
                PipelineStage::FragmentShader,
            )
            .unwrap();
        state.commit(t);
    }

    // ── draw legality ─────────────────────────────────────────────────────

    #[test]
    fn draw_refused_while_undefined() {
        let mut state = CanvasState::new();
        let err = state.record_draws(1).unwrap_err();
        assert_eq!(
            err,
            CanvasStateError::WrongLayout {
                operation: "draw",
                expected: CanvasLayout::ShaderReadOnly,
                actual: CanvasLayout::Undefined,
            }
        );
        assert_eq!(state.draws(), 0);
    }

    #[test]
    fn draw_refused_mid_clear() {
        let mut state = CanvasState::new();
        state.begin_clear();
        assert!(state.record_draws(1).is_err());
    }

    #[test]
    fn draws_follow_exactly_one_ready_transition_after_clear() {
        let mut state = CanvasState::new();
        state.begin_clear();
        to_ready(&mut state);

        for _ in 0..3 {
            state.record_draws(1000).unwrap();
        }

        assert_eq!(state.ready_transitions(), 1);
        assert_eq!(state.draws(), 3000);
        assert_eq!(state.layout(), CanvasLayout::ShaderReadOnly);
    }

    #[test]
    fn clear_resets_counters() {
        let mut state = CanvasState::new();
        state.begin_clear();
        to_ready(&mut state);
        state.record_draws(5).unwrap();

        state.begin_clear();
        assert_eq!(state.ready_transitions(), 0);
        assert_eq!(state.draws(), 0);
        to_ready(&mut state);
        assert_eq!(state.ready_transitions(), 1);
    }

    // ── transitions ───────────────────────────────────────────────────────

    #[test]
    fn cannot_transition_into_undefined() {
        let state = CanvasState::new();
        let err = state
            .plan(
                CanvasAccess::empty(),
                CanvasLayout::Undefined,
                PipelineStage::TopOfPipe,
                PipelineStage::BottomOfPipe,
            )
            .unwrap_err();
        assert_eq!(err, CanvasStateError::IllegalTarget(CanvasLayout::Undefined));
    }

    #[test]
    fn plan_does_not_mutate() {
        let state = CanvasState::new();
        let t = state
            .plan(
                CanvasAccess::TRANSFER_READ,
                CanvasLayout::TransferSrc,
                PipelineStage::FragmentShader,
                PipelineStage::Transfer,
            )
            .unwrap();
        assert_eq!(t.from_layout, CanvasLayout::Undefined);
        assert_eq!(state.layout(), CanvasLayout::Undefined);
    }

    #[test]
    fn export_round_trip_tracks_access() {
        let mut state = CanvasState::new();
        state.begin_clear();
        to_ready(&mut state);

        let t = state
            .plan(
                CanvasAccess::TRANSFER_READ,
                CanvasLayout::TransferSrc,
                PipelineStage::FragmentShader,
                PipelineStage::Transfer,
            )
            .unwrap();
        assert_eq!(t.src_access, CanvasAccess::SHADER_READ);
        state.commit(t);

        assert!(state.require("export", CanvasLayout::TransferSrc).is_ok());
        assert!(state.record_draws(1).is_err());
        assert_eq!(state.access(), CanvasAccess::TRANSFER_READ);
    }

    #[test]
    fn end_export_requires_transfer_src() {
        let mut state = CanvasState::new();
        state.begin_clear();
        to_ready(&mut state);

        let err = state.end_export().unwrap_err();
        assert!(matches!(
            err,
            CanvasStateError::WrongLayout {
                operation: "finish export",
                ..
            }
        ));
        assert_eq!(state.layout(), CanvasLayout::ShaderReadOnly);
    }

    #[test]
    fn draw_after_export_keeps_one_ready_transition() {
        let mut state = CanvasState::new();
        state.begin_clear();
        to_ready(&mut state);

        let t = state
            .plan(
                CanvasAccess::TRANSFER_READ,
                CanvasLayout::TransferSrc,
                PipelineStage::FragmentShader,
                PipelineStage::Transfer,
            )
            .unwrap();
        state.commit(t);
        state.end_export().unwrap();

        state.record_draws(1).unwrap();
        assert_eq!(state.ready_transitions(), 1);
        assert_eq!(state.layout(), CanvasLayout::ShaderReadOnly);
        assert_eq!(state.access(), CanvasAccess::COLOR_ATTACHMENT_WRITE | CanvasAccess::SHADER_READ);
    }
}
