//! Shield animation phases and the frame queue they fill.
//!
//! The sequencer walks `Impact → WindUp → Hold → LandUp → Fade → Done`,
//! emitting exactly the configured number of frames per phase:
//!
//! - **Impact**: the untouched ring bank (optional lead-in frame).
//! - **WindUp**: every ring is scaled by its evolution factors, then drawn.
//! - **Hold**: the previous frame again.
//! - **LandUp**: one wind-up step is undone per tick while any remain, then holds.
//! - **Fade**: tick `k` of `n` draws the current rings at opacity `1 - (k+1)/n`.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use bevy::log::debug;

use crate::types::ShieldError;

use super::raster::{ShieldFrame, ShieldRaster, ShieldRasterizer};
use super::rings::{PaintTable, RingBank};

/// Frames per animation phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameCounts {
    /// Draw the un-evolved ring bank once before wind-up.
    pub impact_frame: bool,
    pub wind_up: u32,
    pub hold: u32,
    pub land_up: u32,
    pub fade: u32,
}

impl Default for FrameCounts {
    fn default() -> Self {
        Self::new(5, 0, 0, 0)
    }
}

impl FrameCounts {
    pub fn new(wind_up: u32, hold: u32, land_up: u32, fade: u32) -> Self {
        Self {
            impact_frame: false,
            wind_up,
            hold,
            land_up,
            fade,
        }
    }

    pub fn with_impact_frame(mut self, impact_frame: bool) -> Self {
        self.impact_frame = impact_frame;
        self
    }

    /// Frames configured for `phase`.
    pub fn count(&self, phase: AnimationPhase) -> u32 {
        match phase {
            AnimationPhase::Impact => self.impact_frame as u32,
            AnimationPhase::WindUp => self.wind_up,
            AnimationPhase::Hold => self.hold,
            AnimationPhase::LandUp => self.land_up,
            AnimationPhase::Fade => self.fade,
            AnimationPhase::Done => 0,
        }
    }

    /// Frame pairs across all phases.
    pub fn total(&self) -> usize {
        AnimationPhase::ORDER
            .iter()
            .map(|&phase| self.count(phase) as usize)
            .sum()
    }
}

/// Animation phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationPhase {
    Impact,
    WindUp,
    Hold,
    LandUp,
    Fade,
    /// Terminal: no more frames.
    Done,
}

impl AnimationPhase {
    const ORDER: [AnimationPhase; 5] = [
        AnimationPhase::Impact,
        AnimationPhase::WindUp,
        AnimationPhase::Hold,
        AnimationPhase::LandUp,
        AnimationPhase::Fade,
    ];

    pub fn next(self) -> Self {
        match self {
            AnimationPhase::Impact => AnimationPhase::WindUp,
            AnimationPhase::WindUp => AnimationPhase::Hold,
            AnimationPhase::Hold => AnimationPhase::LandUp,
            AnimationPhase::LandUp => AnimationPhase::Fade,
            AnimationPhase::Fade | AnimationPhase::Done => AnimationPhase::Done,
        }
    }
}

/// Live animation state threaded through the phase transitions.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationState {
    pub phase: AnimationPhase,
    /// Tick within the current phase.
    pub tick: u32,
    pub rings: RingBank,
    /// Wind-up steps applied and not yet undone.
    wound_up: u32,
}

impl AnimationState {
    pub fn new(rings: RingBank) -> Self {
        Self {
            phase: AnimationPhase::Impact,
            tick: 0,
            rings,
            wound_up: 0,
        }
    }

    /// Move past every phase whose frames are used up.
    fn settle(&mut self, counts: &FrameCounts) {
        while self.phase != AnimationPhase::Done && self.tick >= counts.count(self.phase) {
            self.phase = self.phase.next();
            self.tick = 0;
        }
    }
}

/// Shared flag to abandon a multi-frame build.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Destructive FIFO of rendered frames.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameQueue {
    frames: VecDeque<ShieldFrame>,
}

impl FrameQueue {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn push(&mut self, frame: ShieldFrame) {
        self.frames.push_back(frame);
    }

    pub fn pop(&mut self) -> Option<ShieldFrame> {
        self.frames.pop_front()
    }

    /// Next single image: front and back halves alternate.
    pub fn pop_half(&mut self) -> Option<ShieldRaster> {
        let frame = self.frames.front_mut()?;
        if frame.front.pixels().is_empty() {
            let frame = self.frames.pop_front()?;
            Some(frame.back)
        } else {
            Some(std::mem::replace(&mut frame.front, ShieldRaster::new(0, 0)))
        }
    }
}

impl Iterator for FrameQueue {
    type Item = ShieldFrame;

    fn next(&mut self) -> Option<ShieldFrame> {
        self.pop()
    }
}

/// Evolves the ring bank tick by tick and renders each tick's frame.
#[derive(Clone, Debug)]
pub struct AnimationSequencer {
    counts: FrameCounts,
    state: AnimationState,
    paint_length: usize,
    last: Option<ShieldFrame>,
}

impl AnimationSequencer {
    pub fn new(counts: FrameCounts, rings: RingBank, paint_length: usize) -> Self {
        let mut state = AnimationState::new(rings);
        state.settle(&counts);
        Self {
            counts,
            state,
            paint_length,
            last: None,
        }
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn is_done(&self) -> bool {
        self.state.phase == AnimationPhase::Done
    }

    fn paint(&self) -> PaintTable {
        PaintTable::build(self.state.rings.rings(), self.paint_length)
    }

    fn draw(&self, rasterizer: &ShieldRasterizer) -> ShieldFrame {
        rasterizer.render(&self.paint())
    }

    fn repeat(&self, rasterizer: &ShieldRasterizer) -> ShieldFrame {
        match &self.last {
            Some(frame) => frame.clone(),
            None => self.draw(rasterizer),
        }
    }

    /// Render the next frame, or `None` once every phase is exhausted.
    pub fn step(&mut self, rasterizer: &ShieldRasterizer) -> Option<ShieldFrame> {
        let frame = match self.state.phase {
            AnimationPhase::Done => return None,
            AnimationPhase::Impact => self.draw(rasterizer),
            AnimationPhase::WindUp => {
                self.state.rings.evolve();
                self.state.wound_up += 1;
                self.draw(rasterizer)
            }
            AnimationPhase::Hold => self.repeat(rasterizer),
            AnimationPhase::LandUp if self.state.wound_up > 0 => {
                self.state.rings.devolve();
                self.state.wound_up -= 1;
                self.draw(rasterizer)
            }
            AnimationPhase::LandUp => self.repeat(rasterizer),
            AnimationPhase::Fade => {
                let total = self.counts.fade as f32;
                let mut paint = self.paint();
                paint.fade(1.0 - (self.state.tick + 1) as f32 / total);
                rasterizer.render(&paint)
            }
        };

        self.state.tick += 1;
        self.state.settle(&self.counts);
        self.last = Some(frame.clone());
        Some(frame)
    }

    /// Render every remaining frame into a queue, checking `cancel` between frames.
    pub fn run(
        mut self,
        rasterizer: &ShieldRasterizer,
        cancel: &CancelToken,
    ) -> Result<FrameQueue, ShieldError> {
        let mut queue = FrameQueue::default();
        loop {
            if cancel.is_cancelled() {
                return Err(ShieldError::Cancelled);
            }
            let phase = self.state.phase;
            let tick = self.state.tick;
            let started = Instant::now();
            let Some(frame) = self.step(rasterizer) else {
                break;
            };
            debug!(
                "Shield frame {:?}#{} rendered in {:.1} ms",
                phase,
                tick,
                started.elapsed().as_secs_f64() * 1000.0
            );
            queue.push(frame);
        }
        Ok(queue)
    }
}
