//! Frame loop with an explicit start/stop lifecycle
//!
//! The host (bevy's schedule, or a test) calls `step` once per frame; a
//! stopped loop ignores steps so frames can be single-stepped deterministically.

use tracing::info;

use crate::viewer::{FramePose, Viewer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Stopped,
    Running,
}

/// One completed frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Frames completed since the loop was created, starting at 1
    pub index: u64,
    pub pose: FramePose,
}

#[derive(Debug, Clone, Default)]
pub struct RenderLoop {
    state: LoopState,
    frames: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        if self.state != LoopState::Running {
            info!(frames = self.frames, "Render loop started");
            self.state = LoopState::Running;
        }
    }

    pub fn stop(&mut self) {
        if self.state != LoopState::Stopped {
            info!(frames = self.frames, "Render loop stopped");
            self.state = LoopState::Stopped;
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advance `viewer` by one frame of `dt` seconds; `None` while stopped
    pub fn step(&mut self, viewer: &mut Viewer, dt: f32) -> Option<FrameInfo> {
        if !self.is_running() {
            return None;
        }
        let pose = viewer.advance_frame(dt);
        self.frames += 1;
        Some(FrameInfo {
            index: self.frames,
            pose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Viewport;
    use crate::config::GlobeConfig;
    use crate::station::StationCatalog;

    fn viewer() -> Viewer {
        Viewer::new(
            GlobeConfig::default(),
            &StationCatalog::default(),
            Viewport::new(640.0, 480.0),
        )
        .unwrap()
    }

    #[test]
    fn test_stopped_loop_does_not_advance() {
        let mut viewer = viewer();
        let mut render_loop = RenderLoop::new();
        assert_eq!(render_loop.state(), LoopState::Stopped);
        assert!(render_loop.step(&mut viewer, 0.016).is_none());
        assert_eq!(viewer.globe_rotation(), 0.0);
        assert_eq!(render_loop.frames(), 0);
    }

    #[test]
    fn test_single_stepping() {
        let mut viewer = viewer();
        let mut render_loop = RenderLoop::new();
        render_loop.start();

        let first = render_loop.step(&mut viewer, 0.016).unwrap();
        assert_eq!(first.index, 1);
        let second = render_loop.step(&mut viewer, 0.016).unwrap();
        assert_eq!(second.index, 2);
        assert!(second.pose.globe_rotation > first.pose.globe_rotation);

        render_loop.stop();
        let rotation = viewer.globe_rotation();
        assert!(render_loop.step(&mut viewer, 0.016).is_none());
        assert_eq!(viewer.globe_rotation(), rotation);

        // Restarting resumes the frame count
        render_loop.start();
        render_loop.start();
        assert_eq!(render_loop.step(&mut viewer, 0.016).unwrap().index, 3);
    }
}
