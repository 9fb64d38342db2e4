/// Counts presented frames and reports the rate once per second.
///
/// Feed it the elapsed time of each frame; `tick` yields `Some(fps)` on the
/// first frame past each whole-second boundary.
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    frames: u32,
    window_start: f32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self, elapsed: f32) -> Option<u32> {
        self.frames += 1;
        if elapsed - self.window_start < 1.0 {
            return None;
        }

        let fps = self.frames;
        self.frames = 0;
        self.window_start = elapsed;
        Some(fps)
    }
}
