//! Fixed-step accumulator for the physics group

/// Converts variable frame deltas into whole fixed steps.
///
/// At most `max_steps` steps are yielded per frame. Whole steps beyond that
/// are discarded so a long stall does not snowball into ever longer frames;
/// only the sub-step remainder carries over.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedStepper {
    step: f32,
    max_steps: u32,
    accumulator: f32,
}

impl FixedStepper {
    pub fn new(step: f32, max_steps: u32) -> Self {
        Self {
            step: if step > 0.0 { step } else { 1.0 / 50.0 },
            max_steps: max_steps.max(1),
            accumulator: 0.0,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    /// Add frame time and return how many fixed steps to run now
    pub fn accumulate(&mut self, delta_secs: f32) -> u32 {
        if delta_secs.is_finite() && delta_secs > 0.0 {
            self.accumulator += delta_secs;
        }

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps {
            self.accumulator -= self.step;
            steps += 1;
        }

        if self.accumulator >= self.step {
            let dropped = (self.accumulator / self.step).floor();
            tracing::debug!(dropped_steps = dropped, "Physics fell behind, dropping steps");
            // fmod is exact, so alpha stays in [0, 1)
            self.accumulator %= self.step;
        }
        steps
    }

    /// Fraction of a step left in the accumulator, for interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
