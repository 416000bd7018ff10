//! Terminal display surface.
//!
//! [`TerminalSurface`] keeps the rendered ticker and its opacity in shared
//! state. Fades step the opacity on the tokio clock; the runtime picks up
//! each change through [`TerminalSurface::snapshot`] and redraws.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use ticker_core::presenter::{Rendered, Surface};
use tokio::time::{self, Instant};

/// Time between two opacity steps (about one frame).
pub const FADE_STEP: Duration = Duration::from_millis(16);

/// What the surface currently shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Display {
    pub content: Option<Rendered>,
    /// `0.0` is invisible, `1.0` fully visible.
    pub opacity: f32,
    /// Incremented on every change.
    pub revision: u64,
}

#[derive(Clone, Default)]
pub struct TerminalSurface {
    display: Arc<Mutex<Display>>,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Display {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Display> {
        self.display.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_opacity(&self, opacity: f32) {
        let mut display = self.lock();
        display.opacity = opacity.clamp(0.0, 1.0);
        display.revision += 1;
    }

    /// Moves the opacity linearly from its current value to `target`.
    async fn animate(&self, target: f32, duration: Duration) {
        let from = self.lock().opacity;
        if duration.is_zero() {
            self.set_opacity(target);
            return;
        }

        let started = Instant::now();
        loop {
            let elapsed = started.elapsed();
            let progress = (elapsed.as_secs_f32() / duration.as_secs_f32()).min(1.0);
            self.set_opacity(from + (target - from) * progress);
            if progress >= 1.0 {
                return;
            }
            time::sleep(FADE_STEP.min(duration.saturating_sub(elapsed))).await;
        }
    }
}

impl Surface for TerminalSurface {
    fn fade_out(&self, duration: Duration) -> BoxFuture<'_, ()> {
        self.animate(0.0, duration).boxed()
    }

    fn set_content(&self, content: Rendered) {
        let mut display = self.lock();
        display.content = Some(content);
        display.revision += 1;
    }

    fn fade_in(&self, duration: Duration) -> BoxFuture<'_, ()> {
        self.animate(1.0, duration).boxed()
    }
}

#[cfg(test)]
mod tests {
    use ticker_core::Ticker;
    use ticker_core::presenter::render;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fade_in_reaches_full_opacity() {
        let surface = TerminalSurface::new();
        surface.fade_in(Duration::from_millis(200)).await;
        assert!((surface.snapshot().opacity - 1.0).abs() < f32::EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fade_is_gradual() {
        let surface = TerminalSurface::new();
        let fading = surface.clone();
        let task = tokio::spawn(async move { fading.fade_in(Duration::from_secs(1)).await });

        time::sleep(Duration::from_millis(500)).await;
        let halfway = surface.snapshot().opacity;
        assert!(halfway > 0.3 && halfway < 0.7, "opacity was {halfway}");

        task.await.unwrap();
        assert!((surface.snapshot().opacity - 1.0).abs() < f32::EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_duration_fade_jumps() {
        let surface = TerminalSurface::new();
        surface.fade_in(Duration::ZERO).await;
        surface.fade_out(Duration::ZERO).await;
        let display = surface.snapshot();
        assert!(display.opacity.abs() < f32::EPSILON);
        assert_eq!(display.revision, 2);
    }

    #[test]
    fn test_set_content_bumps_revision() {
        let surface = TerminalSurface::new();
        let content = render("%s (%s)", &Ticker::new("Hallo", "h"), true);
        surface.set_content(content.clone());

        let display = surface.snapshot();
        assert_eq!(display.content, Some(content));
        assert_eq!(display.revision, 1);
    }
}
