//! Frame loop around a [`RainField`]: one render per host frame, pausable.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::{RainField, RainSurface};

/// "Call me on the next display refresh" plus its cancel.
pub trait FrameScheduler {
    type Handle: Copy;

    /// Ask the host for one frame callback. `None` if the host refused.
    fn request_frame(&mut self) -> Option<Self::Handle>;
    fn cancel_frame(&mut self, handle: Self::Handle);
}

/// Owns the field, the surface it paints on and the scheduler that paces it.
///
/// At most one frame request is outstanding at any time. The host delivers
/// that request by calling [`RainAnimation::on_frame`], which renders and asks
/// for the next one. `pause` cancels the outstanding request, so no render
/// happens until `resume`.
pub struct RainAnimation<S, H: FrameScheduler, R: Rng = ChaCha8Rng> {
    field: RainField<R>,
    surface: S,
    scheduler: H,
    pending: Option<H::Handle>,
    running: bool,
    frames_rendered: u64,
}

impl<S: RainSurface, H: FrameScheduler, R: Rng> RainAnimation<S, H, R> {
    /// Build an idle animation. Nothing is scheduled until [`Self::start`].
    pub fn new(field: RainField<R>, surface: S, scheduler: H) -> Self {
        Self {
            field,
            surface,
            scheduler,
            pending: None,
            running: false,
            frames_rendered: 0,
        }
    }

    pub fn start(&mut self) {
        self.resume();
    }

    /// Host frame callback.
    pub fn on_frame(&mut self) {
        self.pending = None;
        if !self.running {
            return;
        }
        self.field.render_frame(&mut self.surface);
        self.frames_rendered += 1;
        self.schedule();
    }

    pub fn pause(&mut self) {
        self.running = false;
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    /// Restart the loop. No-op while already running, so repeated
    /// visibility events never stack a second loop.
    pub fn resume(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.schedule();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.field.resize(width, height);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn field(&self) -> &RainField<R> {
        &self.field
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    fn schedule(&mut self) {
        if self.pending.is_none() {
            self.pending = self.scheduler.request_frame();
            if self.pending.is_none() {
                log::warn!("frame request refused; rain loop stalled");
            }
        }
    }
}

impl<S, H: FrameScheduler, R: Rng> Drop for RainAnimation<S, H, R> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RainSettings;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct NullSurface;

    impl RainSurface for NullSurface {
        fn paint_overlay(&mut self, _: &str, _: f64, _: f64) {}
        fn set_glyph_style(&mut self, _: &str, _: &str) {}
        fn draw_glyph(&mut self, _: char, _: f64, _: f64) {}
    }

    /// Outstanding request ids, shared with the test so it can play host.
    #[derive(Clone, Default)]
    struct TickQueue(Rc<RefCell<(u32, Vec<u32>)>>);

    impl FrameScheduler for TickQueue {
        type Handle = u32;

        fn request_frame(&mut self) -> Option<u32> {
            let mut q = self.0.borrow_mut();
            q.0 += 1;
            let id = q.0;
            q.1.push(id);
            Some(id)
        }

        fn cancel_frame(&mut self, handle: u32) {
            self.0.borrow_mut().1.retain(|&h| h != handle);
        }
    }

    impl TickQueue {
        fn outstanding(&self) -> usize {
            self.0.borrow().1.len()
        }

        fn tick(&self, anim: &mut RainAnimation<NullSurface, TickQueue>) {
            let due = std::mem::take(&mut self.0.borrow_mut().1);
            for _ in due {
                anim.on_frame();
            }
        }
    }

    fn animation(queue: &TickQueue) -> RainAnimation<NullSurface, TickQueue> {
        let field = RainField::start(
            140,
            280,
            &RainSettings::default(),
            ChaCha8Rng::seed_from_u64(9),
        );
        RainAnimation::new(field, NullSurface, queue.clone())
    }

    #[test]
    fn test_new_is_idle_until_start() {
        let q = TickQueue::default();
        let mut anim = animation(&q);
        q.tick(&mut anim);
        assert_eq!(anim.frames_rendered(), 0);
        anim.start();
        assert_eq!(q.outstanding(), 1);
        q.tick(&mut anim);
        q.tick(&mut anim);
        assert_eq!(anim.frames_rendered(), 2);
    }

    #[test]
    fn test_pause_cancels_outstanding_request() {
        let q = TickQueue::default();
        let mut anim = animation(&q);
        anim.start();
        anim.pause();
        assert_eq!(q.outstanding(), 0);
        for _ in 0..10 {
            q.tick(&mut anim);
        }
        assert_eq!(anim.frames_rendered(), 0);
        assert!(!anim.is_running());
    }

    #[test]
    fn test_double_resume_keeps_single_request() {
        let q = TickQueue::default();
        let mut anim = animation(&q);
        anim.start();
        anim.resume();
        anim.start();
        assert_eq!(q.outstanding(), 1);
        q.tick(&mut anim);
        assert_eq!(anim.frames_rendered(), 1);
    }

    #[test]
    fn test_stray_frame_after_pause_does_not_render() {
        let q = TickQueue::default();
        let mut anim = animation(&q);
        anim.start();
        anim.pause();
        anim.on_frame();
        assert_eq!(anim.frames_rendered(), 0);
    }

    #[test]
    fn test_drop_cancels_outstanding_request() {
        let q = TickQueue::default();
        let mut anim = animation(&q);
        anim.start();
        assert_eq!(q.outstanding(), 1);
        drop(anim);
        assert_eq!(q.outstanding(), 0);
    }
}
