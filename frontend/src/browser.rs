use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, Window};
use yew::Callback;

use crate::animation::error::AnimationError;
use crate::animation::session::{AnimationSession, CountUpConfig, FrameScheduler};
use crate::animation::visibility::VisibilityLatch;

/// `window.requestAnimationFrame` behind the `FrameScheduler` trait.
///
/// Every request registers the same long-lived closure, so scheduling a
/// frame allocates nothing on the JS side.
pub struct RafScheduler {
    window: Option<Window>,
    on_frame: Option<Closure<dyn FnMut(f64)>>,
}

impl RafScheduler {
    fn new() -> Self {
        Self {
            window: web_sys::window(),
            on_frame: None,
        }
    }
}

impl FrameScheduler for RafScheduler {
    type Handle = i32;

    fn request_frame(&mut self) -> Result<i32, AnimationError> {
        let window = self.window.as_ref().ok_or(AnimationError::NoWindow)?;
        let on_frame = self.on_frame.as_ref().ok_or(AnimationError::CallbackDetached)?;
        window
            .request_animation_frame(on_frame.as_ref().unchecked_ref())
            .map_err(|err| AnimationError::Scheduler(format!("{:?}", err)))
    }

    fn cancel_frame(&mut self, handle: i32) {
        if let Some(window) = &self.window {
            if let Err(err) = window.cancel_animation_frame(handle) {
                warn!("Failed to cancel animation frame {}: {:?}", handle, err);
            }
        }
    }
}

pub type SharedDriver<S = RafScheduler> = Rc<RefCell<CountUpDriver<S>>>;

/// Glue between one `AnimationSession`, a frame queue and a Yew callback
/// that receives every new displayed value.
pub struct CountUpDriver<S: FrameScheduler> {
    session: AnimationSession<S::Handle>,
    scheduler: S,
    visible: bool,
    on_value: Callback<u64>,
}

impl CountUpDriver<RafScheduler> {
    pub fn new(config: CountUpConfig, on_value: Callback<u64>) -> SharedDriver {
        let driver = Self::with_scheduler(config, RafScheduler::new(), on_value);

        // Weak so the frame closure doesn't keep a torn-down driver alive.
        let weak: Weak<RefCell<Self>> = Rc::downgrade(&driver);
        let on_frame = Closure::<dyn FnMut(f64)>::new(move |timestamp: f64| {
            if let Some(driver) = weak.upgrade() {
                Self::frame(&driver, timestamp);
            }
        });
        driver.borrow_mut().scheduler.on_frame = Some(on_frame);
        driver
    }
}

impl<S: FrameScheduler> CountUpDriver<S> {
    pub fn with_scheduler(config: CountUpConfig, scheduler: S, on_value: Callback<u64>) -> SharedDriver<S> {
        Rc::new(RefCell::new(Self {
            session: AnimationSession::new(config),
            scheduler,
            visible: false,
            on_value,
        }))
    }

    /// Called once the host element has been seen in the viewport.
    pub fn arm(this: &SharedDriver<S>) {
        Self::drive(this, |d| {
            d.visible = true;
            if !d.session.has_started() {
                d.session.arm(&mut d.scheduler);
            }
        });
    }

    /// Called from the scheduled frame callback.
    pub fn frame(this: &SharedDriver<S>, timestamp: f64) {
        Self::drive(this, |d| d.session.on_frame(timestamp, &mut d.scheduler));
    }

    /// New props. If the count was already visible it starts over from zero
    /// straight away, otherwise it waits for the viewport as usual.
    pub fn reconfigure(this: &SharedDriver<S>, config: CountUpConfig) {
        Self::drive(this, |d| {
            if d.session.reconfigure(config, &mut d.scheduler) && d.visible {
                d.session.arm(&mut d.scheduler);
            }
        });
    }

    pub fn teardown(this: &SharedDriver<S>) {
        let mut driver = this.borrow_mut();
        let CountUpDriver { session, scheduler, .. } = &mut *driver;
        if !session.is_finished() {
            session.cancel(scheduler);
        }
    }

    /// Runs `step` against the driver and reports the displayed value if it
    /// moved. The callback is emitted after the borrow is released, since a
    /// re-render may call back into the driver.
    fn drive(this: &SharedDriver<S>, step: impl FnOnce(&mut CountUpDriver<S>)) {
        let update = {
            let mut driver = this.borrow_mut();
            let before = driver.session.displayed();
            step(&mut *driver);
            let after = driver.session.displayed();
            (after != before).then(|| (driver.on_value.clone(), after))
        };
        if let Some((on_value, value)) = update {
            on_value.emit(value);
        }
    }
}

/// One-shot viewport reporter backed by `IntersectionObserver`.
///
/// `on_visible` runs the first time the element intersects the viewport,
/// which includes the observer's initial report for an element that is
/// already on screen. The observer disconnects itself right after, and
/// dropping the gate disconnects it too.
pub struct IntersectionGate {
    observer: IntersectionObserver,
    _on_intersect: Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>,
}

impl IntersectionGate {
    pub fn observe_once<F>(element: &Element, threshold: f64, on_visible: F) -> Result<Self, AnimationError>
    where
        F: FnOnce() + 'static,
    {
        let mut latch = VisibilityLatch::new();
        let mut on_visible = Some(on_visible);
        let on_intersect = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
            move |entries: js_sys::Array, observer: IntersectionObserver| {
                let intersecting = entries
                    .iter()
                    .any(|entry| entry.unchecked_into::<IntersectionObserverEntry>().is_intersecting());
                if latch.report(intersecting) {
                    observer.disconnect();
                    debug!("Count-up element entered the viewport");
                    if let Some(on_visible) = on_visible.take() {
                        on_visible();
                    }
                }
            },
        );

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(threshold));
        let observer = IntersectionObserver::new_with_options(on_intersect.as_ref().unchecked_ref(), &options)
            .map_err(|err| AnimationError::Observer(format!("{:?}", err)))?;
        observer.observe(element);

        Ok(Self {
            observer,
            _on_intersect: on_intersect,
        })
    }
}

impl Drop for IntersectionGate {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::session::Phase;
    use crate::animation::testing::FakeScheduler;

    type TestDriver = SharedDriver<FakeScheduler>;

    fn driver(config: CountUpConfig) -> (TestDriver, Rc<RefCell<Vec<u64>>>) {
        let emitted = Rc::new(RefCell::new(Vec::new()));
        let on_value = {
            let emitted = emitted.clone();
            Callback::from(move |value: u64| emitted.borrow_mut().push(value))
        };
        let driver = CountUpDriver::with_scheduler(config, FakeScheduler::default(), on_value);
        (driver, emitted)
    }

    fn fire(driver: &TestDriver, t: f64) {
        {
            let mut d = driver.borrow_mut();
            let handle = *d.session.pending().expect("a frame should be pending");
            d.scheduler.take_fired(handle);
        }
        CountUpDriver::frame(driver, t);
    }

    #[test]
    fn emits_only_when_the_value_moves() {
        let (driver, emitted) = driver(CountUpConfig::new(100).with_duration(1000));
        CountUpDriver::arm(&driver);
        fire(&driver, 0.0);
        fire(&driver, 0.0);
        fire(&driver, 500.0);
        fire(&driver, 1000.0);
        assert_eq!(*emitted.borrow(), vec![50, 100]);
    }

    #[test]
    fn emits_after_releasing_the_driver() {
        let slot: Rc<RefCell<Option<TestDriver>>> = Rc::new(RefCell::new(None));
        let borrowable = Rc::new(RefCell::new(Vec::new()));
        let on_value = {
            let slot = slot.clone();
            let borrowable = borrowable.clone();
            Callback::from(move |_: u64| {
                let free = slot
                    .borrow()
                    .as_ref()
                    .map(|d| d.try_borrow_mut().is_ok())
                    .unwrap_or(false);
                borrowable.borrow_mut().push(free);
            })
        };
        let driver = CountUpDriver::with_scheduler(CountUpConfig::new(10).with_duration(0), FakeScheduler::default(), on_value);
        *slot.borrow_mut() = Some(driver.clone());

        CountUpDriver::arm(&driver);
        fire(&driver, 16.0);
        assert_eq!(*borrowable.borrow(), vec![true]);
    }

    #[test]
    fn same_config_is_silent() {
        let (driver, emitted) = driver(CountUpConfig::new(100).with_duration(1000));
        CountUpDriver::arm(&driver);
        fire(&driver, 0.0);
        fire(&driver, 300.0);
        CountUpDriver::reconfigure(&driver, CountUpConfig::new(100).with_duration(1000));

        assert_eq!(*emitted.borrow(), vec![30]);
        let d = driver.borrow();
        assert_eq!(d.session.phase(), Phase::Running);
        assert!(d.scheduler.cancelled.is_empty());
    }

    #[test]
    fn reconfigure_restarts_at_once_when_visible() {
        let (driver, emitted) = driver(CountUpConfig::new(100).with_duration(1000));
        CountUpDriver::arm(&driver);
        fire(&driver, 0.0);
        fire(&driver, 400.0);

        CountUpDriver::reconfigure(&driver, CountUpConfig::new(200).with_duration(1000));
        {
            let d = driver.borrow();
            assert_eq!(d.session.phase(), Phase::Armed);
            assert_eq!(d.scheduler.cancelled, vec![3]);
            assert_eq!(d.scheduler.outstanding, vec![4]);
        }
        fire(&driver, 9000.0);
        fire(&driver, 9500.0);
        assert_eq!(*emitted.borrow(), vec![40, 0, 100]);
    }

    #[test]
    fn reconfigure_waits_for_viewport_when_never_seen() {
        let (driver, emitted) = driver(CountUpConfig::new(100));
        CountUpDriver::reconfigure(&driver, CountUpConfig::new(300));
        {
            let d = driver.borrow();
            assert_eq!(d.session.phase(), Phase::Idle);
            assert_eq!(d.session.target(), 300);
            assert_eq!(d.scheduler.requested, 0);
        }
        assert!(emitted.borrow().is_empty());

        CountUpDriver::arm(&driver);
        assert_eq!(driver.borrow().session.phase(), Phase::Armed);
    }

    #[test]
    fn arm_after_teardown_does_nothing() {
        let (driver, emitted) = driver(CountUpConfig::new(100));
        CountUpDriver::teardown(&driver);
        CountUpDriver::arm(&driver);

        let d = driver.borrow();
        assert_eq!(d.session.phase(), Phase::Cancelled);
        assert_eq!(d.scheduler.requested, 0);
        assert!(emitted.borrow().is_empty());
    }

    #[test]
    fn teardown_mid_run_cancels_once() {
        let (driver, _) = driver(CountUpConfig::new(100));
        CountUpDriver::arm(&driver);
        fire(&driver, 0.0);
        CountUpDriver::teardown(&driver);
        CountUpDriver::teardown(&driver);

        let d = driver.borrow();
        assert_eq!(d.scheduler.cancelled, vec![2]);
        assert!(d.scheduler.outstanding.is_empty());
    }

    #[test]
    fn repeated_visibility_arms_once() {
        let (driver, _) = driver(CountUpConfig::new(100));
        CountUpDriver::arm(&driver);
        CountUpDriver::arm(&driver);
        assert_eq!(driver.borrow().scheduler.requested, 1);
    }
}
