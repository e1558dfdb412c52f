use std::cell::RefCell;
use std::rc::Rc;

use log::warn;
use web_sys::Element;
use yew::prelude::*;
use yew_hooks::prelude::*;

use crate::animation::error::AnimationError;
use crate::animation::render::format_count;
use crate::animation::session::CountUpConfig;
use crate::browser::{CountUpDriver, IntersectionGate, SharedDriver};
use crate::config;

#[derive(Properties, PartialEq)]
pub struct CountUpProps {
    pub end: i64,
    #[prop_or(config::DEFAULT_DURATION_MS)]
    pub duration: u32,
    #[prop_or_default]
    pub prefix: AttrValue,
    #[prop_or_default]
    pub suffix: AttrValue,
}

/// Counts from 0 up to `end` the first time it scrolls into view.
#[function_component(CountUp)]
pub fn count_up(props: &CountUpProps) -> Html {
    let node = use_node_ref();
    let count = use_state(|| 0u64);
    let driver: Rc<RefCell<Option<SharedDriver>>> = use_mut_ref(|| None);
    let settings = CountUpConfig::new(props.end).with_duration(props.duration);

    // Mount: one driver and one viewport gate for the lifetime of the element.
    {
        let node = node.clone();
        let driver = driver.clone();
        let setter = count.setter();
        use_effect_once(move || {
            let shared = CountUpDriver::new(settings, Callback::from(move |value: u64| setter.set(value)));

            let gate = node
                .cast::<Element>()
                .ok_or(AnimationError::MissingElement)
                .and_then(|element| {
                    let weak = Rc::downgrade(&shared);
                    IntersectionGate::observe_once(&element, config::VISIBILITY_THRESHOLD, move || {
                        if let Some(driver) = weak.upgrade() {
                            CountUpDriver::arm(&driver);
                        }
                    })
                });
            if let Err(err) = &gate {
                warn!("Count-up to {} will stay at 0: {}", settings.target, err);
            }
            *driver.borrow_mut() = Some(shared.clone());

            move || {
                drop(gate);
                CountUpDriver::teardown(&shared);
                driver.borrow_mut().take();
            }
        });
    }

    // Changed end/duration restart the count from zero.
    {
        let driver = driver.clone();
        use_effect_with_deps(
            move |settings| {
                let shared = driver.borrow().clone();
                if let Some(shared) = shared {
                    CountUpDriver::reconfigure(&shared, *settings);
                }
                || ()
            },
            settings,
        );
    }

    html! {
        <span ref={node}>
            { format_count(&props.prefix, *count, &props.suffix) }
        </span>
    }
}
