use yew::prelude::*;
use log::info;
use tracing_wasm::WASMLayerConfigBuilder;

mod config;
mod browser;
mod animation {
    pub mod error;
    pub mod render;
    pub mod session;
    pub mod visibility;
    #[cfg(test)]
    pub mod testing;
}
mod components {
    pub mod count_up;
}
mod pages {
    pub mod stats;
}

use pages::stats::StatsSection;


#[function_component]
fn App() -> Html {
    html! {
        <main class="landing-page">
            <StatsSection />
        </main>
    }
}


fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(config::log_level()).expect("error initializing log");

    // Animation lifecycle events go through tracing
    let mut tracing_config = WASMLayerConfigBuilder::new();
    tracing_config.set_max_level(config::tracing_level());
    tracing_wasm::set_as_global_default_with_config(tracing_config.build());

    info!("Starting application");
    yew::Renderer::<App>::new().render();
}
