use log::error;
use serde::Deserialize;
use yew::prelude::*;

use crate::components::count_up::CountUp;
use crate::config;

const STATS_JSON: &str = include_str!("../../assets/stats.json");

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Stat {
    pub end: i64,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
    pub label: String,
    #[serde(default)]
    pub duration_ms: Option<u32>,
}

pub fn parse_stats(raw: &str) -> Result<Vec<Stat>, serde_json::Error> {
    serde_json::from_str(raw)
}

#[function_component(StatsSection)]
pub fn stats_section() -> Html {
    let stats = use_memo(
        |_| match parse_stats(STATS_JSON) {
            Ok(stats) => stats,
            Err(e) => {
                error!("Failed to parse stats content: {}", e);
                Vec::new()
            }
        },
        (),
    );

    html! {
        <section class="stats">
            <div class="stats-grid">
                { for stats.iter().map(|stat| html! {
                    <div class="stat-card" key={stat.label.clone()}>
                        <h3 class="stat-value">
                            <CountUp
                                end={stat.end}
                                duration={stat.duration_ms.unwrap_or(config::DEFAULT_DURATION_MS)}
                                prefix={stat.prefix.clone()}
                                suffix={stat.suffix.clone()}
                            />
                        </h3>
                        <p class="stat-label">{ stat.label.clone() }</p>
                    </div>
                }) }
            </div>
        </section>
    }
}
