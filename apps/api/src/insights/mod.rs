// Industry insights: AI-generated job-market snapshot per industry.
// Flow: handler -> InsightService -> (first access) InsightGenerator -> InsightStore.

pub mod generator;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod service;
pub mod single_flight;
pub mod store;

#[cfg(test)]
pub mod test_support;
