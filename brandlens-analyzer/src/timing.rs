//! Per-step wall clock timings
//!
//! Screenshot strategies report how long each step took in their result
//! metadata (`"timing": {"browser_setup_seconds": 1.234, ...}`).

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::time::{Duration, Instant};

pub const BROWSER_SETUP: &str = "browser_setup_seconds";
pub const PAGE_NAVIGATION: &str = "page_navigation_seconds";
pub const SELECTOR_WAIT: &str = "selector_wait_seconds";
pub const SCREENSHOT_CAPTURE: &str = "screenshot_capture_seconds";
pub const COLOR_EXTRACTION: &str = "color_extraction_seconds";
pub const PALETTE_CREATION: &str = "palette_creation_seconds";
pub const LLM_ANALYSIS: &str = "llm_analysis_seconds";
pub const TOTAL_PROCESS: &str = "total_process_seconds";

/// Step durations in insertion order
#[derive(Debug, Clone)]
pub struct StepTimings {
    started: Instant,
    steps: IndexMap<&'static str, Duration>,
}

impl StepTimings {
    /// Start the overall clock
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            steps: IndexMap::new(),
        }
    }

    /// Record a step measured from `since` until now
    pub fn record(&mut self, step: &'static str, since: Instant) {
        self.steps.insert(step, since.elapsed());
    }

    /// Record an already measured duration
    pub fn record_duration(&mut self, step: &'static str, duration: Duration) {
        self.steps.insert(step, duration);
    }

    /// Close the overall clock under `total_process_seconds`
    pub fn finish(&mut self) {
        let total = self.started.elapsed();
        self.steps.insert(TOTAL_PROCESS, total);
    }

    pub fn get(&self, step: &str) -> Option<Duration> {
        self.steps.get(step).copied()
    }

    pub fn contains(&self, step: &str) -> bool {
        self.steps.contains_key(step)
    }

    /// Seconds per step, rounded to milliseconds
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .steps
            .iter()
            .map(|(step, duration)| (step.to_string(), Value::from(round_secs(*duration))))
            .collect();
        Value::Object(map)
    }
}

fn round_secs(duration: Duration) -> f64 {
    (duration.as_secs_f64() * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_to_three_decimals() {
        let mut timings = StepTimings::start();
        timings.record_duration(BROWSER_SETUP, Duration::from_micros(1_234_567));

        assert_eq!(timings.to_json()[BROWSER_SETUP], Value::from(1.235));
    }

    #[test]
    fn test_keeps_insertion_order() {
        let mut timings = StepTimings::start();
        timings.record_duration(PAGE_NAVIGATION, Duration::from_millis(20));
        timings.record_duration(BROWSER_SETUP, Duration::from_millis(10));
        timings.finish();

        let json = timings.to_json();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec![PAGE_NAVIGATION, BROWSER_SETUP, TOTAL_PROCESS]);
    }

    #[test]
    fn test_finish_records_total() {
        let mut timings = StepTimings::start();
        let step_start = Instant::now();
        timings.record(SCREENSHOT_CAPTURE, step_start);
        timings.finish();

        assert!(timings.contains(SCREENSHOT_CAPTURE));
        assert!(timings.get(TOTAL_PROCESS).unwrap() >= timings.get(SCREENSHOT_CAPTURE).unwrap());
    }
}
