// tests/shaper/main.rs

mod scenario_tests;
mod tick_drain_tests;
