mod aggregator;
mod common;
