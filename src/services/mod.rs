pub mod indicators;
pub mod market_data;
pub mod pipeline;
pub mod recommendation;
pub mod sentiment;
