pub mod clutch;
pub mod economy;
pub mod matchstats;
pub mod metrics;
pub mod source;
pub mod tracker;
