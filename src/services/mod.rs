pub mod auth;
pub mod export;
pub mod garmin;
pub mod night;
pub mod pipeline;
pub mod segment;
