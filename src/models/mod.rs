pub mod chart;
pub mod news;
pub mod response;
pub mod silver_price;
