pub mod forecast;
pub mod lp;
pub mod scenario;
