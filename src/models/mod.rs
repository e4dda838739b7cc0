pub mod driver;
pub mod location;
pub mod ride;
pub mod rider;
pub mod vehicle;
