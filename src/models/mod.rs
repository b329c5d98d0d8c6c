pub mod location;
pub mod order;
pub mod route;
pub mod site;
pub mod vehicle;
