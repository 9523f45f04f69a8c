#[cfg(test)]
pub mod inmem;
pub mod model;
pub mod store;
