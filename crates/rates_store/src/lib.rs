pub mod store;

pub use store::{RatesStore, StoreError};
