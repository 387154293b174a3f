mod customer_store_impl;

pub use customer_store_impl::*;
