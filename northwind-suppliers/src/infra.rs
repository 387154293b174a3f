mod supplier_store_impl;

pub use supplier_store_impl::*;
