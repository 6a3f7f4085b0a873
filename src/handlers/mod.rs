// handlers/mod.rs - Route handlers
//
// pages: gated web routes (/, /dashboard/*, /auth/*) plus /health
// data:  the public /api/data record API

pub mod data;
pub mod pages;

pub use data::{data_create, data_delete, data_get, data_list, data_update};
pub use pages::{health, page, root};
