pub mod db;
pub mod interp;

pub use db::{combine_cn_db, db_to_linear, hz_to_db, linear_to_db, reciprocal_sum_db};
pub use interp::{first_crossing, linspace};
