pub mod describe;
pub mod json_dump;

pub use describe::describe;
pub use json_dump::dump_json;
