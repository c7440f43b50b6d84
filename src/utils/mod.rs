pub mod header_utils;
pub mod validation;
