//! HTML views rendered through askama templates.

pub mod views;
