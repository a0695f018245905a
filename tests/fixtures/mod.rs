#![allow(dead_code)]

pub mod rules_dir;
