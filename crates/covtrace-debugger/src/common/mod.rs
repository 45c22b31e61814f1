#![cfg_attr(not(windows), allow(dead_code))]

pub mod launch;
