#![allow(non_snake_case)]

pub mod AutomaticBlock;
pub mod Block;
pub mod Statistic;
pub mod Visit;
