//! Low-level readers and writers for Office Open XML containers

pub mod xml;
pub mod zip;
