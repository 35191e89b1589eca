//! toto-screen: offline child health screening (question bank, risk rollup, resumable sessions)
//! with Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
