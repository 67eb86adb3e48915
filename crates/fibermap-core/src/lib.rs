//! Fibermap Core Types and Definitions
//!
//! This crate provides the foundational types shared by every fibermap crate.
//! It includes:
//!
//! - **Identifiers**: Efficient string-interned codes ([`identifier::Id`])
//! - **Network**: Origin points, distribution boxes and cable segments ([`network`] module)
//! - **Fiber**: The tube/fibre numbering law and colour code ([`fiber`] module)
//! - **Draw**: Grid draw instructions and the [`draw::Surface`] capability
//! - **Repository**: The topology store capability ([`repository::Repository`])

pub mod draw;
pub mod fiber;
pub mod identifier;
pub mod network;
pub mod repository;
