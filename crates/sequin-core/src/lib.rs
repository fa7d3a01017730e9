//! Sequin Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Sequin parser and
//! renderer. It includes:
//!
//! - **Identifiers**: String-interned agent names ([`identifier::Id`])
//! - **Colors**: CSS color handling ([`color::Color`])
//! - **Geometry**: Points, sizes, bounds and insets ([`geometry`] module)
//! - **Draw**: Layered SVG drawing primitives and text measurement ([`draw`] module)
//! - **Semantic**: The generated sequence model consumed by the renderer ([`semantic`] module)

pub mod color;
pub mod draw;
pub mod geometry;
pub mod identifier;
pub mod semantic;
