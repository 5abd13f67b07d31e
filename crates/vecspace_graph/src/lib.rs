// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reactive node graph engine for `vecspace`.
//!
//! A [`Context`] owns typed nodes and the connections between them. Writing an
//! input recomputes its node synchronously; each output the node writes is
//! pushed through its connections into downstream inputs, which recompute in
//! turn. The view layer observes every write through [`Context::subscribe`].
//!
//! ## Architecture
//!
//! - Typed ports carrying a tagged [`Value`]
//! - Connection validation (direction, single producer, types, validators, cycles)
//! - Depth-first push propagation
//! - Change notifications
//! - RON/JSON snapshots rebuilt through a [`NodeRegistry`]
//!
//! ```
//! use vecspace_graph::{catalog::kinds, Context, Value};
//!
//! let mut ctx = Context::new();
//! let constant = ctx.create_node(kinds::CONSTANT)?;
//! let square = ctx.create_node(kinds::UNARY_OPERATOR)?;
//! ctx.create_connection(ctx.output(constant, "result")?, ctx.input(square, "x")?)?;
//!
//! ctx.set_input_value(constant, "x", 5.0)?;
//! assert_eq!(ctx.output_value(square, "result"), Some(&Value::Number(25.0)));
//! # Ok::<(), vecspace_graph::GraphError>(())
//! ```

pub mod catalog;
pub mod connection;
pub mod context;
pub mod error;
pub mod events;
pub mod node;
pub mod port;
pub mod snapshot;
pub mod value;

pub use connection::{Connection, ConnectionId};
pub use context::{Context, ContextId};
pub use error::{ConnectionRejection, GraphError, Result};
pub use events::{GraphEvent, SubscriptionId, SubscriptionTarget};
pub use node::{DisplayMode, Node, NodeCategory, NodeData, NodeId, NodeRegistry, NodeType};
pub use port::{Port, PortDirection, PortId, PortSpec};
pub use snapshot::{ConnectionRecord, ContextSnapshot, NodeRecord, PortRecord};
pub use value::{Mat3, Value, ValueType, Vec3};
