//! Group routing
//!
//! Decides where one envelope goes: the in-process hub or the remote hub
//! through a proxy. The router never looks at connection state beyond the
//! single check before a remote send.

mod group_router;

pub use group_router::GroupRouter;
