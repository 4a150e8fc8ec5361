//! Tracing targets.
//!
//! keyhook-core logs through the `tracing` crate and never installs a
//! subscriber itself. Use these targets in filter directives to select a
//! subsystem, for example `keyhook_core::registry=warn,keyhook_core::dispatch=debug`.

/// Target names for log filtering.
pub mod targets {
    /// Modifier tracking (trace level, one line per modifier transition).
    pub const TRACKER: &str = "keyhook_core::tracker";
    /// Key map builds, conflicts and malformed bindings.
    pub const REGISTRY: &str = "keyhook_core::registry";
    /// Combination resolution and delivery.
    pub const DISPATCH: &str = "keyhook_core::dispatch";
    /// Signal/slot system.
    pub const SIGNAL: &str = "keyhook_core::signal";
    /// Execution context queue.
    pub const CONTEXT: &str = "keyhook_core::context";
    /// Raw event sources.
    pub const SOURCE: &str = "keyhook_core::source";
}
