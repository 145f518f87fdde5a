// Typed handler parameter binding

pub mod binder;
pub mod context;
pub mod handlers;
pub mod resolver;
pub mod resolvers;

pub use binder::{bind0, bind1, bind2, bind3, bind4, BoundHandler};
pub use context::{GatewayContext, RequestContext};
pub use resolver::Resolver;
