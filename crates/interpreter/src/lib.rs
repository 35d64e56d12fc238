//! Interpreters, their bindings, and directive resolution.

#![warn(missing_docs)]

pub mod interpreter;
pub mod loader;
pub mod resolver;

pub use interpreter::{
    Interpreter, InterpreterContext, InterpreterSetting, UserCredentials, UsernamePassword,
};
pub use loader::{InterpreterLoader, InterpreterRegistry};
pub use resolver::{
    DefaultResolver, DirectResolver, InterpreterResolver, MultiplexResolver, Resolved,
    ResolverChain, DEFAULT_MULTIPLEX_FALLBACK,
};
