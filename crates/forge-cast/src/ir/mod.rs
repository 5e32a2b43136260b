//! Intermediate representation consumed by the generator
//!
//! - `types`: type references (serialized and projection-side)
//! - `assembly`: the assembly schema with its type declarations
//! - `docs`: documentation blocks

pub mod assembly;
pub mod docs;
pub mod types;

pub use assembly::{
    Assembly, ClassSpec, DependencyConfig, EnumMemberSpec, EnumSpec, InitializerSpec,
    InterfaceSpec, MethodSpec, ParameterSpec, PropertySpec, PythonTarget, Readme,
    SubmoduleConfig, Targets, TypeSpec,
};
pub use docs::{Docs, Stability};
pub use types::{CastPrimitive, CastType, CollectionKind, OptionalValue, TypeRef};
