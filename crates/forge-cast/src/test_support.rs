//! IR fixture builders shared by unit tests

use crate::ir::{
    Assembly, CastPrimitive, ClassSpec, InterfaceSpec, ParameterSpec, PropertySpec, TypeRef,
};
use crate::model::Model;

pub fn assembly(name: &str, module: &str) -> Assembly {
    Assembly::new(name, "1.0.0", module)
}

pub fn class(fqn: &str) -> ClassSpec {
    ClassSpec::new(fqn)
}

pub fn interface(fqn: &str) -> InterfaceSpec {
    InterfaceSpec::new(fqn)
}

pub fn struct_type(fqn: &str) -> InterfaceSpec {
    InterfaceSpec::new_struct(fqn)
}

pub fn prop(name: &str, ty: TypeRef) -> PropertySpec {
    PropertySpec::new(name, ty)
}

pub fn param(name: &str, ty: TypeRef) -> ParameterSpec {
    ParameterSpec::new(name, ty)
}

pub fn string() -> TypeRef {
    TypeRef::primitive(CastPrimitive::String)
}

pub fn number() -> TypeRef {
    TypeRef::primitive(CastPrimitive::Number)
}

pub fn boolean() -> TypeRef {
    TypeRef::primitive(CastPrimitive::Boolean)
}

pub fn any() -> TypeRef {
    TypeRef::primitive(CastPrimitive::Any)
}

pub fn named(fqn: &str) -> TypeRef {
    TypeRef::named(fqn)
}

/// Build a model without dependencies
pub fn model(assembly: Assembly) -> Model {
    Model::build(assembly, vec![]).unwrap()
}
