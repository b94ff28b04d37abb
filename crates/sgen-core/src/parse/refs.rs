use super::components::Components;
use super::parameter::{Parameter, ParameterOrRef};
use super::request_body::{RequestBody, RequestBodyOrRef};
use super::schema::SchemaOrRef;
use crate::error::ResolveError;

const LOCAL_PREFIX: &str = "#/components/";

/// Split a local `$ref` like `#/components/schemas/Foo` into `("schemas", "Foo")`.
///
/// External documents and pointers nested deeper than one component name
/// are not supported and resolve to [`ResolveError::UnresolvedReference`].
pub fn split_ref(ref_path: &str) -> Result<(&str, &str), ResolveError> {
    let unresolved = || ResolveError::UnresolvedReference(ref_path.to_string());
    let stripped = ref_path.strip_prefix(LOCAL_PREFIX).ok_or_else(unresolved)?;
    let (section, name) = stripped.split_once('/').ok_or_else(unresolved)?;
    if section.is_empty() || name.is_empty() || name.contains('/') {
        return Err(unresolved());
    }
    Ok((section, name))
}

/// Look up the schema a `#/components/schemas/...` reference points at.
pub fn lookup_schema<'a>(
    components: Option<&'a Components>,
    ref_path: &str,
) -> Result<&'a SchemaOrRef, ResolveError> {
    let (section, name) = split_ref(ref_path)?;
    if section != "schemas" {
        return Err(ResolveError::UnresolvedReference(ref_path.to_string()));
    }
    components
        .and_then(|c| c.schemas.get(name))
        .ok_or_else(|| ResolveError::UnresolvedReference(ref_path.to_string()))
}

/// Resolve a parameter, following a single `#/components/parameters/...` hop.
pub fn resolve_parameter<'a>(
    components: Option<&'a Components>,
    param: &'a ParameterOrRef,
) -> Result<&'a Parameter, ResolveError> {
    match param {
        ParameterOrRef::Parameter(p) => Ok(p),
        ParameterOrRef::Ref { ref_path } => {
            let (section, name) = split_ref(ref_path)?;
            components
                .filter(|_| section == "parameters")
                .and_then(|c| c.parameters.get(name))
                .and_then(|p| match p {
                    ParameterOrRef::Parameter(param) => Some(param),
                    ParameterOrRef::Ref { .. } => None,
                })
                .ok_or_else(|| ResolveError::UnresolvedReference(ref_path.clone()))
        }
    }
}

/// Resolve a request body, following a single `#/components/requestBodies/...` hop.
pub fn resolve_request_body<'a>(
    components: Option<&'a Components>,
    body: &'a RequestBodyOrRef,
) -> Result<&'a RequestBody, ResolveError> {
    match body {
        RequestBodyOrRef::RequestBody(b) => Ok(b),
        RequestBodyOrRef::Ref { ref_path } => {
            let (section, name) = split_ref(ref_path)?;
            components
                .filter(|_| section == "requestBodies")
                .and_then(|c| c.request_bodies.get(name))
                .and_then(|b| match b {
                    RequestBodyOrRef::RequestBody(body) => Some(body),
                    RequestBodyOrRef::Ref { .. } => None,
                })
                .ok_or_else(|| ResolveError::UnresolvedReference(ref_path.clone()))
        }
    }
}
