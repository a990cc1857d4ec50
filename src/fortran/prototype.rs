//! The JSON prototype list driving the Fortran generator.
//!
//! ```json
//! [{"name": "send", "parameters": [
//!     {"type": "BUFFER", "name": "buf",
//!      "dep_params": {"count": "count", "type": "datatype", "comm": "comm"}},
//!     ...
//! ]}]
//! ```

use super::types::{FortranKind, FortranType, Role};
use crate::errors::{Axis, BindingError, BindingResult, DependencyDetail};
use serde::Deserialize;
use std::{collections::BTreeMap, fs, path::Path, str::FromStr};
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct RawParameter {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub dep_params: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
pub struct RawPrototype {
    pub name: String,
    pub parameters: Vec<RawParameter>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FortranParameter {
    pub name: String,
    pub kind: FortranKind,
    pub ty: FortranType,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FortranPrototype {
    pub name: String,
    pub parameters: Vec<FortranParameter>,
}

impl FortranPrototype {
    /// A `_c` variant exists when any parameter is a count.
    pub fn has_bigcount(&self) -> bool {
        self.parameters
            .iter()
            .any(|param| param.kind == FortranKind::Count)
    }

    pub fn resolve(raw: &RawPrototype) -> BindingResult<Self> {
        let mut parameters = Vec::with_capacity(raw.parameters.len());
        for param in &raw.parameters {
            let kind = FortranKind::from_str(&param.kind)
                .map_err(|()| BindingError::kind_not_found(&param.kind, Axis::Fortran))?;
            let dep_params = param.dep_params.clone().unwrap_or_default();
            check_roles(raw, param, kind, &dep_params)?;

            let ty = FortranType::build(kind, |role| {
                let sibling = dep_params.get(role.key()).ok_or_else(|| {
                    dependency_error(raw, param, invalid_roles(kind, &dep_params))
                })?;
                raw.parameters
                    .iter()
                    .position(|other| other.name == *sibling)
                    .ok_or_else(|| {
                        dependency_error(
                            raw,
                            param,
                            DependencyDetail::MissingSibling {
                                role: role.key().to_string(),
                                sibling: sibling.clone(),
                            },
                        )
                    })
            })?;
            parameters.push(FortranParameter {
                name: param.name.clone(),
                kind,
                ty,
            });
        }
        Ok(Self {
            name: raw.name.clone(),
            parameters,
        })
    }
}

fn dependency_error(
    raw: &RawPrototype,
    param: &RawParameter,
    detail: DependencyDetail,
) -> BindingError {
    BindingError::Dependency {
        prototype: raw.name.clone(),
        parameter: param.name.clone(),
        detail,
    }
}

fn invalid_roles(kind: FortranKind, dep_params: &BTreeMap<String, String>) -> DependencyDetail {
    let mut expected: Vec<String> = kind
        .roles()
        .iter()
        .map(|role| role.key().to_string())
        .collect();
    expected.sort();
    DependencyDetail::InvalidRoles {
        kind: kind.tag().to_string(),
        expected,
        found: dep_params.keys().cloned().collect(),
    }
}

/// The keys of `dep_params` must be exactly the roles of the kind.
fn check_roles(
    raw: &RawPrototype,
    param: &RawParameter,
    kind: FortranKind,
    dep_params: &BTreeMap<String, String>,
) -> BindingResult<()> {
    let mut expected: Vec<Role> = kind.roles().to_vec();
    expected.sort();
    let mut found = Vec::with_capacity(dep_params.len());
    for key in dep_params.keys() {
        match Role::from_str(key) {
            Ok(role) => found.push(role),
            Err(()) => {
                return Err(dependency_error(raw, param, invalid_roles(kind, dep_params)));
            }
        }
    }
    found.sort();
    if found != expected {
        return Err(dependency_error(raw, param, invalid_roles(kind, dep_params)));
    }
    Ok(())
}

pub fn parse_prototypes(path: &Path, text: &str) -> BindingResult<Vec<FortranPrototype>> {
    let raw: Vec<RawPrototype> =
        serde_json::from_str(text).map_err(|error| BindingError::PrototypeList {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;
    raw.iter().map(FortranPrototype::resolve).collect()
}

pub fn load_prototypes(path: &Path) -> BindingResult<Vec<FortranPrototype>> {
    let text = fs::read_to_string(path).map_err(|error| BindingError::io(path, error))?;
    let prototypes = parse_prototypes(path, &text)?;
    debug!(
        path = %path.display(),
        prototypes = prototypes.len(),
        "loaded prototype list"
    );
    Ok(prototypes)
}
