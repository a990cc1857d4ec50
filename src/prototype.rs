use crate::{
    c::types::{CKind, CParam, resolve},
    codegen::Mangle,
    errors::{Axis, BindingResult},
};

/// One declared value of a C template prototype.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    pub kind: CKind,
    pub name: String,
    /// Sibling holding the array length for scalar-or-array kinds.
    pub count_param: Option<String>,
}

impl Parameter {
    pub fn new(kind: CKind, name: impl Into<String>, count_param: Option<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            count_param,
        }
    }

    pub fn view(&self, mangle: Mangle) -> CParam<'_> {
        CParam::new(&self.name, self.count_param.as_deref(), mangle)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prototype {
    pub name: String,
    pub return_kind: CKind,
    pub parameters: Vec<Parameter>,
}

impl Prototype {
    /// A bigcount (`_c`) variant exists iff some parameter is a counting kind.
    pub fn need_bigcount(&self) -> bool {
        self.parameters.iter().any(|param| param.kind.is_count())
    }

    /// Renders `RET fn_name(PARAMS)` for the given ABI.
    pub fn signature(
        &self,
        axis: Axis,
        fn_name: &str,
        bigcount: bool,
        mangle: Mangle,
    ) -> BindingResult<String> {
        let params = self
            .parameters
            .iter()
            .map(|param| {
                resolve(axis, param.kind)
                    .map(|rules| rules.parameter(&param.view(mangle), bigcount))
            })
            .collect::<BindingResult<Vec<_>>>()?;
        let params = if params.is_empty() {
            "void".to_string()
        } else {
            params.join(", ")
        };
        let ret = resolve(axis, self.return_kind)?.type_text(&CParam::returned(mangle), bigcount);
        Ok(format!("{ret} {fn_name}({params})"))
    }

    /// Checks that every kind is registered on `axis` before anything is emitted.
    pub fn validate(&self, axis: Axis) -> BindingResult<()> {
        resolve(axis, self.return_kind)?;
        for param in &self.parameters {
            resolve(axis, param.kind)?;
        }
        Ok(())
    }
}
