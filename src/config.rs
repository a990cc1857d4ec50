use crate::errors::{BindingError, BindingResult};
use serde::Deserialize;
use std::{fs, path::Path};

/// Build-system facing names and switches used by every generator.
///
/// All fields are optional in the TOML file; anything left out keeps the
/// default used by the runtime's own build.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Preprocessor flag guarding every bigcount (`_c`) entry point.
    pub bigcount_macro: String,
    /// Preprocessor flag enabling the profiling (`P`-prefixed) symbols.
    pub profiling_macro: String,
    /// Preprocessor flag telling whether `#pragma weak` is available.
    pub weak_symbols_macro: String,
    /// Header providing the inline standard-ABI conversion functions.
    pub abi_internal_header: String,
    /// Column limit used when breaking Fortran parameter lists.
    pub fortran_line_width: usize,
    /// Pass buffers as TS 29113 array descriptors (`CFI_cdesc_t *`).
    pub ts: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            bigcount_macro: "OMPI_BIGCOUNT".into(),
            profiling_macro: "OMPI_BUILD_MPI_PROFILING".into(),
            weak_symbols_macro: "OPAL_HAVE_WEAK_SYMBOLS".into(),
            abi_internal_header: "ompi/mpi/c/abi.h".into(),
            fortran_line_width: 80,
            ts: false,
        }
    }
}

impl GeneratorConfig {
    pub fn load(path: &Path) -> BindingResult<Self> {
        let content = fs::read_to_string(path).map_err(|error| BindingError::io(path, error))?;
        Self::from_toml(path, &content)
    }

    pub fn from_toml(path: &Path, content: &str) -> BindingResult<Self> {
        toml::from_str(content).map_err(|error| BindingError::Config {
            path: path.to_path_buf(),
            message: error.to_string(),
        })
    }

    pub fn with_ts(mut self, ts: bool) -> Self {
        self.ts = self.ts || ts;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = GeneratorConfig::from_toml(
            Path::new("bindgen.toml"),
            "bigcount_macro = \"MY_BIGCOUNT\"\nts = true\n",
        )
        .expect("config");
        assert_eq!(config.bigcount_macro, "MY_BIGCOUNT");
        assert!(config.ts);
        assert_eq!(config.profiling_macro, "OMPI_BUILD_MPI_PROFILING");
        assert_eq!(config.fortran_line_width, 80);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = GeneratorConfig::from_toml(Path::new("bindgen.toml"), "bigcount = true\n")
            .unwrap_err();
        assert!(matches!(err, BindingError::Config { .. }));
    }

    #[test]
    fn cli_flag_only_enables_ts() {
        let config = GeneratorConfig {
            ts: true,
            ..GeneratorConfig::default()
        };
        assert!(config.with_ts(false).ts);
        assert!(GeneratorConfig::default().with_ts(true).ts);
    }
}
