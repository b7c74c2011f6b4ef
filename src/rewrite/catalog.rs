//! Package catalog: resolves package names to executable paths.

use crate::error::{LessonError, Result};
use crate::nix::run_nix;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Mutex;

/// Resolves a catalog package name to the absolute path of its main program.
pub trait PackageCatalog: Send + Sync {
    fn executable(&self, package: &str) -> Result<PathBuf>;
}

/// Catalog backed by a Nix flake (by default `nixpkgs`).
///
/// Each package is built once and its path memoized, so a package resolves
/// to the same path no matter which script asks first.
#[derive(Debug)]
pub struct NixCatalog {
    flake: String,
    features: Vec<String>,
    overrides: BTreeMap<String, PathBuf>,
    resolved: Mutex<HashMap<String, PathBuf>>,
}

impl NixCatalog {
    pub fn new(
        flake: impl Into<String>,
        features: Vec<String>,
        overrides: BTreeMap<String, PathBuf>,
    ) -> Self {
        Self {
            flake: flake.into(),
            features,
            overrides,
            resolved: Mutex::new(HashMap::new()),
        }
    }

    fn resolve(&self, package: &str) -> Result<PathBuf> {
        let installable = format!("{}#{}", self.flake, package);

        let built = run_nix(
            &self.features,
            &["build", "--no-link", "--print-out-paths", &installable],
        )?;
        let out_path = built.stdout.lines().next().ok_or_else(|| {
            LessonError::EvalError(format!("nix build printed no output path for '{}'", installable))
        })?;

        let program = run_nix(
            &self.features,
            &[
                "eval",
                "--raw",
                &installable,
                "--apply",
                "p: p.meta.mainProgram or (p.pname or (builtins.parseDrvName p.name).name)",
            ],
        )?;

        Ok(PathBuf::from(out_path).join("bin").join(program.stdout))
    }
}

impl PackageCatalog for NixCatalog {
    fn executable(&self, package: &str) -> Result<PathBuf> {
        if let Some(path) = self.overrides.get(package) {
            return Ok(path.clone());
        }

        {
            let resolved = self.resolved.lock().unwrap_or_else(|p| p.into_inner());
            if let Some(path) = resolved.get(package) {
                return Ok(path.clone());
            }
        }

        let path = self.resolve(package)?;
        let mut resolved = self.resolved.lock().unwrap_or_else(|p| p.into_inner());
        Ok(resolved.entry(package.to_string()).or_insert(path).clone())
    }
}
