//! Command implementations for lessonbook.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the wiring of the Nix-backed collaborators shared by
//! `render` and `rewrite`.

mod init;
mod list;
mod render;
mod rewrite;

use crate::cli::Command;
use crate::config::Config;
use crate::error::Result;
use crate::eval::{EvalContext, NixEvaluator};
use crate::rewrite::{NixCatalog, Rewriter};

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Init => init::cmd_init(),
        Command::Render(args) => render::cmd_render(args),
        Command::List => list::cmd_list(),
        Command::Rewrite(args) => rewrite::cmd_rewrite(args),
    }
}

/// Host evaluator, catalog and rewriter built from the config.
struct NixServices {
    eval: EvalContext,
    evaluator: NixEvaluator,
    catalog: NixCatalog,
    rewriter: Rewriter,
}

impl NixServices {
    fn from_config(config: &Config) -> Result<Self> {
        let eval = config.eval_context();
        Ok(Self {
            evaluator: NixEvaluator::new(eval.clone()),
            catalog: NixCatalog::new(
                config.catalog.flake.clone(),
                config.sandbox.experimental_features.clone(),
                config.catalog.overrides.clone(),
            ),
            rewriter: Rewriter::new(&config.catalog.flake)?,
            eval,
        })
    }
}
