//! Include directive.
//!
//! The directive resolves a relative path through a caller-supplied
//! resolver and block-parses the result with the current state's
//! reference map. Resolution failures fall back to a literal error
//! block.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::block::BlockParser;
use crate::directive::{Directive, DirectiveHandler};
use crate::error::Error;
use crate::limits;
use crate::state::BlockState;
use crate::token::Token;

/// Resolver callback: `(relative path, base dir) → source text`.
pub type Resolver =
    Box<dyn Fn(&str, Option<&Path>) -> Result<String, String> + Send + Sync>;

/// `.. include:: path`.
pub struct Include {
    resolver: Resolver,
}

impl Include {
    /// Resolve against the filesystem, relative to the pipeline's
    /// base directory.
    pub fn filesystem() -> Self {
        Self::with_resolver(Box::new(|path, base| {
            let joined = match base {
                Some(base) => base.join(path),
                None => Path::new(path).to_path_buf(),
            };
            fs::read_to_string(&joined).map_err(|err| err.to_string())
        }))
    }

    /// Use a custom resolver.
    pub fn with_resolver(resolver: Resolver) -> Self {
        Self { resolver }
    }
}

impl DirectiveHandler for Include {
    fn names(&self) -> &'static [&'static str] {
        &["include"]
    }

    fn parse(
        &self,
        directive: Directive,
        parser: &BlockParser,
        state: &mut BlockState<'_>,
    ) -> Result<Vec<Token>, Error> {
        let path = directive.title.trim().to_owned();
        if path.is_empty() {
            return Ok(vec![error_block("include directive requires a path")]);
        }
        if state.depth >= limits::MAX_BLOCK_NESTING {
            return Ok(vec![error_block(&format!(
                "include of {path} exceeds nesting limit"
            ))]);
        }

        let base = state.env.base_dir.clone();
        match (self.resolver)(&path, base.as_deref()) {
            Ok(src) => {
                debug!(path = %path, bytes = src.len(), "include resolved");
                parser.parse_child(state, src)
            }
            Err(reason) => {
                debug!(path = %path, %reason, "include failed");
                Ok(vec![error_block(&format!(
                    "include of {path} failed: {reason}"
                ))])
            }
        }
    }
}

fn error_block(message: &str) -> Token {
    Token::text_leaf("block_error", message)
}
