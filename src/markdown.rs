//! The pipeline orchestrator.
//!
//! `Markdown` owns the block parser, the inline parser, the renderer,
//! and the registered tree passes. `parse` runs block phase →
//! before-inline passes → inline walk over raw leaves → after-inline
//! passes; `render` dispatches to the configured output mode;
//! `convert` chains the two.

use std::path::PathBuf;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::block::{BlockParser, BlockRule};
use crate::error::Error;
use crate::inline::{InlineParser, InlineRule};
use crate::plugin::Plugin;
use crate::render::{render_ast, HtmlRenderer, RenderFn, RenderOptions};
use crate::state::{BlockState, Env, InlineState};
use crate::token::Token;

/// Output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// HTML string output.
    #[default]
    Html,
    /// Token tree as pretty-printed JSON.
    Ast,
}

/// Parser-level options.
#[derive(Debug, Clone)]
pub struct Options {
    /// Escape raw HTML in the output (default true).
    pub escape: bool,
    /// Render soft line breaks as `<br />`.
    pub hard_wrap: bool,
    /// Keep `javascript:` / `vbscript:` / `data:` destinations.
    pub allow_harmful_protocols: bool,
    /// Output mode.
    pub renderer: RenderMode,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            escape: true,
            hard_wrap: false,
            allow_harmful_protocols: false,
            renderer: RenderMode::Html,
        }
    }
}

/// When a tree pass runs relative to the inline walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassStage {
    /// After the block phase, before raw leaves are inline-parsed.
    BeforeInline,
    /// After the inline walk.
    AfterInline,
}

/// Shared parser handles passed to tree passes.
pub struct PassContext<'a> {
    /// The block parser, for passes that re-parse captured source.
    pub block: &'a BlockParser,
    /// The inline parser, for passes that inline-parse late content.
    pub inline: &'a InlineParser,
    leaves: &'a FxHashSet<&'static str>,
}

impl PassContext<'_> {
    /// Block-parse a captured source fragment against a fresh sub-state.
    pub fn parse_blocks(&self, src: &str, env: &mut Env) -> Result<Vec<Token>, Error> {
        let mut state = BlockState::new(src, env);
        self.block.parse(&mut state)?;
        Ok(state.into_tokens())
    }

    /// Inline-parse any raw leaves in `tokens` (used for late-built
    /// content such as footnote bodies).
    pub fn inline_walk(&self, tokens: &mut [Token], env: &mut Env) {
        for token in tokens.iter_mut() {
            walk_inline(self.inline, self.leaves, token, env);
        }
    }
}

fn walk_inline(
    inline: &InlineParser,
    leaves: &FxHashSet<&'static str>,
    token: &mut Token,
    env: &mut Env,
) {
    if leaves.contains(token.kind.as_ref()) && token.is_raw_leaf() {
        let text = token.text.take().unwrap_or_default();
        token.raw = Some(text.clone());
        let mut state = InlineState::new(text, env);
        inline.parse(&mut state);
        token.children = Some(state.into_tokens());
        return;
    }
    if let Some(children) = token.children.as_mut() {
        for child in children.iter_mut() {
            walk_inline(inline, leaves, child, env);
        }
    }
}

/// A whole-tree pass.
pub type TreePass =
    Box<dyn Fn(&PassContext<'_>, &mut Vec<Token>, &mut Env) -> Result<(), Error> + Send + Sync>;

/// The assembled parser and renderer pipeline.
pub struct Markdown {
    block: BlockParser,
    inline: InlineParser,
    renderer: HtmlRenderer,
    mode: RenderMode,
    passes_before: Vec<(&'static str, TreePass)>,
    passes_after: Vec<(&'static str, TreePass)>,
    inline_leaves: FxHashSet<&'static str>,
    env_inits: Vec<Box<dyn Fn(&mut Env) + Send + Sync>>,
    base_dir: Option<PathBuf>,
}

impl Markdown {
    /// Core CommonMark pipeline with default options.
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// Core CommonMark pipeline with explicit options.
    pub fn with_options(options: Options) -> Self {
        let render_options = RenderOptions {
            escape: options.escape,
            hard_wrap: options.hard_wrap,
            allow_harmful_protocols: options.allow_harmful_protocols,
        };
        let mut inline_leaves = FxHashSet::default();
        inline_leaves.insert("paragraph");
        inline_leaves.insert("heading");
        Self {
            block: BlockParser::new(),
            inline: InlineParser::new(),
            renderer: HtmlRenderer::new(render_options),
            mode: options.renderer,
            passes_before: Vec::new(),
            passes_after: Vec::new(),
            inline_leaves,
            env_inits: Vec::new(),
            base_dir: None,
        }
    }

    /// GFM pipeline: tables, strikethrough, task lists, linkify.
    pub fn gfm() -> Self {
        Self::gfm_with_options(Options::default())
    }

    /// GFM pipeline with explicit options.
    pub fn gfm_with_options(options: Options) -> Self {
        Self::with_options(options)
            .plugin(crate::plugins::Table)
            .plugin(crate::plugins::Strikethrough)
            .plugin(crate::plugins::TaskList)
            .plugin(crate::plugins::Linkify)
    }

    /// Apply a plugin and return the pipeline.
    pub fn plugin(mut self, plugin: impl Plugin) -> Self {
        debug!(plugin = plugin.name(), "registering plugin");
        plugin.setup(&mut self);
        self
    }

    /// Base directory for the include directive.
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    // --- registration API (used by plugins) ---

    /// Register a block rule.
    pub fn block_rule(&mut self, rule: Arc<dyn BlockRule>) {
        self.block.register(rule);
    }

    /// Register an inline rule.
    pub fn inline_rule(&mut self, rule: Arc<dyn InlineRule>) {
        self.inline.register(rule);
    }

    /// Register a renderer method for a token kind.
    pub fn render_method(&mut self, kind: &'static str, method: RenderFn) {
        self.renderer.register(kind, method);
    }

    /// Register a tree pass; re-registering a name replaces it.
    pub fn tree_pass(&mut self, name: &'static str, stage: PassStage, pass: TreePass) {
        let passes = match stage {
            PassStage::BeforeInline => &mut self.passes_before,
            PassStage::AfterInline => &mut self.passes_after,
        };
        if let Some(at) = passes.iter().position(|(n, _)| *n == name) {
            passes[at] = (name, pass);
        } else {
            passes.push((name, pass));
        }
    }

    /// Mark a token kind as a raw leaf to be inline-parsed.
    pub fn inline_leaf(&mut self, kind: &'static str) {
        self.inline_leaves.insert(kind);
    }

    /// Register an env initializer.
    pub fn env_init(&mut self, init: Box<dyn Fn(&mut Env) + Send + Sync>) {
        self.env_inits.push(init);
    }

    // --- pipeline ---

    /// Parse a document into its token tree and env.
    pub fn parse(&self, src: &str) -> Result<(Vec<Token>, Env), Error> {
        let normalized = normalize_newlines(src);
        let mut env = Env::default();
        env.base_dir = self.base_dir.clone();
        for init in &self.env_inits {
            init(&mut env);
        }

        let mut tokens = {
            let mut state = BlockState::new(normalized, &mut env);
            self.block.parse(&mut state)?;
            state.into_tokens()
        };
        debug!(tokens = tokens.len(), "block phase complete");

        let ctx = PassContext {
            block: &self.block,
            inline: &self.inline,
            leaves: &self.inline_leaves,
        };
        for (name, pass) in &self.passes_before {
            debug!(pass = *name, "tree pass (before inline)");
            pass(&ctx, &mut tokens, &mut env)?;
        }

        for token in tokens.iter_mut() {
            walk_inline(&self.inline, &self.inline_leaves, token, &mut env);
        }

        for (name, pass) in &self.passes_after {
            debug!(pass = *name, "tree pass (after inline)");
            pass(&ctx, &mut tokens, &mut env)?;
        }
        Ok((tokens, env))
    }

    /// Render a parsed token tree.
    pub fn render(&self, tokens: &[Token], env: &Env) -> Result<String, Error> {
        match self.mode {
            RenderMode::Html => self.renderer.render(tokens, env),
            RenderMode::Ast => Ok(serde_json::to_string_pretty(&render_ast(tokens))
                .unwrap_or_else(|_| "null".to_owned())),
        }
    }

    /// Render as HTML regardless of the configured mode.
    pub fn render_html(&self, tokens: &[Token], env: &Env) -> Result<String, Error> {
        self.renderer.render(tokens, env)
    }

    /// Parse and render in one call.
    pub fn convert(&self, src: &str) -> Result<String, Error> {
        let (tokens, env) = self.parse(src)?;
        self.render(&tokens, &env)
    }
}

impl Default for Markdown {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_newlines(src: &str) -> String {
    if !src.contains('\r') {
        return src.to_owned();
    }
    src.replace("\r\n", "\n").replace('\r', "\n")
}
