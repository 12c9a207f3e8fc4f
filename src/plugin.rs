//! The plugin protocol.
//!
//! A plugin is a named setup hook that runs once at parser
//! construction. It may register block rules, inline rules, renderer
//! methods, tree passes, raw-leaf kinds, and env initializers. All
//! registrations are idempotent by name: registering the same name
//! again replaces the earlier entry.

use crate::markdown::Markdown;

/// A parser extension.
pub trait Plugin {
    /// Plugin name, used for diagnostics.
    fn name(&self) -> &'static str;

    /// Wire the plugin into the parser.
    fn setup(&self, md: &mut Markdown);
}
