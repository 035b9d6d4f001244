// SPDX-License-Identifier: Apache-2.0

//! Output rendering for CLI commands.
//!
//! Command handlers return data; this module handles presentation in text,
//! JSON or YAML.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{self, Write};

use crate::cli::{OutputContext, OutputFormat};

mod files;

/// Trait for types that can be rendered in multiple output formats.
pub trait Renderable: Serialize {
    /// Render as human-readable text to the given writer.
    fn render_text(&self, w: &mut dyn Write, ctx: &OutputContext) -> io::Result<()>;
}

/// Generic render function - handles JSON/YAML via serde, delegates text to the trait.
pub fn render<T: Renderable>(result: &T, ctx: &OutputContext) -> Result<()> {
    render_to(result, ctx, &mut io::stdout().lock())
}

/// Renders `result` to an arbitrary writer.
pub fn render_to<T: Renderable>(
    result: &T,
    ctx: &OutputContext,
    w: &mut dyn Write,
) -> Result<()> {
    match ctx.format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(result).context("Failed to serialize to JSON")?;
            writeln!(w, "{json}")?;
        }
        OutputFormat::Yaml => {
            let yaml = serde_saphyr::to_string(result).context("Failed to serialize to YAML")?;
            writeln!(w, "{yaml}")?;
        }
        OutputFormat::Text => {
            result
                .render_text(w, ctx)
                .context("Failed to render text")?;
        }
    }
    Ok(())
}
