//! Script bundling with the oxc toolchain.
//!
//! Inputs are classic browser scripts that share one global scope, so they
//! are parsed as scripts (not modules) and top-level names are never mangled.

use crate::error::{PipelineError, Result};
use crate::transforms::{Bundle, SourceFile};
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{Minifier, MinifierOptions};
use oxc_parser::Parser;
use oxc_sourcemap::{ConcatSourceMapBuilder, SourceMap};
use oxc_span::SourceType;
use std::path::PathBuf;

/// A minified script and the source map for it.
pub struct MinifiedScript {
    pub code: String,
    pub map: Option<SourceMap>,
}

/// Parse and minify one script.
///
/// # Errors
///
/// Returns [`PipelineError::Script`] with the parser diagnostics when `source`
/// does not parse.
pub fn minify_script(name: &str, source: &str) -> Result<MinifiedScript> {
    let allocator = Allocator::default();
    let source_type = SourceType::default().with_script(true);

    let parsed = Parser::new(&allocator, source, source_type).parse();
    if parsed.panicked || !parsed.errors.is_empty() {
        let message = parsed
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(PipelineError::Script {
            file: PathBuf::from(name),
            message: if message.is_empty() {
                "parser gave up".to_string()
            } else {
                message
            },
        });
    }

    let mut program = parsed.program;
    let minified = Minifier::new(MinifierOptions::default()).minify(&allocator, &mut program);

    let generated = Codegen::new()
        .with_options(CodegenOptions {
            source_map_path: Some(PathBuf::from(name)),
            ..CodegenOptions::minify()
        })
        .with_scoping(minified.scoping)
        .build(&program);

    Ok(MinifiedScript {
        code: generated.code,
        map: generated.map,
    })
}

/// Minify every input and concatenate them in the given order.
///
/// Inputs are separated by a newline; each input's map is shifted by the
/// number of lines before it.
pub fn bundle_scripts(inputs: &[SourceFile]) -> Result<Bundle> {
    let mut code = String::new();
    let mut maps = ConcatSourceMapBuilder::default();

    for (index, input) in inputs.iter().enumerate() {
        let minified = minify_script(&input.name, &input.contents)?;

        if index > 0 {
            code.push('\n');
        }
        let line_offset = code.matches('\n').count() as u32;
        if let Some(map) = &minified.map {
            maps.add_sourcemap(map, line_offset);
        }

        code.push_str(minified.code.trim_end());
    }

    Ok(Bundle {
        code,
        map: maps.into_sourcemap().to_json_string(),
    })
}
