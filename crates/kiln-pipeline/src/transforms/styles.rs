//! Stylesheet bundling: minify with lightningcss, concatenate in order.
//!
//! Each input is minified on its own and the results are joined with a
//! newline, so input `n` always occupies output line `n`. The source map maps
//! every line back to the start of its input and embeds the original sources.

use crate::error::{PipelineError, Result};
use crate::transforms::{Bundle, SourceFile};
use lightningcss::{
    printer::PrinterOptions,
    stylesheet::{MinifyOptions, ParserOptions, StyleSheet},
};
use oxc_sourcemap::SourceMapBuilder;
use std::path::PathBuf;

/// Minify a single stylesheet.
pub fn minify_css(name: &str, source: &str) -> Result<String> {
    let css_error = |message: String| PipelineError::Css {
        file: PathBuf::from(name),
        message,
    };

    let mut stylesheet = StyleSheet::parse(
        source,
        ParserOptions {
            filename: name.to_string(),
            ..Default::default()
        },
    )
    .map_err(|e| css_error(format!("failed to parse: {}", e)))?;

    stylesheet
        .minify(MinifyOptions::default())
        .map_err(|e| css_error(format!("failed to minify: {}", e)))?;

    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..Default::default()
        })
        .map_err(|e| css_error(format!("failed to print: {}", e)))?;

    Ok(result.code)
}

/// Bundle `inputs` in the given order into `output_name`.
pub fn bundle_styles(inputs: &[SourceFile], output_name: &str) -> Result<Bundle> {
    let mut code = String::new();
    let mut builder = SourceMapBuilder::default();
    builder.set_file(output_name);

    for (line, input) in inputs.iter().enumerate() {
        let minified = minify_css(&input.name, &input.contents)?;

        if line > 0 {
            code.push('\n');
        }
        let source_id = builder.add_source_and_content(&input.name, &input.contents);
        builder.add_token(line as u32, 0, 0, 0, Some(source_id), None);

        // One line per input keeps the line mapping exact.
        code.push_str(minified.trim_end().replace('\n', "").as_str());
    }

    Ok(Bundle {
        code,
        map: builder.into_sourcemap().to_json_string(),
    })
}
