//! TypeScript and JavaScript parser using SWC
//!
//! Global invariants enforced:
//! - Deterministic parsing order
//! - Spans handed out by this crate are rebased to offsets into the file text

use anyhow::Result;
use swc_common::{sync::Lrc, BytePos, FileName, SourceFile, SourceMap};
use swc_ecma_ast::{EsVersion, Module};
use swc_ecma_parser::{lexer::Lexer, EsSyntax, Parser, StringInput, Syntax, TsSyntax};

/// File extensions this crate rewrites
pub const SUPPORTED_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "jsx", "ts", "mts", "cts", "tsx"];

/// A parsed module together with the file it came from
pub struct ParsedSource {
    pub module: Module,
    pub file: Lrc<SourceFile>,
}

impl ParsedSource {
    /// Position of the first byte of the file in the owning `SourceMap`
    pub fn base(&self) -> BytePos {
        self.file.start_pos
    }
}

/// Determine the appropriate syntax configuration based on file extension
fn syntax_for_file(filename: &str) -> Syntax {
    if filename.ends_with(".tsx") {
        Syntax::Typescript(TsSyntax {
            tsx: true,
            ..Default::default()
        })
    } else if filename.ends_with(".ts") || filename.ends_with(".mts") || filename.ends_with(".cts")
    {
        Syntax::Typescript(TsSyntax {
            tsx: false,
            dts: filename.ends_with(".d.ts"),
            ..Default::default()
        })
    } else {
        // .js, .mjs, .cjs; JSX is accepted only in .jsx
        Syntax::Es(EsSyntax {
            jsx: filename.ends_with(".jsx"),
            ..Default::default()
        })
    }
}

/// Whether `filename` has an extension this crate rewrites
pub fn is_supported_file(filename: &str) -> bool {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
}

/// Parse TypeScript, JavaScript, JSX, or TSX source code into an AST module
///
/// Supported file types:
/// - `.js`, `.mjs`, `.cjs`, `.jsx` - JavaScript
/// - `.ts`, `.mts`, `.cts`, `.tsx` - TypeScript
///
/// Returns an error if parse errors occur.
pub fn parse_source(src: &str, source_map: &Lrc<SourceMap>, filename: &str) -> Result<ParsedSource> {
    let syntax = syntax_for_file(filename);

    let file: Lrc<SourceFile> = source_map.new_source_file(
        FileName::Custom(filename.into()).into(),
        src.to_string(),
    );

    let lexer = Lexer::new(syntax, EsVersion::Es2022, StringInput::from(&*file), None);
    let mut parser = Parser::new_from(lexer);

    let module = parser.parse_module().map_err(|e| {
        let error_msg = e.kind().msg();
        anyhow::anyhow!("Parse error: {}", error_msg)
            .context(format!("Failed to parse source file: {}", filename))
    })?;

    Ok(ParsedSource { module, file })
}

#[cfg(test)]
#[path = "parser/tests.rs"]
mod tests;
