//! Writing the fetched bid to disk.
use std::fs::File;
use std::io::Write;
use std::path::Path;

use quote_common::Result;

/// The single line written to the output file, without a trailing newline.
pub fn format_line(bid: &str) -> String {
    format!("Dólar:{}", bid)
}

/// Create or truncate `path` and write the quote line into it.
pub fn write_quote_file(path: &Path, bid: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(format_line(bid).as_bytes())?;
    Ok(())
}
