//! Memory image files.
//!
//! An image is plain text:
//! - One PaO cell per line, address 0 first
//! - Each cell is 8 binary digits, `0b` prefix optional
//! - `;` starts a comment; blank lines are ignored
//!
//! ```text
//! ; demo
//! 00000001 ; 00
//! 00000010 ; 01
//! ```

use crate::binary::Word8;
use crate::machine::MEMORY_SIZE;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Parse image text into cells.
pub fn parse_image(text: &str) -> Result<Vec<Word8>, ImageError> {
    let mut cells = Vec::new();

    for (line_num, line) in text.lines().enumerate() {
        let code = match line.find(';') {
            Some(pos) => &line[..pos],
            None => line,
        }
        .trim();

        if code.is_empty() {
            continue;
        }

        let cell = Word8::parse(code).map_err(|e| ImageError::Parse {
            line: line_num + 1,
            message: e.to_string(),
        })?;
        cells.push(cell);
    }

    if cells.len() > MEMORY_SIZE {
        return Err(ImageError::TooLarge { size: cells.len(), available: MEMORY_SIZE });
    }

    Ok(cells)
}

/// Load an image file from disk.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<Vec<Word8>, ImageError> {
    let text = std::fs::read_to_string(path.as_ref())
        .map_err(|e| ImageError::Io(e.to_string()))?;
    parse_image(&text)
}

/// Render cells as image text.
pub fn format_image(cells: &[Word8]) -> String {
    let mut out = String::from("; W machine memory image\n");
    for (addr, cell) in cells.iter().enumerate() {
        out.push_str(&format!("{} ; {:02}\n", cell, addr));
    }
    out
}

/// Save cells to an image file.
pub fn save_image<P: AsRef<Path>>(path: P, cells: &[Word8]) -> Result<(), ImageError> {
    let mut file = std::fs::File::create(path.as_ref())
        .map_err(|e| ImageError::Io(e.to_string()))?;
    file.write_all(format_image(cells).as_bytes())
        .map_err(|e| ImageError::Io(e.to_string()))
}

/// Errors from reading or writing memory images.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("image has {size} cells, memory holds {available}")]
    TooLarge { size: usize, available: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_image() {
        let text = "; header\n00000001\n0b00000010 ; one\n\n11111111\n";
        let cells = parse_image(text).unwrap();
        let values: Vec<u8> = cells.iter().map(|c| c.value()).collect();
        assert_eq!(values, vec![1, 2, 255]);
    }

    #[test]
    fn test_parse_error_line() {
        let err = parse_image("00000001\n0001\n").unwrap_err();
        assert!(matches!(err, ImageError::Parse { line: 2, .. }));

        let err = parse_image("0000000x").unwrap_err();
        assert!(matches!(err, ImageError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_too_large() {
        let text = "00000000\n".repeat(MEMORY_SIZE + 1);
        assert_eq!(
            parse_image(&text),
            Err(ImageError::TooLarge { size: MEMORY_SIZE + 1, available: MEMORY_SIZE })
        );
    }

    #[test]
    fn test_format_parses_back() {
        let cells: Vec<Word8> = [1u8, 2, 4, 8, 17].iter().map(|&v| Word8::truncate(v)).collect();
        assert_eq!(parse_image(&format_image(&cells)).unwrap(), cells);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("wmachine-image-{}.txt", std::process::id()));
        let cells = vec![Word8::truncate(56), Word8::truncate(36)];

        save_image(&path, &cells).unwrap();
        let loaded = load_image(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, cells);
    }

    #[test]
    fn test_missing_file() {
        let err = load_image("/nonexistent/wmachine/image.txt").unwrap_err();
        assert!(matches!(err, ImageError::Io(_)));
    }
}
