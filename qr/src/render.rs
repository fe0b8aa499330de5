//! SVG and terminal output.

use crate::{EncodedQr, QrCode};

/// Quiet zone, in modules, around terminal output.
const TERMINAL_QUIET_ZONE: usize = 2;

/// Render as an SVG document of side `cell_size_pixels * module_count`.
///
/// No quiet zone is added; the caller's container provides the margin.
pub fn to_svg(qr: &EncodedQr) -> String {
    let cell = qr.cell_size_pixels;
    let total_size = qr.rendered_size();

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{0}" height="{0}" viewBox="0 0 {0} {0}" shape-rendering="crispEdges">"#,
        total_size
    );

    // White background
    svg.push_str(&format!(
        r#"<rect width="{0}" height="{0}" fill="white"/>"#,
        total_size
    ));

    for (row, modules) in qr.modules.iter().enumerate() {
        for (col, &dark) in modules.iter().enumerate() {
            if dark {
                svg.push_str(&format!(
                    r##"<rect x="{}" y="{}" width="{cell}" height="{cell}" fill="#111"/>"##,
                    col as u32 * cell,
                    row as u32 * cell,
                ));
            }
        }
    }

    svg.push_str("</svg>");
    svg
}

/// Whether the padded position `(row, col)` is a dark module.
fn padded_is_dark(code: &QrCode, row: usize, col: usize) -> bool {
    let size = code.size();
    let q = TERMINAL_QUIET_ZONE;
    (q..size + q).contains(&row) && (q..size + q).contains(&col) && code.is_dark(row - q, col - q)
}

/// Render as ASCII art for terminal display.
///
/// Each module is two characters wide for a square aspect ratio:
/// full blocks for dark modules, spaces for light ones.
pub fn to_ascii(code: &QrCode) -> String {
    let span = code.size() + 2 * TERMINAL_QUIET_ZONE;
    let mut result = String::with_capacity(span * (span * 2 + 1));

    for row in 0..span {
        for col in 0..span {
            if padded_is_dark(code, row, col) {
                result.push_str("\u{2588}\u{2588}");
            } else {
                result.push_str("  ");
            }
        }
        result.push('\n');
    }

    result
}

/// Render as compact ASCII using half-block characters, two rows per line.
pub fn to_ascii_compact(code: &QrCode) -> String {
    let span = code.size() + 2 * TERMINAL_QUIET_ZONE;
    let mut result = String::new();

    for row in (0..span).step_by(2) {
        for col in 0..span {
            let top = padded_is_dark(code, row, col);
            let bottom = padded_is_dark(code, row + 1, col);

            let ch = match (top, bottom) {
                (true, true) => '\u{2588}',  // Full block
                (true, false) => '\u{2580}', // Upper half block
                (false, true) => '\u{2584}', // Lower half block
                (false, false) => ' ',
            };
            result.push(ch);
        }
        result.push('\n');
    }

    result
}
