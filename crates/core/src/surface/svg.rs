use std::fmt::Write;

use crate::models::chart::{
    DrawCommand, LayoutSize, LineCap, Path, PathSegment, PixelSize, TextAlign,
};

/// Render recorded commands as a standalone SVG document.
///
/// `width`/`height` carry the layout size and `viewBox` the backing buffer,
/// so the drawing keeps its device-pixel detail while occupying its CSS box.
pub fn render(backing: PixelSize, layout: LayoutSize, commands: &[DrawCommand]) -> String {
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        fmt_num(layout.width),
        fmt_num(layout.height),
        backing.width,
        backing.height
    );

    for command in commands {
        match command {
            DrawCommand::StrokePath { path, stroke } => {
                let cap = match stroke.cap {
                    LineCap::Butt => "butt",
                    LineCap::Round => "round",
                };
                let _ = write!(
                    svg,
                    r#"<path d="{}" fill="none" stroke="{}" stroke-width="{}" stroke-linecap="{cap}" stroke-linejoin="round"/>"#,
                    path_data(path),
                    stroke.color.to_css(),
                    fmt_num(stroke.width),
                );
            }
            DrawCommand::FillText { text, at, style } => {
                let anchor = match style.align {
                    TextAlign::Left => "start",
                    TextAlign::Right => "end",
                };
                let _ = write!(
                    svg,
                    r#"<text x="{}" y="{}" fill="{}" font-size="{}" font-family="sans-serif" text-anchor="{anchor}">{}</text>"#,
                    fmt_num(at.x),
                    fmt_num(at.y),
                    style.color.to_css(),
                    fmt_num(style.size_px),
                    escape(text),
                );
            }
        }
    }

    svg.push_str("</svg>");
    svg
}

/// SVG path data (`M x y Q cx cy x y L x y …`).
pub fn path_data(path: &Path) -> String {
    let parts: Vec<String> = path
        .segments
        .iter()
        .map(|segment| match segment {
            PathSegment::MoveTo(p) => format!("M{} {}", fmt_num(p.x), fmt_num(p.y)),
            PathSegment::LineTo(p) => format!("L{} {}", fmt_num(p.x), fmt_num(p.y)),
            PathSegment::QuadTo { control, to } => format!(
                "Q{} {} {} {}",
                fmt_num(control.x),
                fmt_num(control.y),
                fmt_num(to.x),
                fmt_num(to.y)
            ),
        })
        .collect();
    parts.join(" ")
}

/// Two decimals, trailing zeros trimmed.
fn fmt_num(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

