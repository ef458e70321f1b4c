//! SVG backend for [`Scene`].

use std::fmt::Write;

use crate::timeline::hit::Rect;
use crate::timeline::scene::{Color, DrawCommand, Scene};

impl Scene {
    /// Replay the scene as a standalone SVG document.
    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        let mut clip_id = 0usize;
        // writing to a String cannot fail
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = num(self.width),
            h = num(self.height)
        );

        for command in &self.commands {
            let _ = match command {
                DrawCommand::Clear { color } => writeln!(
                    out,
                    r#"<rect x="0" y="0" width="{}" height="{}"{}/>"#,
                    num(self.width),
                    num(self.height),
                    fill(*color)
                ),
                DrawCommand::FillRect { rect, color } => {
                    writeln!(out, "<rect {}{}/>", rect_attrs(rect), fill(*color))
                }
                DrawCommand::RoundRect {
                    rect,
                    radius,
                    fill: fill_color,
                    stroke,
                    stroke_width,
                } => {
                    let fill_attr = fill_color.map(fill).unwrap_or_else(|| r#" fill="none""#.to_string());
                    let stroke_attr = stroke
                        .map(|c| stroke_attrs(c, *stroke_width))
                        .unwrap_or_default();
                    writeln!(
                        out,
                        r#"<rect {} rx="{}"{}{}/>"#,
                        rect_attrs(rect),
                        num(*radius),
                        fill_attr,
                        stroke_attr
                    )
                }
                DrawCommand::Line { from, to, color, width } => writeln!(
                    out,
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}"{}/>"#,
                    num(from.0),
                    num(from.1),
                    num(to.0),
                    num(to.1),
                    stroke_attrs(*color, *width)
                ),
                DrawCommand::Polyline { points, color, width } => writeln!(
                    out,
                    r#"<polyline points="{}" fill="none"{}/>"#,
                    point_list(points),
                    stroke_attrs(*color, *width)
                ),
                DrawCommand::Polygon { points, color } => {
                    writeln!(out, r#"<polygon points="{}"{}/>"#, point_list(points), fill(*color))
                }
                DrawCommand::Text { at, text, color, size } => writeln!(
                    out,
                    r#"<text x="{}" y="{}" font-family="monospace" font-size="{}"{}>{}</text>"#,
                    num(at.0),
                    num(at.1),
                    num(*size),
                    fill(*color),
                    escape(text)
                ),
                DrawCommand::PushClip { rect, radius } => {
                    clip_id += 1;
                    writeln!(
                        out,
                        r#"<clipPath id="clip{id}"><rect {} rx="{}"/></clipPath><g clip-path="url(#clip{id})">"#,
                        rect_attrs(rect),
                        num(*radius),
                        id = clip_id
                    )
                }
                DrawCommand::PopClip => writeln!(out, "</g>"),
            };
        }

        out.push_str("</svg>\n");
        out
    }
}

fn num(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

fn rect_attrs(rect: &Rect) -> String {
    format!(
        r#"x="{}" y="{}" width="{}" height="{}""#,
        num(rect.x),
        num(rect.y),
        num(rect.w),
        num(rect.h)
    )
}

fn fill(color: Color) -> String {
    if color.a == 0xff {
        format!(r#" fill="{}""#, color.to_hex())
    } else {
        format!(r#" fill="{}" fill-opacity="{:.3}""#, color.to_hex(), color.opacity())
    }
}

fn stroke_attrs(color: Color, width: f64) -> String {
    let mut attrs = format!(r#" stroke="{}" stroke-width="{}""#, color.to_hex(), num(width));
    if color.a != 0xff {
        let _ = write!(attrs, r#" stroke-opacity="{:.3}""#, color.opacity());
    }
    attrs
}

fn point_list(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{},{}", num(*x), num(*y)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
