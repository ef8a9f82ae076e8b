//! SVG generation from drawing primitives

use crate::geometry::style::attribute_name;
use crate::geometry::Style;
use crate::stylesheet::Stylesheet;

use super::{Drawing, Primitive, SvgConfig};

/// Build SVG elements incrementally
pub struct SvgBuilder {
    config: SvgConfig,
    elements: Vec<String>,
    indent: usize,
}

impl SvgBuilder {
    /// Create a new SVG builder
    pub fn new(config: SvgConfig) -> Self {
        Self {
            config,
            elements: vec![],
            indent: 1,
        }
    }

    fn prefix(&self) -> String {
        self.config.class_prefix.clone().unwrap_or_default()
    }

    fn indent_str(&self) -> String {
        if self.config.pretty_print {
            "  ".repeat(self.indent)
        } else {
            String::new()
        }
    }

    fn newline(&self) -> &str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    fn num(&self, value: f64) -> String {
        format_number(value, self.config.precision)
    }

    fn class_list(&self, kind: &str, classes: &[String]) -> String {
        let prefix = self.prefix();
        std::iter::once(format!("{}shape", prefix))
            .chain(std::iter::once(format!("{}{}", prefix, kind)))
            .chain(classes.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Add a rectangle covering the whole canvas
    pub fn add_background(&mut self, width: f64, height: f64, fill: &str) {
        self.elements.push(format!(
            r#"{}<rect class="{}background" x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
            self.indent_str(),
            self.prefix(),
            self.num(width),
            self.num(height),
            escape_xml(fill)
        ));
    }

    /// Add a rectangle element
    pub fn add_rect(&mut self, x: f64, y: f64, w: f64, h: f64, classes: &[String], styles: &str) {
        self.elements.push(format!(
            r#"{}<rect class="{}" x="{}" y="{}" width="{}" height="{}"{}/>"#,
            self.indent_str(),
            self.class_list("rect", classes),
            self.num(x),
            self.num(y),
            self.num(w),
            self.num(h),
            styles
        ));
    }

    /// Add a circle element
    pub fn add_circle(&mut self, cx: f64, cy: f64, r: f64, classes: &[String], styles: &str) {
        self.elements.push(format!(
            r#"{}<circle class="{}" cx="{}" cy="{}" r="{}"{}/>"#,
            self.indent_str(),
            self.class_list("circle", classes),
            self.num(cx),
            self.num(cy),
            self.num(r),
            styles
        ));
    }

    /// Add a line element
    pub fn add_line(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        classes: &[String],
        styles: &str,
    ) {
        self.elements.push(format!(
            r#"{}<line class="{}" x1="{}" y1="{}" x2="{}" y2="{}"{}/>"#,
            self.indent_str(),
            self.class_list("line", classes),
            self.num(x1),
            self.num(y1),
            self.num(x2),
            self.num(y2),
            styles
        ));
    }

    /// Add a text element centred on (x, y)
    pub fn add_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        font_size: f64,
        classes: &[String],
        styles: &str,
    ) {
        self.elements.push(format!(
            r#"{}<text class="{}" x="{}" y="{}" font-size="{}" text-anchor="middle" dominant-baseline="middle"{}>{}</text>"#,
            self.indent_str(),
            self.class_list("text", classes),
            self.num(x),
            self.num(y),
            self.num(font_size),
            styles,
            escape_xml(text)
        ));
    }

    /// Build the final SVG string for a `width` x `height` canvas
    pub fn build(self, width: f64, height: f64) -> String {
        let nl = self.newline();
        let w = self.num(width);
        let h = self.num(height);

        let mut svg = String::new();

        // XML declaration for standalone
        if self.config.standalone {
            svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            svg.push_str(nl);
        }

        // SVG root element
        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        ));
        svg.push_str(nl);

        for elem in &self.elements {
            svg.push_str(elem);
            svg.push_str(nl);
        }

        svg.push_str("</svg>");

        svg
    }
}

/// Render a drawing to an SVG string
pub fn render_svg(drawing: &Drawing, config: &SvgConfig, stylesheet: &Stylesheet) -> String {
    let mut builder = SvgBuilder::new(config.clone());

    if let Some(background) = &config.background {
        builder.add_background(
            drawing.width,
            drawing.height,
            stylesheet.resolve_value(background),
        );
    }

    for primitive in drawing.primitives() {
        render_primitive(primitive, stylesheet, &mut builder);
    }

    builder.build(drawing.width, drawing.height)
}

/// Render a single primitive to the builder
fn render_primitive(primitive: &Primitive, stylesheet: &Stylesheet, builder: &mut SvgBuilder) {
    let style = primitive.style();
    let classes = css_classes(style);
    let styles = format_styles(style, stylesheet);

    match primitive {
        Primitive::Rect {
            x,
            y,
            width,
            height,
            ..
        } => builder.add_rect(*x, *y, *width, *height, &classes, &styles),
        Primitive::Circle { cx, cy, r, .. } => builder.add_circle(*cx, *cy, *r, &classes, &styles),
        Primitive::Line { x1, y1, x2, y2, .. } => {
            builder.add_line(*x1, *y1, *x2, *y2, &classes, &styles)
        }
        Primitive::Text {
            content,
            font_size,
            x,
            y,
            ..
        } => builder.add_text(content, *x, *y, *font_size, &classes, &styles),
    }
}

/// Extra CSS classes requested through a `class` style entry
fn css_classes(style: &Style) -> Vec<String> {
    style
        .get("class")
        .map(|c| c.split_whitespace().map(String::from).collect())
        .unwrap_or_default()
}

/// Format a style map as SVG attributes, resolving palette tokens
fn format_styles(style: &Style, stylesheet: &Stylesheet) -> String {
    style
        .iter()
        .filter(|(key, _)| *key != "class")
        .map(|(key, value)| {
            format!(
                r#" {}="{}""#,
                attribute_name(key),
                escape_xml(stylesheet.resolve_value(value))
            )
        })
        .collect()
}

/// Round to `precision` decimals and print without trailing zeros
pub fn format_number(value: f64, precision: usize) -> String {
    let factor = 10f64.powi(precision as i32);
    let rounded = (value * factor).round() / factor;
    // Avoid "-0" for values that round to zero
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{}", rounded)
    }
}

/// Escape special XML characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
