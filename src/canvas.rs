//! The render pipeline: solve a group, project its shapes, cache the drawing

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::geometry::{Circle, Line, Rectangle, Shape, Text};
use crate::layout::{Group, LayoutError, Solution, SolverError};
use crate::renderer::{Drawing, Primitive, SvgConfig};
use crate::stylesheet::Stylesheet;
use crate::RenderError;

/// Whether a canvas holds a rendered drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Unrendered,
    Rendered,
}

/// A fixed-size surface owning one group
///
/// The drawing is produced at most once per change: saving twice in a row
/// solves once. Mutating the group through [`Canvas::group_mut`] or calling
/// [`Canvas::invalidate`] discards the cached drawing.
#[derive(Debug, Clone)]
pub struct Canvas {
    group: Group,
    width: f64,
    height: f64,
    config: SvgConfig,
    stylesheet: Stylesheet,
    rendered: Option<Drawing>,
    render_count: usize,
}

impl Canvas {
    pub fn new(group: Group, width: f64, height: f64) -> Self {
        Self {
            group,
            width,
            height,
            config: SvgConfig::default(),
            stylesheet: Stylesheet::default(),
            rendered: None,
            render_count: 0,
        }
    }

    pub fn with_config(mut self, config: SvgConfig) -> Self {
        self.config = config;
        self
    }

    /// Palette used to resolve colour tokens in styles
    pub fn with_stylesheet(mut self, stylesheet: Stylesheet) -> Self {
        self.stylesheet = stylesheet;
        self
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn config(&self) -> &SvgConfig {
        &self.config
    }

    pub fn stylesheet(&self) -> &Stylesheet {
        &self.stylesheet
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    /// Mutable access to the group; the cached drawing is discarded
    pub fn group_mut(&mut self) -> &mut Group {
        self.invalidate();
        &mut self.group
    }

    pub fn state(&self) -> RenderState {
        if self.rendered.is_some() {
            RenderState::Rendered
        } else {
            RenderState::Unrendered
        }
    }

    /// Number of solve-and-project passes run so far
    pub fn render_count(&self) -> usize {
        self.render_count
    }

    pub fn invalidate(&mut self) {
        self.rendered = None;
    }

    /// Solve and project unconditionally, replacing any cached drawing
    pub fn render(&mut self) -> Result<&Drawing, RenderError> {
        let drawing = self.build_drawing()?;
        let drawing: &Drawing = self.rendered.insert(drawing);
        Ok(drawing)
    }

    /// The cached drawing, rendering it first if needed
    pub fn drawing(&mut self) -> Result<&Drawing, RenderError> {
        self.cached().map(|(drawing, _, _)| drawing)
    }

    pub fn to_svg(&mut self) -> Result<String, RenderError> {
        let (drawing, config, stylesheet) = self.cached()?;
        Ok(drawing.to_svg(config, stylesheet))
    }

    pub fn to_png(&mut self) -> Result<Vec<u8>, RenderError> {
        let (drawing, config, stylesheet) = self.cached()?;
        drawing.to_png(config, stylesheet, config.png_scale)
    }

    /// Write the drawing as SVG and return the written path
    pub fn save_svg(&mut self, path: impl AsRef<Path>) -> Result<PathBuf, RenderError> {
        let svg = self.to_svg()?;
        write_file(path.as_ref(), svg.as_bytes())
    }

    /// Write the drawing as PNG and return the written path
    pub fn save_png(&mut self, path: impl AsRef<Path>) -> Result<PathBuf, RenderError> {
        let png = self.to_png()?;
        write_file(path.as_ref(), &png)
    }

    /// The cached drawing alongside the settings it is serialised with
    fn cached(&mut self) -> Result<(&Drawing, &SvgConfig, &Stylesheet), RenderError> {
        let drawing = match self.rendered.take() {
            Some(drawing) => drawing,
            None => self.build_drawing()?,
        };
        let drawing: &Drawing = self.rendered.insert(drawing);
        Ok((drawing, &self.config, &self.stylesheet))
    }

    fn build_drawing(&mut self) -> Result<Drawing, RenderError> {
        let solution = self.group.solve()?;

        let mut drawing = Drawing::new(self.width, self.height);
        for shape in self.group.shapes() {
            drawing.push(project(shape, &solution).map_err(LayoutError::from)?);
        }

        self.render_count += 1;
        debug!(
            primitives = drawing.len(),
            pass = self.render_count,
            "rendered canvas"
        );
        Ok(drawing)
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<PathBuf, RenderError> {
    std::fs::write(path, contents).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("wrote {}", path.display());
    Ok(path.to_path_buf())
}

/// Evaluate a shape against a solution, yielding exactly one primitive
fn project(shape: &Shape, solution: &Solution) -> Result<Primitive, SolverError> {
    match shape {
        Shape::Rectangle(rect) => render_rect(rect, solution),
        Shape::Circle(circle) => render_circle(circle, solution),
        Shape::Line(line) => render_line(line, solution),
        Shape::Text(text) => render_text(text, solution),
    }
}

fn render_rect(rect: &Rectangle, solution: &Solution) -> Result<Primitive, SolverError> {
    Ok(Primitive::Rect {
        x: solution.evaluate(&rect.x)?,
        y: solution.evaluate(&rect.y)?,
        width: solution.evaluate(&rect.width)?,
        height: solution.evaluate(&rect.height)?,
        style: rect.style.clone(),
    })
}

fn render_circle(circle: &Circle, solution: &Solution) -> Result<Primitive, SolverError> {
    Ok(Primitive::Circle {
        cx: solution.evaluate(&circle.x)?,
        cy: solution.evaluate(&circle.y)?,
        r: solution.evaluate(&circle.radius)?,
        style: circle.style.clone(),
    })
}

fn render_line(line: &Line, solution: &Solution) -> Result<Primitive, SolverError> {
    Ok(Primitive::Line {
        x1: solution.evaluate(&line.pt1.x)?,
        y1: solution.evaluate(&line.pt1.y)?,
        x2: solution.evaluate(&line.pt2.x)?,
        y2: solution.evaluate(&line.pt2.y)?,
        style: line.style.clone(),
    })
}

fn render_text(text: &Text, solution: &Solution) -> Result<Primitive, SolverError> {
    Ok(Primitive::Text {
        content: text.text.clone(),
        font_size: solution.evaluate(&text.font_size)?,
        x: solution.evaluate(&text.anchor_point.x)?,
        y: solution.evaluate(&text.anchor_point.y)?,
        style: text.style.clone(),
    })
}
