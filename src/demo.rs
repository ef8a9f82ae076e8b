//! Bundled example scenes, rendered by the `obsidian` binary

use crate::geometry::{Bounds, Circle, HasBounds, Line, Point, Rectangle, Style, Text};
use crate::layout::Group;
use crate::Canvas;

/// A named scene builder
pub struct Scene {
    pub name: &'static str,
    pub description: &'static str,
    pub build: fn() -> Canvas,
}

pub const SCENES: &[Scene] = &[
    Scene {
        name: "circle",
        description: "a single circle pinned to the middle of the canvas",
        build: circle,
    },
    Scene {
        name: "boxes",
        description: "a row of equal boxes framed by a rectangle around them",
        build: boxes,
    },
    Scene {
        name: "diagram",
        description: "two labelled nodes joined by a link",
        build: diagram,
    },
];

/// Look up a bundled scene by name
pub fn find(name: &str) -> Option<&'static Scene> {
    SCENES.iter().find(|scene| scene.name == name)
}

pub fn circle() -> Canvas {
    let circle = Circle::free("dot").with_style(Style::from([("fill", "ink")]));
    let group = Group::new()
        .with_constraint(circle.x.eq_to(50.0))
        .with_constraint(circle.y.eq_to(50.0))
        .with_constraint(circle.radius.eq_to(10.0))
        .with_shape(circle);
    Canvas::new(group, 100.0, 100.0)
}

pub fn boxes() -> Canvas {
    let style = Style::new()
        .with("fill", "accent-light")
        .with("stroke", "accent-dark")
        .with("stroke_width", 2);
    let boxes: Vec<Rectangle> = (0..3)
        .map(|i| Rectangle::free(&format!("box{i}")).with_style(style.clone()))
        .collect();

    let mut group = Group::new();

    // The frame goes first so it paints underneath.
    let all: Vec<Bounds> = boxes.iter().map(HasBounds::bounds).collect();
    if let Some(inner) = Bounds::union(&all) {
        let frame_style = Style::new()
            .with("fill", "none")
            .with("stroke", "ink-muted")
            .with("stroke_dasharray", "4 2");
        group.add(Rectangle::around_bounds(&inner, 10.0, frame_style));
    }

    let first = &boxes[0];
    group.constrain_all([
        first.x.eq_to(30.0),
        first.y.eq_to(40.0),
        first.width.eq_to(60.0),
        first.height.eq_to(40.0),
    ]);
    for pair in boxes.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        group.constrain_all([
            b.x.eq_to(a.bounds().right_edge + 20.0),
            b.y.eq_to(&a.y),
            b.width.eq_to(&a.width),
            b.height.eq_to(&a.height),
        ]);
    }

    for (i, rect) in boxes.iter().enumerate() {
        let bounds = rect.bounds();
        group.add(rect.clone());
        group.add(Text::new(
            format!("step {}", i + 1),
            12,
            Point::new(bounds.center_x(), bounds.center_y()),
        ));
    }

    Canvas::new(group, 290.0, 120.0)
}

pub fn diagram() -> Canvas {
    let node = Style::new()
        .with("fill", "paper-shade")
        .with("stroke", "ink")
        .with("stroke_width", 1.5);
    let client = Rectangle::free("client").with_style(node.clone());
    let server = Rectangle::free("server").with_style(node);
    let (cb, sb) = (client.bounds(), server.bounds());

    let link = Line::new(
        Point::new(&cb.right_edge, cb.center_y()),
        Point::new(&sb.left_edge, sb.center_y()),
    )
    .with_style(Style::new().with("stroke", "accent").with("stroke_width", 2));
    let title_anchor = Point::new(link.bounds().center_x(), 30);

    let mut group = Group::new()
        .with_shape(client.clone())
        .with_shape(server.clone())
        .with_shape(link)
        .with_shape(Text::new("client", 14, Point::new(cb.center_x(), cb.center_y())))
        .with_shape(Text::new("server", 14, Point::new(sb.center_x(), sb.center_y())))
        .with_shape(
            Text::new("request flow", 16, title_anchor)
                .with_style(Style::from([("fill", "ink-muted")])),
        );

    group.constrain_all([
        client.x.eq_to(40.0),
        client.y.eq_to(60.0),
        server.width.eq_to(&client.width),
        server.height.eq_to(&client.height),
        sb.center_vertically(&cb),
        (&server.x - &cb.right_edge).ge(80.0),
    ]);
    group.suggest(&client.width, 100.0);
    group.suggest(&client.height, 50.0);
    group.suggest(&server.x, 240.0);

    Canvas::new(group, 400.0, 160.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Primitive;

    #[test]
    fn test_every_scene_renders() {
        for scene in SCENES {
            let mut canvas = (scene.build)();
            let primitives = canvas.drawing().unwrap().len();
            assert_eq!(primitives, canvas.group().shapes().len(), "{}", scene.name);
        }
    }

    #[test]
    fn test_find_scene() {
        assert!(find("boxes").is_some());
        assert!(find("nope").is_none());
    }

    #[test]
    fn test_boxes_frame_surrounds_row() {
        let mut canvas = boxes();
        let drawing = canvas.drawing().unwrap();
        match &drawing.primitives()[0] {
            Primitive::Rect {
                x,
                y,
                width,
                height,
                ..
            } => {
                assert!((x - 20.0).abs() < 1e-6);
                assert!((y - 30.0).abs() < 1e-6);
                assert!((width - 240.0).abs() < 1e-6);
                assert!((height - 60.0).abs() < 1e-6);
            }
            other => panic!("expected the frame first, got {:?}", other),
        }
    }

    #[test]
    fn test_diagram_follows_suggestions() {
        let mut canvas = diagram();
        let drawing = canvas.drawing().unwrap();
        match &drawing.primitives()[1] {
            Primitive::Rect { x, y, width, .. } => {
                assert!((x - 240.0).abs() < 1e-6);
                assert!((y - 60.0).abs() < 1e-6);
                assert!((width - 100.0).abs() < 1e-6);
            }
            other => panic!("expected the server box, got {:?}", other),
        }
    }
}
