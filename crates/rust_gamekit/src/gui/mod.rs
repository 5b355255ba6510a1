//! GUI System Module
//!
//! Nodes are a closed set of widgets stored in a [`GuiScreen`], which
//! keeps them ordered by `z`. Rendering runs from low to high `z`; clicks
//! travel the other way and stop at the first node that handles them.

pub mod widgets;

pub use widgets::{ButtonLabel, GuiBackground, GuiButton, GuiText};

use crate::foundation::math::Vec2f;
use crate::input::{InputState, MouseAction, MouseButton};
use crate::render::{GraphicsBackend, Renderer};

/// Outcome of offering a click to a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickResult {
    /// The click passes on to the nodes below
    NotHandled,
    /// The click stops here without an action
    Consumed,
    /// A button fired its action
    Clicked(u32),
}

impl ClickResult {
    /// Whether the click stops at this node
    pub fn is_handled(self) -> bool {
        self != ClickResult::NotHandled
    }
}

/// GUI element storage
#[derive(Debug, Clone)]
pub enum GuiNode {
    /// Filled rectangle
    Background(GuiBackground),
    /// Clickable button
    Button(GuiButton),
    /// Static text
    Text(GuiText),
}

impl GuiNode {
    /// Draw order; higher is drawn later and clicked first
    pub fn z(&self) -> i32 {
        match self {
            GuiNode::Background(n) => n.z,
            GuiNode::Button(n) => n.z,
            GuiNode::Text(n) => n.z,
        }
    }

    /// Bottom-left corner
    pub fn pos(&self) -> Vec2f {
        match self {
            GuiNode::Background(n) => n.pos,
            GuiNode::Button(n) => n.bounds.pos,
            GuiNode::Text(n) => n.pos,
        }
    }

    /// Extent; text reports a square of its height
    pub fn size(&self) -> Vec2f {
        match self {
            GuiNode::Background(n) => n.size,
            GuiNode::Button(n) => n.bounds.size,
            GuiNode::Text(n) => Vec2f::new(n.height, n.height),
        }
    }

    /// Per-frame hook; every current widget is static
    pub fn update(&mut self) {}

    /// Draw the node
    pub fn render<B: GraphicsBackend>(&self, renderer: &mut Renderer<B>) {
        match self {
            GuiNode::Background(n) => n.render(renderer),
            GuiNode::Button(n) => n.render(renderer),
            GuiNode::Text(n) => n.render(renderer),
        }
    }

    /// Offer a click at `cursor` to the node
    pub fn handle_click(&self, cursor: Vec2f, button: MouseButton, action: MouseAction) -> ClickResult {
        match self {
            GuiNode::Button(n) => n.handle_click(cursor, button, action),
            GuiNode::Background(_) | GuiNode::Text(_) => ClickResult::NotHandled,
        }
    }
}

impl From<GuiBackground> for GuiNode {
    fn from(node: GuiBackground) -> Self {
        GuiNode::Background(node)
    }
}

impl From<GuiButton> for GuiNode {
    fn from(node: GuiButton) -> Self {
        GuiNode::Button(node)
    }
}

impl From<GuiText> for GuiNode {
    fn from(node: GuiText) -> Self {
        GuiNode::Text(node)
    }
}

/// A z-ordered set of nodes
#[derive(Debug, Clone, Default)]
pub struct GuiScreen {
    nodes: Vec<GuiNode>,
}

impl GuiScreen {
    /// Empty screen
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert after every node with the same or lower `z`
    pub fn add(&mut self, node: impl Into<GuiNode>) {
        let node = node.into();
        let index = self.nodes.partition_point(|n| n.z() <= node.z());
        self.nodes.insert(index, node);
    }

    /// Nodes from low to high `z`
    pub fn nodes(&self) -> &[GuiNode] {
        &self.nodes
    }

    /// Remove every node
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Run the per-frame hook of every node
    pub fn update(&mut self) {
        for node in &mut self.nodes {
            node.update();
        }
    }

    /// Draw every node from low to high `z`
    pub fn render<B: GraphicsBackend>(&self, renderer: &mut Renderer<B>) {
        for node in &self.nodes {
            node.render(renderer);
        }
    }

    /// Offer a click from the top node down until one handles it
    pub fn handle_click(&self, cursor: Vec2f, button: MouseButton, action: MouseAction) -> ClickResult {
        self.nodes
            .iter()
            .rev()
            .map(|node| node.handle_click(cursor, button, action))
            .find(|result| result.is_handled())
            .unwrap_or(ClickResult::NotHandled)
    }

    /// Deliver every queued click at the current cursor; returns fired actions
    pub fn dispatch_clicks(&self, input: &mut InputState) -> Vec<u32> {
        let cursor = input.cursor_position();
        input
            .drain_clicks()
            .filter_map(|click| match self.handle_click(cursor, click.button, click.action) {
                ClickResult::Clicked(id) => Some(id),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::color;
    use crate::render::font::stub::StubSource;
    use crate::render::font::{FontConfig, TruetypeFont, HEIGHT_TO_LOAD};
    use crate::render::{DrawCommand, HeadlessBackend};

    fn config() -> FontConfig {
        let font = TruetypeFont::from_source(Box::new(StubSource::new()), HEIGHT_TO_LOAD).unwrap();
        FontConfig::new(font.shared())
    }

    fn button(z: i32, action_id: u32) -> GuiButton {
        GuiButton::new(z, Vec2f::new(-0.5, -0.5), Vec2f::new(1.0, 1.0), action_id)
    }

    #[test]
    fn test_button_click() {
        let b = button(0, 7);

        assert_eq!(
            b.handle_click(Vec2f::zeros(), MouseButton::Left, MouseAction::Press),
            ClickResult::Clicked(7)
        );
        assert_eq!(
            b.handle_click(Vec2f::zeros(), MouseButton::Left, MouseAction::Release),
            ClickResult::Consumed
        );
        assert_eq!(
            b.handle_click(Vec2f::zeros(), MouseButton::Right, MouseAction::Press),
            ClickResult::Consumed
        );
        assert_eq!(
            b.handle_click(Vec2f::new(0.9, 0.0), MouseButton::Left, MouseAction::Press),
            ClickResult::NotHandled
        );
    }

    #[test]
    fn test_nodes_sorted_by_z() {
        let mut screen = GuiScreen::new();
        screen.add(button(5, 1));
        screen.add(GuiBackground::new(0, Vec2f::zeros(), Vec2f::new(1.0, 1.0), color::black()));
        screen.add(button(5, 2));
        screen.add(button(-1, 3));

        let zs: Vec<i32> = screen.nodes().iter().map(GuiNode::z).collect();
        assert_eq!(zs, vec![-1, 0, 5, 5]);

        // equal z keeps insertion order
        assert!(matches!(&screen.nodes()[2], GuiNode::Button(b) if b.action_id == 1));
    }

    #[test]
    fn test_click_goes_to_topmost() {
        let mut screen = GuiScreen::new();
        screen.add(button(1, 10));
        screen.add(button(2, 20));
        screen.add(GuiText::new(3, Vec2f::zeros(), 0.1, "over", config()));

        let result = screen.handle_click(Vec2f::zeros(), MouseButton::Left, MouseAction::Press);

        assert_eq!(result, ClickResult::Clicked(20));
    }

    #[test]
    fn test_click_misses_everything() {
        let mut screen = GuiScreen::new();
        screen.add(button(1, 10));
        screen.add(GuiBackground::new(0, Vec2f::new(-1.0, -1.0), Vec2f::new(2.0, 2.0), color::black()));

        let result = screen.handle_click(Vec2f::new(0.9, 0.9), MouseButton::Left, MouseAction::Press);

        assert_eq!(result, ClickResult::NotHandled);
    }

    #[test]
    fn test_dispatch_clicks_from_input() {
        let mut screen = GuiScreen::new();
        screen.add(button(0, 4));
        let mut input = InputState::new(100, 100);
        input.cursor_moved(50.0, 50.0);
        input.mouse_event(MouseButton::Left, MouseAction::Press);
        input.mouse_event(MouseButton::Left, MouseAction::Release);

        assert_eq!(screen.dispatch_clicks(&mut input), vec![4]);
        assert!(screen.dispatch_clicks(&mut input).is_empty());
    }

    #[test]
    fn test_render_order_low_to_high() {
        let mut screen = GuiScreen::new();
        screen.add(GuiBackground::new(1, Vec2f::zeros(), Vec2f::new(0.2, 0.2), color::white()));
        screen.add(
            GuiBackground::new(0, Vec2f::zeros(), Vec2f::new(0.4, 0.4), color::black())
                .with_stroke(color::white()),
        );
        let mut renderer = Renderer::new(HeadlessBackend::new(100, 100));

        screen.render(&mut renderer);

        let commands = renderer.backend().commands();
        assert!(matches!(
            &commands[0],
            DrawCommand::Quad { color: c, .. } if *c == color::black()
        ));
        assert!(matches!(&commands[1], DrawCommand::LineStrip { points, .. } if points.len() == 5));
        assert!(matches!(
            &commands[2],
            DrawCommand::Quad { color: c, .. } if *c == color::white()
        ));
    }

    #[test]
    fn test_text_and_label_render_glyphs() {
        let mut screen = GuiScreen::new();
        screen.add(GuiText::new(0, Vec2f::zeros(), 0.1, "Hi", config()));
        screen.add(button(1, 1).with_label("OK", 0.1, config()));
        let mut renderer = Renderer::new(HeadlessBackend::new(100, 100));

        screen.render(&mut renderer);

        assert_eq!(renderer.backend().textured_quads().count(), 4);
    }

    #[test]
    fn test_text_node_extent() {
        let node = GuiNode::from(GuiText::new(0, Vec2f::new(0.1, 0.2), 0.3, "x", config()));

        assert_eq!(node.pos(), Vec2f::new(0.1, 0.2));
        assert_eq!(node.size(), Vec2f::new(0.3, 0.3));
        assert_eq!(
            node.handle_click(Vec2f::new(0.1, 0.2), MouseButton::Left, MouseAction::Press),
            ClickResult::NotHandled
        );
    }
}
