//! Graphics state and the `q`/`Q` stack.
//!
//! The state is a plain record: `q` pushes a copy, `Q` pops it back. Text
//! state, including both text matrices, is part of the record so that a
//! `Q` inside a text object restores text positioning too.

use std::fmt;
use std::sync::Arc;

use pdfpipe_core::{Color, ColorSpace, Font, Matrix, TextRenderMode};

/// Text state parameters (`Tc`, `Tw`, `Tz`, `TL`, `Tf`, `Tr`, `Ts`) and the
/// text matrices.
#[derive(Clone)]
pub struct TextState {
    pub char_spacing: f64,
    pub word_spacing: f64,
    /// Horizontal scaling in percent (`Tz`), 100 by default.
    pub horizontal_scaling: f64,
    pub leading: f64,
    pub font: Option<Arc<dyn Font>>,
    /// Resource name of the current font.
    pub font_name: Option<String>,
    pub font_size: f64,
    pub render_mode: TextRenderMode,
    pub rise: f64,
    pub text_matrix: Matrix,
    pub text_line_matrix: Matrix,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 100.0,
            leading: 0.0,
            font: None,
            font_name: None,
            font_size: 0.0,
            render_mode: TextRenderMode::Fill,
            rise: 0.0,
            text_matrix: Matrix::identity(),
            text_line_matrix: Matrix::identity(),
        }
    }
}

impl PartialEq for TextState {
    fn eq(&self, other: &Self) -> bool {
        let same_font = match (&self.font, &other.font) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_font
            && self.char_spacing == other.char_spacing
            && self.word_spacing == other.word_spacing
            && self.horizontal_scaling == other.horizontal_scaling
            && self.leading == other.leading
            && self.font_name == other.font_name
            && self.font_size == other.font_size
            && self.render_mode == other.render_mode
            && self.rise == other.rise
            && self.text_matrix == other.text_matrix
            && self.text_line_matrix == other.text_line_matrix
    }
}

impl fmt::Debug for TextState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextState")
            .field("font", &self.font.as_ref().map(|font| font.name().to_string()))
            .field("font_name", &self.font_name)
            .field("font_size", &self.font_size)
            .field("char_spacing", &self.char_spacing)
            .field("word_spacing", &self.word_spacing)
            .field("horizontal_scaling", &self.horizontal_scaling)
            .field("leading", &self.leading)
            .field("render_mode", &self.render_mode)
            .field("rise", &self.rise)
            .field("text_matrix", &self.text_matrix)
            .field("text_line_matrix", &self.text_line_matrix)
            .finish()
    }
}

impl TextState {
    /// `BT` and `ET`: both text matrices back to identity.
    pub fn reset_matrices(&mut self) {
        self.text_matrix = Matrix::identity();
        self.text_line_matrix = Matrix::identity();
    }

    /// `Td`: translate the line matrix and copy it to the text matrix.
    pub fn move_text(&mut self, tx: f64, ty: f64) {
        self.text_line_matrix = Matrix::translation(tx, ty).multiply(&self.text_line_matrix);
        self.text_matrix = self.text_line_matrix;
    }

    /// `TD`: set the leading to `-ty`, then `Td`.
    pub fn move_text_set_leading(&mut self, tx: f64, ty: f64) {
        self.leading = -ty;
        self.move_text(tx, ty);
    }

    /// `Tm`: set both matrices.
    pub fn set_matrix(&mut self, matrix: Matrix) {
        self.text_matrix = matrix;
        self.text_line_matrix = matrix;
    }

    /// `T*`: `0 -leading Td`.
    pub fn next_line(&mut self) {
        let leading = self.leading;
        self.move_text(0.0, -leading);
    }

    /// Horizontal scaling as a fraction.
    pub fn scaling_factor(&self) -> f64 {
        self.horizontal_scaling / 100.0
    }

    /// Advance the text matrix by `tx` text space units along the baseline.
    pub fn advance(&mut self, tx: f64) {
        self.text_matrix = Matrix::translation(tx, 0.0).multiply(&self.text_matrix);
    }

    /// The text rendering matrix without the font size: `Tm · CTM`.
    pub fn rendering_matrix(&self, ctm: &Matrix) -> Matrix {
        self.text_matrix.multiply(ctm)
    }
}

/// The graphics state record.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsState {
    pub ctm: Matrix,
    pub line_width: f64,
    pub line_cap: i64,
    pub line_join: i64,
    pub miter_limit: f64,
    pub dash_array: Vec<f64>,
    pub dash_phase: f64,
    pub flatness: f64,
    pub rendering_intent: String,
    pub stroke_color: Color,
    pub fill_color: Color,
    pub stroke_color_space: ColorSpace,
    pub fill_color_space: ColorSpace,
    pub text: TextState,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::identity(),
            line_width: 1.0,
            line_cap: 0,
            line_join: 0,
            miter_limit: 10.0,
            dash_array: Vec::new(),
            dash_phase: 0.0,
            flatness: 1.0,
            rendering_intent: "RelativeColorimetric".to_string(),
            stroke_color: Color::black(),
            fill_color: Color::black(),
            stroke_color_space: ColorSpace::DeviceGray,
            fill_color_space: ColorSpace::DeviceGray,
            text: TextState::default(),
        }
    }
}

impl GraphicsState {
    /// Graphics state with `ctm` as the initial transformation.
    pub fn with_ctm(ctm: Matrix) -> Self {
        Self {
            ctm,
            ..Self::default()
        }
    }

    // --- cm ---

    /// `cm`: `CTM' = operand · CTM`.
    pub fn concat(&mut self, matrix: &Matrix) {
        self.ctm = matrix.multiply(&self.ctm);
    }

    // --- CS / cs ---

    /// `CS`: select the stroking space and reset the color to its initial value.
    pub fn set_stroke_color_space(&mut self, space: ColorSpace) {
        self.stroke_color = space.initial_color();
        self.stroke_color_space = space;
    }

    /// `cs`: select the non-stroking space and reset the color to its initial value.
    pub fn set_fill_color_space(&mut self, space: ColorSpace) {
        self.fill_color = space.initial_color();
        self.fill_color_space = space;
    }

    // --- G g RG rg K k ---

    /// Set the stroking color together with the device space it belongs to.
    pub fn set_stroke_device_color(&mut self, space: ColorSpace, components: &[f64]) {
        self.stroke_color_space = space;
        self.stroke_color = space.color_from_components(components);
    }

    /// Set the non-stroking color together with the device space it belongs to.
    pub fn set_fill_device_color(&mut self, space: ColorSpace, components: &[f64]) {
        self.fill_color_space = space;
        self.fill_color = space.color_from_components(components);
    }
}

/// The current graphics state plus the states saved by `q`.
#[derive(Debug, Clone, Default)]
pub struct GraphicsStack {
    current: GraphicsState,
    saved: Vec<GraphicsState>,
}

impl GraphicsStack {
    pub fn new(initial: GraphicsState) -> Self {
        Self {
            current: initial,
            saved: Vec::new(),
        }
    }

    pub fn current(&self) -> &GraphicsState {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut GraphicsState {
        &mut self.current
    }

    /// Number of saved states.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    // --- q / Q ---

    /// `q`: push a copy of the current state.
    pub fn save(&mut self) {
        self.saved.push(self.current.clone());
    }

    /// `Q`: restore the most recently saved state. Returns `false` on an
    /// empty stack, leaving the state unchanged.
    pub fn restore(&mut self) -> bool {
        match self.saved.pop() {
            Some(state) => {
                self.current = state;
                true
            }
            None => false,
        }
    }

    /// Pop saved states until `depth` remain, restoring the outermost one
    /// popped.
    pub fn unwind_to(&mut self, depth: usize) {
        while self.saved.len() > depth {
            self.restore();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let gs = GraphicsState::default();
        assert_eq!(gs.line_width, 1.0);
        assert_eq!(gs.miter_limit, 10.0);
        assert_eq!(gs.text.horizontal_scaling, 100.0);
        assert_eq!(gs.stroke_color, Color::black());
        assert_eq!(gs.ctm, Matrix::identity());
    }

    #[test]
    fn save_restore_round_trip() {
        let mut stack = GraphicsStack::default();
        let before = stack.current().clone();
        stack.save();
        stack.current_mut().concat(&Matrix::new(2.0, 0.0, 0.0, 2.0, 5.0, 5.0));
        stack.current_mut().line_width = 4.0;
        stack.current_mut().text.move_text(10.0, 20.0);
        assert_eq!(stack.depth(), 1);
        assert!(stack.restore());
        assert_eq!(stack.current(), &before);
    }

    #[test]
    fn restore_on_empty_stack_is_ignored() {
        let mut stack = GraphicsStack::default();
        stack.current_mut().line_width = 3.0;
        assert!(!stack.restore());
        assert_eq!(stack.current().line_width, 3.0);
    }

    #[test]
    fn unwind_restores_outer_state() {
        let mut stack = GraphicsStack::default();
        stack.save();
        stack.current_mut().line_width = 2.0;
        stack.save();
        stack.current_mut().line_width = 3.0;
        stack.unwind_to(0);
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.current().line_width, 1.0);
    }

    #[test]
    fn concat_premultiplies() {
        let mut gs = GraphicsState::with_ctm(Matrix::translation(10.0, 0.0));
        gs.concat(&Matrix::scale(2.0, 2.0));
        // scale first, then the existing translation
        let p = gs.ctm.transform_point(pdfpipe_core::Point::new(1.0, 1.0));
        assert_eq!((p.x, p.y), (12.0, 2.0));
    }

    #[test]
    fn text_positioning() {
        let mut ts = TextState::default();
        ts.move_text(100.0, 200.0);
        assert_eq!(ts.text_matrix.e(), 100.0);
        assert_eq!(ts.text_line_matrix.f(), 200.0);

        ts.move_text_set_leading(0.0, -14.0);
        assert_eq!(ts.leading, 14.0);
        assert_eq!(ts.text_matrix.f(), 186.0);

        ts.next_line();
        assert_eq!(ts.text_matrix.f(), 172.0);
        assert_eq!(ts.text_matrix.e(), 100.0);

        ts.advance(30.0);
        assert_eq!(ts.text_matrix.e(), 130.0);
        assert_eq!(ts.text_line_matrix.e(), 100.0);

        ts.reset_matrices();
        assert_eq!(ts.text_matrix, Matrix::identity());
    }

    #[test]
    fn advance_is_in_text_space() {
        let mut ts = TextState::default();
        ts.set_matrix(Matrix::new(2.0, 0.0, 0.0, 2.0, 10.0, 10.0));
        ts.advance(5.0);
        assert_eq!(ts.text_matrix.e(), 20.0);
    }

    #[test]
    fn color_space_selection_resets_color() {
        let mut gs = GraphicsState::default();
        gs.set_fill_device_color(ColorSpace::DeviceRgb, &[1.0, 0.0, 0.0]);
        assert_eq!(gs.fill_color, Color::Rgb(1.0, 0.0, 0.0));
        gs.set_fill_color_space(ColorSpace::DeviceCmyk);
        assert_eq!(gs.fill_color, Color::Cmyk(0.0, 0.0, 0.0, 1.0));
        gs.set_stroke_color_space(ColorSpace::Separation);
        assert_eq!(gs.stroke_color, Color::Named(pdfpipe_core::X11Color::BLACK));
    }
}
