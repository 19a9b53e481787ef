//! The stream processor: operand stack, operator dispatch and event emission.
//!
//! Tokens come from the [`Lexer`]; operands accumulate on a stack until an
//! operator pops the number its table entry declares. Every operator then
//! clears the stack. Handlers mutate the [`GraphicsStack`] and the
//! [`PathBuffer`] and publish events to the [`EventPipe`] in stream order.

use std::mem;
use std::sync::Arc;

use pdfpipe_core::{
    ColorSpace, EventPipe, ExtractOptions, ExtractWarning, ExtractWarningCode, FillEvent,
    ImageEvent, MarkedContent, Matrix, PageInfo, Path, PathBuffer, Point, StrokeEvent,
    TextRenderMode,
};
use tracing::{debug, trace, warn};

use crate::error::{InterpretError, ObjectError};
use crate::font::default_font;
use crate::graphics_state::{GraphicsStack, GraphicsState};
use crate::lexer::{InlineImage, Lexer, Token};
use crate::object::Object;
use crate::operators::{Arity, Op, OperatorSpec};
use crate::page::PageSource;
use crate::resources::{FormXObject, ImageInfo, Resources, XObject};
use crate::text;

/// Interprets content streams page by page.
///
/// A processor is reused across pages; [`process_page`](Self::process_page)
/// resets all per-page state. It is not shared between threads: parallel
/// callers create one processor per worker.
#[derive(Debug)]
pub struct StreamProcessor {
    options: ExtractOptions,
    stack: GraphicsStack,
    path: PathBuffer,
    operands: Vec<Object>,
    /// Nesting of `BX`/`EX` sections.
    compatibility: usize,
    in_text: bool,
    marked_content: Vec<MarkedContent>,
    warnings: Vec<ExtractWarning>,
    page_index: usize,
    operator_count: usize,
    /// Zero-based position of the operator being executed.
    current_operator: usize,
    form_depth: usize,
    /// Stack depth below which `Q` may not pop in the current stream.
    floor: usize,
    halted: bool,
}

impl Default for StreamProcessor {
    fn default() -> Self {
        Self::new(ExtractOptions::default())
    }
}

impl StreamProcessor {
    pub fn new(options: ExtractOptions) -> Self {
        Self {
            options,
            stack: GraphicsStack::default(),
            path: PathBuffer::new(),
            operands: Vec::new(),
            compatibility: 0,
            in_text: false,
            marked_content: Vec::new(),
            warnings: Vec::new(),
            page_index: 0,
            operator_count: 0,
            current_operator: 0,
            form_depth: 0,
            floor: 0,
            halted: false,
        }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Graphics state as left by the last processed page.
    pub fn graphics_state(&self) -> &GraphicsState {
        self.stack.current()
    }

    /// Number of states saved by `q` and not yet restored.
    pub fn stack_depth(&self) -> usize {
        self.stack.depth()
    }

    fn reset(&mut self, page_index: usize) {
        self.stack = GraphicsStack::default();
        self.path.clear();
        self.operands.clear();
        self.compatibility = 0;
        self.in_text = false;
        self.marked_content.clear();
        self.warnings.clear();
        self.page_index = page_index;
        self.operator_count = 0;
        self.current_operator = 0;
        self.form_depth = 0;
        self.floor = 0;
        self.halted = false;
    }

    /// Interpret one page, publishing `BeginPage`, the page's events and
    /// `EndPage` to `pipe`.
    ///
    /// Returns the warnings raised on the page (empty when
    /// `collect_warnings` is off).
    ///
    /// # Errors
    ///
    /// A lex error, a content decoding error or, in strict mode, an operand
    /// error aborts the page; `EndPage` is not emitted in that case.
    pub fn process_page<P: PageSource + ?Sized>(
        &mut self,
        page: &P,
        page_index: usize,
        pipe: &mut EventPipe<'_>,
    ) -> Result<Vec<ExtractWarning>, InterpretError> {
        self.reset(page_index);
        let content = page.content()?;
        debug!(page = page_index, bytes = content.len(), "begin page");
        pipe.begin_page(PageInfo {
            index: page_index,
            media_box: page.media_box(),
        });

        if content.len() > self.options.max_stream_bytes {
            let description = format!(
                "content stream of {} bytes exceeds limit of {} bytes",
                content.len(),
                self.options.max_stream_bytes
            );
            self.warn(pipe, ExtractWarningCode::ResourceLimitReached, description, None);
        } else {
            self.execute(&content, page.resources(), pipe)?;
        }

        let base_depth = 0;
        if self.stack.depth() > base_depth {
            debug!(page = page_index, depth = self.stack.depth(), "unbalanced q at end of page");
            self.stack.unwind_to(base_depth);
        }
        pipe.end_page(page_index);
        debug!(page = page_index, operators = self.operator_count, "end page");
        Ok(mem::take(&mut self.warnings))
    }

    /// Run the tokens of one content stream.
    fn execute(
        &mut self,
        content: &[u8],
        resources: &Resources,
        pipe: &mut EventPipe<'_>,
    ) -> Result<(), InterpretError> {
        for token in Lexer::new(content) {
            if self.halted {
                break;
            }
            match token? {
                Token::Operand(obj) => self.operands.push(obj),
                Token::Operator(spec) => {
                    if self.count_operator(spec.mnemonic, pipe) {
                        trace!(operator = spec.mnemonic, operands = self.operands.len(), "dispatch");
                        self.dispatch(spec, resources, pipe)?;
                    }
                    self.operands.clear();
                }
                Token::Unknown(keyword) => {
                    if self.count_operator(&keyword, pipe) && self.compatibility == 0 {
                        let description = format!("unknown operator {keyword}");
                        self.warn(pipe, ExtractWarningCode::UnsupportedOperator, description, Some(&keyword));
                    }
                    self.operands.clear();
                }
                Token::InlineImage(image) => {
                    if self.count_operator("BI", pipe) && self.options.emit_inline_images {
                        self.paint_inline_image(image, pipe);
                    }
                    self.operands.clear();
                }
            }
        }
        Ok(())
    }

    /// Count an operator against `max_operators_per_page`. Returns `false`
    /// once the limit is hit.
    fn count_operator(&mut self, mnemonic: &str, pipe: &mut EventPipe<'_>) -> bool {
        self.current_operator = self.operator_count;
        if let Some(limit) = self.options.max_operators_per_page {
            if self.operator_count >= limit {
                let description = format!("operator limit of {limit} reached, rest of page skipped");
                self.warn(pipe, ExtractWarningCode::ResourceLimitReached, description, Some(mnemonic));
                self.halted = true;
                return false;
            }
        }
        self.operator_count += 1;
        true
    }

    fn dispatch(
        &mut self,
        spec: &'static OperatorSpec,
        resources: &Resources,
        pipe: &mut EventPipe<'_>,
    ) -> Result<(), InterpretError> {
        let operands = match spec.arity {
            Arity::Fixed(n) if self.operands.len() < n => {
                let err = InterpretError::operand(
                    spec.mnemonic,
                    format!("expected {n} operands, found {}", self.operands.len()),
                );
                return self.operand_error(spec, err, pipe);
            }
            Arity::Fixed(n) => self.operands.split_off(self.operands.len() - n),
            Arity::Variadic => mem::take(&mut self.operands),
        };
        match self.apply(spec, &operands, resources, pipe) {
            Ok(()) => Ok(()),
            Err(err @ (InterpretError::Operand { .. } | InterpretError::Object(_))) => {
                self.operand_error(spec, err, pipe)
            }
            Err(err) => Err(err),
        }
    }

    /// Skip silently inside `BX`/`EX`, fail in strict mode, warn otherwise.
    fn operand_error(
        &mut self,
        spec: &'static OperatorSpec,
        err: InterpretError,
        pipe: &mut EventPipe<'_>,
    ) -> Result<(), InterpretError> {
        if self.compatibility > 0 {
            return Ok(());
        }
        if self.options.strict_mode {
            return Err(match err {
                InterpretError::Object(e) => InterpretError::operand(spec.mnemonic, e.to_string()),
                other => other,
            });
        }
        let description = match err {
            InterpretError::Operand { message, .. } => message,
            other => other.to_string(),
        };
        self.warn(pipe, ExtractWarningCode::MalformedOperand, description, Some(spec.mnemonic));
        Ok(())
    }

    fn warn(
        &mut self,
        pipe: &mut EventPipe<'_>,
        code: ExtractWarningCode,
        description: String,
        operator: Option<&str>,
    ) {
        let mut warning = ExtractWarning::with_code(code, description).on_page(self.page_index);
        if let Some(op) = operator {
            warning = warning.at_operator(self.current_operator, op);
        }
        if code_has_font(&warning.code) {
            if let Some(name) = &self.stack.current().text.font_name {
                warning = warning.with_font(name.clone());
            }
        }
        warn!(
            page = self.page_index,
            operator = operator.unwrap_or(""),
            code = %warning.code,
            "{}",
            warning.description
        );
        if self.options.collect_warnings {
            pipe.warn(&warning);
            self.warnings.push(warning);
        }
    }

    fn apply(
        &mut self,
        spec: &'static OperatorSpec,
        ops: &[Object],
        resources: &Resources,
        pipe: &mut EventPipe<'_>,
    ) -> Result<(), InterpretError> {
        let ctm = self.stack.current().ctm;
        match spec.op {
            // --- graphics state ---
            Op::Save => self.stack.save(),
            Op::Restore => {
                if self.stack.depth() > self.floor {
                    self.stack.restore();
                } else {
                    let description = "Q without matching q".to_string();
                    self.warn(pipe, ExtractWarningCode::UnbalancedState, description, Some(spec.mnemonic));
                }
            }
            Op::Concat => {
                let m = matrix(ops)?;
                self.gs().concat(&m);
            }
            Op::LineWidth => self.gs().line_width = number(ops, 0)?,
            Op::LineCap => self.gs().line_cap = number(ops, 0)? as i64,
            Op::LineJoin => self.gs().line_join = number(ops, 0)? as i64,
            Op::MiterLimit => self.gs().miter_limit = number(ops, 0)?,
            Op::Dash => {
                let array = operand(ops, 0)?.as_numbers()?;
                let phase = number(ops, 1)?;
                let gs = self.gs();
                gs.dash_array = array;
                gs.dash_phase = phase;
            }
            Op::Flatness => self.gs().flatness = number(ops, 0)?,
            Op::RenderingIntent => self.gs().rendering_intent = name(ops, 0)?.to_string(),
            Op::ExtGState => {
                let key = name(ops, 0)?;
                match resources.ext_gstate(key) {
                    Some(ext) => ext.apply(self.stack.current_mut()),
                    None => {
                        let description = format!("ExtGState /{key} not found");
                        self.warn(pipe, ExtractWarningCode::MissingResource, description, Some(spec.mnemonic));
                    }
                }
            }

            // --- path construction ---
            Op::MoveTo => self.path.move_to(&ctm, number(ops, 0)?, number(ops, 1)?),
            Op::LineTo => self.path.line_to(&ctm, number(ops, 0)?, number(ops, 1)?),
            Op::CurveTo => {
                let v = numbers(ops)?;
                self.path.curve_to(&ctm, v[0], v[1], v[2], v[3], v[4], v[5]);
            }
            Op::CurveToV => {
                let v = numbers(ops)?;
                self.path.curve_to_v(&ctm, v[0], v[1], v[2], v[3]);
            }
            Op::CurveToY => {
                let v = numbers(ops)?;
                self.path.curve_to_y(&ctm, v[0], v[1], v[2], v[3]);
            }
            Op::Rectangle => {
                let v = numbers(ops)?;
                self.path.rectangle(&ctm, v[0], v[1], v[2], v[3]);
            }
            Op::ClosePath => self.path.close_path(),

            // --- path painting ---
            Op::Stroke => self.stroke(pipe),
            Op::CloseStroke => {
                self.path.close_path();
                self.stroke(pipe);
            }
            Op::Fill => self.fill(false, pipe),
            Op::FillEvenOdd => self.fill(true, pipe),
            Op::FillStroke => self.fill_and_stroke(false, pipe),
            Op::FillStrokeEvenOdd => self.fill_and_stroke(true, pipe),
            Op::CloseFillStroke => {
                self.path.close_path();
                self.fill_and_stroke(false, pipe);
            }
            Op::CloseFillStrokeEvenOdd => {
                self.path.close_path();
                self.fill_and_stroke(true, pipe);
            }
            Op::EndPath => self.path.clear(),
            // clipping does not change what is reported
            Op::Clip | Op::ClipEvenOdd => {}
            Op::Shading => {
                name(ops, 0)?;
            }

            // --- color ---
            Op::StrokeGray => self.gs().set_stroke_device_color(ColorSpace::DeviceGray, &numbers(ops)?),
            Op::FillGray => self.gs().set_fill_device_color(ColorSpace::DeviceGray, &numbers(ops)?),
            Op::StrokeRgb => self.gs().set_stroke_device_color(ColorSpace::DeviceRgb, &numbers(ops)?),
            Op::FillRgb => self.gs().set_fill_device_color(ColorSpace::DeviceRgb, &numbers(ops)?),
            Op::StrokeCmyk => self.gs().set_stroke_device_color(ColorSpace::DeviceCmyk, &numbers(ops)?),
            Op::FillCmyk => self.gs().set_fill_device_color(ColorSpace::DeviceCmyk, &numbers(ops)?),
            Op::StrokeColorSpace | Op::FillColorSpace => {
                let key = name(ops, 0)?;
                match resources.color_space(key) {
                    Some(space) if spec.op == Op::StrokeColorSpace => {
                        self.gs().set_stroke_color_space(space)
                    }
                    Some(space) => self.gs().set_fill_color_space(space),
                    None => {
                        let description = format!("color space /{key} not found");
                        self.warn(pipe, ExtractWarningCode::MissingResource, description, Some(spec.mnemonic));
                    }
                }
            }
            Op::StrokeColor => self.set_color(ops, true, false)?,
            Op::FillColor => self.set_color(ops, false, false)?,
            Op::StrokeColorN => self.set_color(ops, true, true)?,
            Op::FillColorN => self.set_color(ops, false, true)?,

            // --- text objects ---
            Op::BeginText => {
                if self.in_text {
                    let description = "BT inside a text object".to_string();
                    self.warn(pipe, ExtractWarningCode::UnbalancedState, description, Some(spec.mnemonic));
                }
                self.in_text = true;
                self.gs().text.reset_matrices();
            }
            Op::EndText => {
                if !self.in_text {
                    let description = "ET without BT".to_string();
                    self.warn(pipe, ExtractWarningCode::UnbalancedState, description, Some(spec.mnemonic));
                }
                self.in_text = false;
                self.gs().text.reset_matrices();
            }

            // --- text state ---
            Op::CharSpacing => self.gs().text.char_spacing = number(ops, 0)?,
            Op::WordSpacing => self.gs().text.word_spacing = number(ops, 0)?,
            Op::HorizontalScaling => self.gs().text.horizontal_scaling = number(ops, 0)?,
            Op::Leading => self.gs().text.leading = number(ops, 0)?,
            Op::SetFont => {
                let key = name(ops, 0)?;
                let size = number(ops, 1)?;
                let font = match resources.font(key) {
                    Some(font) => font.clone(),
                    None => {
                        let description = match resources.font_error(key) {
                            Some(reason) => format!("font /{key} unusable: {reason}"),
                            None => format!("font /{key} not found"),
                        };
                        self.gs().text.font_name = Some(key.to_string());
                        self.warn(pipe, ExtractWarningCode::MissingFont, description, Some(spec.mnemonic));
                        default_font()
                    }
                };
                let ts = &mut self.gs().text;
                ts.font = Some(font);
                ts.font_name = Some(key.to_string());
                ts.font_size = size;
            }
            Op::RenderMode => {
                let value = number(ops, 0)?;
                let mode = TextRenderMode::from_i64(value as i64).ok_or_else(|| {
                    InterpretError::operand(spec.mnemonic, format!("render mode {value} out of range"))
                })?;
                self.gs().text.render_mode = mode;
            }
            Op::Rise => self.gs().text.rise = number(ops, 0)?,

            // --- text positioning ---
            Op::MoveText => {
                let (tx, ty) = (number(ops, 0)?, number(ops, 1)?);
                self.gs().text.move_text(tx, ty);
            }
            Op::MoveTextSetLeading => {
                let (tx, ty) = (number(ops, 0)?, number(ops, 1)?);
                self.gs().text.move_text_set_leading(tx, ty);
            }
            Op::SetTextMatrix => {
                let m = matrix(ops)?;
                self.gs().text.set_matrix(m);
            }
            Op::NextLine => self.gs().text.next_line(),

            // --- text showing ---
            Op::ShowText => {
                let bytes = operand(ops, 0)?.string_bytes()?;
                self.show(&bytes, pipe);
            }
            Op::ShowTextArray => {
                let items = operand(ops, 0)?.as_array()?;
                let mc = self.marked_content.last();
                let events = text::show_array(self.stack.current_mut(), items, mc);
                for event in events {
                    pipe.text(event);
                }
            }
            Op::NextLineShowText => {
                let bytes = operand(ops, 0)?.string_bytes()?;
                self.gs().text.next_line();
                self.show(&bytes, pipe);
            }
            Op::SpacingNextLineShowText => {
                let aw = number(ops, 0)?;
                let ac = number(ops, 1)?;
                let bytes = operand(ops, 2)?.string_bytes()?;
                let ts = &mut self.gs().text;
                ts.word_spacing = aw;
                ts.char_spacing = ac;
                ts.next_line();
                self.show(&bytes, pipe);
            }

            // Type3 glyph metrics carry nothing to report
            Op::GlyphWidth | Op::GlyphWidthBBox => {
                numbers(ops)?;
            }

            // --- XObjects ---
            Op::PaintXObject => {
                let key = name(ops, 0)?;
                match resources.xobject(key) {
                    Some(XObject::Image(image)) => {
                        let event = self.image_event(image.data.clone(), Some(key.to_string()), &image.info);
                        pipe.image(event);
                    }
                    Some(XObject::Form(form)) => self.paint_form(key, form, resources, pipe)?,
                    Some(XObject::PostScript) => {}
                    None => {
                        let description = format!("XObject /{key} not found");
                        self.warn(pipe, ExtractWarningCode::MissingResource, description, Some(spec.mnemonic));
                    }
                }
            }
            // the lexer folds BI … ID … EI into one token; stray keywords are ignored
            Op::BeginInlineImage | Op::InlineImageData | Op::EndInlineImage => {}

            // --- marked content ---
            Op::MarkPoint | Op::MarkPointProperties => {
                name(ops, 0)?;
            }
            Op::BeginMarkedContent => {
                let tag = name(ops, 0)?.to_string();
                self.marked_content.push(MarkedContent { tag, mcid: None });
            }
            Op::BeginMarkedContentProperties => {
                let tag = name(ops, 0)?.to_string();
                let props = match operand(ops, 1)? {
                    Object::Name(key) => resources.properties(key),
                    other => other.as_dict().ok(),
                };
                let mcid = props
                    .and_then(|p| p.get("MCID"))
                    .and_then(|v| v.as_i64().ok())
                    .and_then(|v| u32::try_from(v).ok());
                self.marked_content.push(MarkedContent { tag, mcid });
            }
            Op::EndMarkedContent => {
                if self.marked_content.pop().is_none() {
                    let description = "EMC without BMC or BDC".to_string();
                    self.warn(pipe, ExtractWarningCode::UnbalancedState, description, Some(spec.mnemonic));
                }
            }

            // --- compatibility ---
            Op::BeginCompatibility => self.compatibility += 1,
            Op::EndCompatibility => self.compatibility = self.compatibility.saturating_sub(1),
        }
        Ok(())
    }

    fn gs(&mut self) -> &mut GraphicsState {
        self.stack.current_mut()
    }

    fn show(&mut self, bytes: &[u8], pipe: &mut EventPipe<'_>) {
        let mc = self.marked_content.last();
        let event = text::show_string(self.stack.current_mut(), bytes, mc);
        pipe.text(event);
    }

    /// `SC`/`sc` take as many numbers as the current space has components;
    /// `SCN`/`scn` also accept a trailing pattern name.
    fn set_color(&mut self, ops: &[Object], stroke: bool, allow_pattern: bool) -> Result<(), InterpretError> {
        let gs = self.stack.current_mut();
        let space = if stroke {
            gs.stroke_color_space
        } else {
            gs.fill_color_space
        };
        let color = if allow_pattern && matches!(ops.last(), Some(Object::Name(_))) {
            space.initial_color()
        } else {
            let n = space.components();
            if ops.len() < n {
                let mnemonic = match (stroke, allow_pattern) {
                    (true, false) => "SC",
                    (false, false) => "sc",
                    (true, true) => "SCN",
                    (false, true) => "scn",
                };
                return Err(InterpretError::operand(
                    mnemonic,
                    format!("{} needs {n} components, found {}", space.name(), ops.len()),
                ));
            }
            let components = ops[ops.len() - n..]
                .iter()
                .map(Object::as_f64)
                .collect::<Result<Vec<_>, _>>()?;
            space.color_from_components(&components)
        };
        if stroke {
            gs.stroke_color = color;
        } else {
            gs.fill_color = color;
        }
        Ok(())
    }

    fn stroke(&mut self, pipe: &mut EventPipe<'_>) {
        let path = self.path.take();
        self.emit_stroke(path, pipe);
    }

    fn fill(&mut self, even_odd: bool, pipe: &mut EventPipe<'_>) {
        let path = self.path.take_closed();
        self.emit_fill(path, even_odd, pipe);
    }

    /// `B`, `B*`: the fill closes its copy of the path, the stroke gets the
    /// path as constructed.
    fn fill_and_stroke(&mut self, even_odd: bool, pipe: &mut EventPipe<'_>) {
        let fill_path = self.path.clone().take_closed();
        let stroke_path = self.path.take();
        self.emit_fill(fill_path, even_odd, pipe);
        self.emit_stroke(stroke_path, pipe);
    }

    fn emit_stroke(&self, path: Path, pipe: &mut EventPipe<'_>) {
        if path.is_empty() {
            return;
        }
        let gs = self.stack.current();
        pipe.stroke(StrokeEvent {
            path,
            line_width: gs.line_width,
            stroke_color: gs.stroke_color,
            dash_array: gs.dash_array.clone(),
            dash_phase: gs.dash_phase,
        });
    }

    fn emit_fill(&self, path: Path, even_odd: bool, pipe: &mut EventPipe<'_>) {
        if path.is_empty() {
            return;
        }
        pipe.fill(FillEvent {
            path,
            fill_color: self.stack.current().fill_color,
            use_even_odd_rule: even_odd,
        });
    }

    /// Place the unit square through the CTM.
    fn image_event(&self, data: Arc<[u8]>, name: Option<String>, info: &ImageInfo) -> ImageEvent {
        let ctm = self.stack.current().ctm;
        let position = ctm.transform_point(Point::new(0.0, 0.0));
        let ux = ctm.transform_vector(1.0, 0.0);
        let uy = ctm.transform_vector(0.0, 1.0);
        ImageEvent {
            position,
            width: ux.x.hypot(ux.y).max(1.0),
            height: uy.x.hypot(uy.y).max(1.0),
            data,
            name,
            pixel_width: info.pixel_width,
            pixel_height: info.pixel_height,
            bits_per_component: info.bits_per_component,
            color_space: info.color_space.clone(),
            filters: info.filters.clone(),
            ctm,
        }
    }

    fn paint_inline_image(&mut self, image: InlineImage, pipe: &mut EventPipe<'_>) {
        let info = ImageInfo::from_dict(&image.dict);
        let event = self.image_event(image.data.into(), None, &info);
        pipe.image(event);
    }

    /// Interpret a Form XObject inside a saved graphics state.
    fn paint_form(
        &mut self,
        name: &str,
        form: &FormXObject,
        resources: &Resources,
        pipe: &mut EventPipe<'_>,
    ) -> Result<(), InterpretError> {
        if !self.options.expand_form_xobjects {
            return Ok(());
        }
        if self.form_depth >= self.options.max_recursion_depth {
            let description = format!(
                "Form XObject /{name} skipped: nesting exceeds {}",
                self.options.max_recursion_depth
            );
            self.warn(pipe, ExtractWarningCode::ResourceLimitReached, description, Some("Do"));
            return Ok(());
        }
        if form.content.len() > self.options.max_stream_bytes {
            let description = format!("Form XObject /{name} of {} bytes exceeds stream limit", form.content.len());
            self.warn(pipe, ExtractWarningCode::ResourceLimitReached, description, Some("Do"));
            return Ok(());
        }
        debug!(page = self.page_index, form = name, depth = self.form_depth + 1, "enter form xobject");

        let base = self.stack.depth();
        self.stack.save();
        self.gs().concat(&form.matrix);
        let outer_path = mem::take(&mut self.path);
        let outer_operands = mem::take(&mut self.operands);
        let outer_compatibility = mem::replace(&mut self.compatibility, 0);
        let outer_floor = mem::replace(&mut self.floor, base + 1);
        let outer_in_text = mem::replace(&mut self.in_text, false);
        let outer_marked_content = self.marked_content.clone();
        self.form_depth += 1;

        let form_resources = form.resources.as_deref().unwrap_or(resources);
        let result = self.execute(&form.content, form_resources, pipe);

        self.form_depth -= 1;
        self.marked_content = outer_marked_content;
        self.in_text = outer_in_text;
        self.floor = outer_floor;
        self.compatibility = outer_compatibility;
        self.operands = outer_operands;
        self.path = outer_path;
        self.stack.unwind_to(base);
        debug!(page = self.page_index, form = name, "leave form xobject");
        result
    }
}

/// Warnings that name the current font.
fn code_has_font(code: &ExtractWarningCode) -> bool {
    matches!(code, ExtractWarningCode::MissingFont)
}

fn operand(ops: &[Object], index: usize) -> Result<&Object, ObjectError> {
    ops.get(index).ok_or(ObjectError::IndexOutOfRange {
        index,
        len: ops.len(),
    })
}

fn number(ops: &[Object], index: usize) -> Result<f64, ObjectError> {
    operand(ops, index)?.as_f64()
}

fn name(ops: &[Object], index: usize) -> Result<&str, ObjectError> {
    operand(ops, index)?.as_name()
}

fn numbers(ops: &[Object]) -> Result<Vec<f64>, ObjectError> {
    ops.iter().map(Object::as_f64).collect()
}

fn matrix(ops: &[Object]) -> Result<Matrix, ObjectError> {
    match numbers(ops)?.as_slice() {
        [a, b, c, d, e, f] => Ok(Matrix::new(*a, *b, *c, *d, *e, *f)),
        other => Err(ObjectError::IndexOutOfRange {
            index: 5,
            len: other.len(),
        }),
    }
}
