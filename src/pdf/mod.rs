//! Paginated PDF document builder
//!
//! A thin state machine over lopdf: the only layout state is the vertical
//! cursor on the current page, in millimeters from the page top. Every
//! append checks the space it needs against what remains and starts a fresh
//! page first when it would not fit; sections can also force page breaks
//! explicitly. `finish` serializes the accumulated pages into one PDF byte
//! vector.
//!
//! Coordinates are A4 millimeters (210 x 297) converted to PDF points only
//! at the operator level, so all layout constants read in mm. Text uses the
//! base-14 Helvetica fonts with WinAnsi encoding (Spanish accents included);
//! chart bitmaps embed as flate-compressed RGB image XObjects.

pub mod font;
pub mod table;

use crate::chart::ChartImage;
use crate::error::Result;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

pub const PAGE_WIDTH: f64 = 210.0;
pub const PAGE_HEIGHT: f64 = 297.0;
pub const TOP_MARGIN: f64 = 20.0;
pub const BOTTOM_MARGIN: f64 = 20.0;

const PT_PER_MM: f64 = 72.0 / 25.4;

pub type Color = (u8, u8, u8);
pub const BLACK: Color = (0, 0, 0);
/// Grey used for report titles.
pub const TITLE_GREY: Color = (100, 100, 100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

pub struct DocumentBuilder {
    doc: Document,
    pages_id: ObjectId,
    font_regular: ObjectId,
    font_bold: ObjectId,
    page_ids: Vec<ObjectId>,
    ops: Vec<Operation>,
    page_images: Vec<(String, ObjectId)>,
    image_counter: usize,
    cursor: f64,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let font_bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        Self {
            doc,
            pages_id,
            font_regular,
            font_bold,
            page_ids: Vec::new(),
            ops: Vec::new(),
            page_images: Vec::new(),
            image_counter: 0,
            cursor: TOP_MARGIN,
        }
    }

    /// Current baseline position, mm from the page top.
    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    pub fn set_cursor(&mut self, y: f64) {
        self.cursor = y;
    }

    pub fn advance(&mut self, delta: f64) {
        self.cursor += delta;
    }

    /// Vertical space left on the current page above the bottom margin.
    pub fn remaining(&self) -> f64 {
        PAGE_HEIGHT - BOTTOM_MARGIN - self.cursor
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len() + 1
    }

    /// Break to a fresh page unless `needed` millimeters still fit. Returns
    /// true when a break happened.
    pub fn ensure_space(&mut self, needed: f64) -> Result<bool> {
        if needed > self.remaining() {
            self.new_page(TOP_MARGIN)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Force a page break, placing the cursor at `reset_to`.
    pub fn new_page(&mut self, reset_to: f64) -> Result<()> {
        self.flush_page()?;
        self.cursor = reset_to;
        Ok(())
    }

    /// Write `text` at an explicit position without touching the cursor.
    /// `y` is the text baseline, mm from the page top.
    pub fn text_at(
        &mut self,
        x: f64,
        y: f64,
        size: f64,
        style: FontStyle,
        color: Color,
        align: Align,
        text: &str,
    ) {
        let width = font::text_width_mm(text, size);
        let x = match align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
            Align::Right => x - width,
        };
        let font_name = match style {
            FontStyle::Regular => "F1",
            FontStyle::Bold => "F2",
        };
        let (r, g, b) = color;
        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new(
            "Tf",
            vec![Object::Name(font_name.into()), real(size)],
        ));
        self.ops.push(Operation::new(
            "rg",
            vec![
                real(r as f64 / 255.0),
                real(g as f64 / 255.0),
                real(b as f64 / 255.0),
            ],
        ));
        self.ops.push(Operation::new(
            "Td",
            vec![real(x * PT_PER_MM), real((PAGE_HEIGHT - y) * PT_PER_MM)],
        ));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::String(
                font::encode_win_ansi(text),
                StringFormat::Literal,
            )],
        ));
        self.ops.push(Operation::new("ET", vec![]));
    }

    /// Horizontally centered text at an explicit baseline.
    pub fn centered(&mut self, y: f64, size: f64, style: FontStyle, color: Color, text: &str) {
        self.text_at(PAGE_WIDTH / 2.0, y, size, style, color, Align::Center, text);
    }

    /// Height a wrapped paragraph will occupy.
    pub fn paragraph_height(&self, text: &str, size: f64, width: f64, line_height: f64) -> f64 {
        font::wrap(text, size, width).len() as f64 * line_height
    }

    /// Wrapped paragraph written line by line from the cursor, breaking the
    /// page mid-paragraph when a line would cross the bottom margin.
    pub fn paragraph(
        &mut self,
        text: &str,
        x: f64,
        width: f64,
        size: f64,
        line_height: f64,
    ) -> Result<()> {
        for line in font::wrap(text, size, width) {
            if self.cursor + line_height > PAGE_HEIGHT - BOTTOM_MARGIN {
                self.new_page(TOP_MARGIN)?;
            }
            self.text_at(
                x,
                self.cursor,
                size,
                FontStyle::Regular,
                BLACK,
                Align::Left,
                &line,
            );
            self.cursor += line_height;
        }
        Ok(())
    }

    /// Straight line in page coordinates (mm from top-left).
    pub fn line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: Color) {
        let (r, g, b) = color;
        self.ops.push(Operation::new(
            "RG",
            vec![
                real(r as f64 / 255.0),
                real(g as f64 / 255.0),
                real(b as f64 / 255.0),
            ],
        ));
        self.ops
            .push(Operation::new("w", vec![real(width * PT_PER_MM)]));
        self.ops.push(Operation::new(
            "m",
            vec![
                real(from.0 * PT_PER_MM),
                real((PAGE_HEIGHT - from.1) * PT_PER_MM),
            ],
        ));
        self.ops.push(Operation::new(
            "l",
            vec![
                real(to.0 * PT_PER_MM),
                real((PAGE_HEIGHT - to.1) * PT_PER_MM),
            ],
        ));
        self.ops.push(Operation::new("S", vec![]));
    }

    /// Filled rectangle; `(x, y)` is the top-left corner in mm.
    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) {
        let (r, g, b) = color;
        self.ops.push(Operation::new(
            "rg",
            vec![
                real(r as f64 / 255.0),
                real(g as f64 / 255.0),
                real(b as f64 / 255.0),
            ],
        ));
        self.ops.push(Operation::new(
            "re",
            vec![
                real(x * PT_PER_MM),
                real((PAGE_HEIGHT - y - h) * PT_PER_MM),
                real(w * PT_PER_MM),
                real(h * PT_PER_MM),
            ],
        ));
        self.ops.push(Operation::new("f", vec![]));
    }

    /// Embed a chart at an explicit position, `w`/`h` in mm.
    pub fn image_at(&mut self, image: &ChartImage, x: f64, y: f64, w: f64, h: f64) {
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            image.rgb.clone(),
        );
        let id = self.doc.add_object(stream);
        let name = format!("Im{}", self.image_counter);
        self.image_counter += 1;
        self.page_images.push((name.clone(), id));

        self.ops.push(Operation::new("q", vec![]));
        self.ops.push(Operation::new(
            "cm",
            vec![
                real(w * PT_PER_MM),
                real(0.0),
                real(0.0),
                real(h * PT_PER_MM),
                real(x * PT_PER_MM),
                real((PAGE_HEIGHT - y - h) * PT_PER_MM),
            ],
        ));
        self.ops
            .push(Operation::new("Do", vec![Object::Name(name.into())]));
        self.ops.push(Operation::new("Q", vec![]));
    }

    /// Center an image horizontally at the cursor, scaled to fit `max_width`
    /// wide and `max_height` tall while keeping its aspect ratio. Advances
    /// the cursor past the image.
    pub fn image_centered(&mut self, image: &ChartImage, max_width: f64, max_height: f64) {
        let mut w = max_width;
        let mut h = w / image.aspect();
        if h > max_height {
            h = max_height;
            w = h * image.aspect();
        }
        let x = (PAGE_WIDTH - w) / 2.0;
        let y = self.cursor;
        self.image_at(image, x, y, w, h);
        self.cursor += h;
    }

    fn flush_page(&mut self) -> Result<()> {
        let ops = std::mem::take(&mut self.ops);
        let images = std::mem::take(&mut self.page_images);

        let content = Content { operations: ops };
        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, content.encode()?));

        let mut xobjects = lopdf::Dictionary::new();
        for (name, id) in images {
            xobjects.set(name, Object::Reference(id));
        }
        let resources = dictionary! {
            "Font" => dictionary! {
                "F1" => Object::Reference(self.font_regular),
                "F2" => Object::Reference(self.font_bold),
            },
            "XObject" => xobjects,
        };
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(self.pages_id),
            "Contents" => Object::Reference(content_id),
            "Resources" => resources,
        });
        self.page_ids.push(page_id);
        Ok(())
    }

    /// Serialize the accumulated pages into one PDF byte vector.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        self.flush_page()?;

        let kids: Vec<Object> = self
            .page_ids
            .iter()
            .map(|id| Object::Reference(*id))
            .collect();
        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![
                real(0.0),
                real(0.0),
                real(PAGE_WIDTH * PT_PER_MM),
                real(PAGE_HEIGHT * PT_PER_MM),
            ],
        };
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(self.pages_id),
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();

        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
