//! Drawing surfaces.
//!
//! This module provides:
//!
//! - The [`Surface`] trait, the only thing the overlay renderer draws to.
//! - [`Canvas`], an RGBA pixel surface, optionally showing a background frame.
//! - [`Recording`], a surface that only remembers what was drawn on it, for inspecting render
//!   output without looking at pixels.

mod color;

use std::{convert::Infallible, path::Path};

use embedded_graphics::{
    draw_target::DrawTarget,
    mono_font::{ascii, MonoFont, MonoTextStyle},
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};
use image::{DynamicImage, Rgba, RgbaImage};

pub use color::Color;

/// A point in surface pixel coordinates.
pub type Pos = [f32; 2];

/// Outline color and width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stroke {
    pub color: Color,
    pub width: u32,
}

impl Stroke {
    pub const fn new(color: Color, width: u32) -> Self {
        Self { color, width }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    /// 6x10 pixel glyphs, for labels.
    Small,
    /// 10x20 pixel glyphs.
    Large,
}

impl Font {
    fn mono(self) -> &'static MonoFont<'static> {
        match self {
            Font::Small => &ascii::FONT_6X10,
            Font::Large => &ascii::FONT_10X20,
        }
    }
}

/// Horizontal text alignment relative to the text position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// A 2D drawing surface with a pixel size.
///
/// Positions are given in pixels, with the origin in the top left corner. Anything outside of the
/// surface is clipped without error.
pub trait Surface {
    /// Returns the `(width, height)` of the surface, in pixels.
    fn size(&self) -> (u32, u32);

    /// Changes the pixel size of the surface. The contents are unspecified afterwards.
    fn resize(&mut self, width: u32, height: u32);

    /// Resets the surface to its blank state.
    fn clear(&mut self);

    fn line(&mut self, start: Pos, end: Pos, stroke: Stroke);

    /// Draws a filled circle with an outline.
    fn circle(&mut self, center: Pos, radius: f32, fill: Color, outline: Stroke);

    /// Fills an axis-aligned rectangle.
    fn rect(&mut self, top_left: Pos, size: Pos, fill: Color);

    /// Draws a line of text, vertically centered on `pos`.
    fn text(&mut self, pos: Pos, text: &str, color: Color, font: Font, align: Align);
}

fn point(pos: Pos) -> Point {
    Point::new(pos[0].round() as i32, pos[1].round() as i32)
}

/// An RGBA pixel surface.
///
/// A canvas can carry a background image (the image or video frame an overlay is drawn on). When
/// the canvas is cleared and its size matches the background, the background is restored;
/// otherwise it is cleared to transparent.
#[derive(Clone)]
pub struct Canvas {
    buf: RgbaImage,
    background: Option<RgbaImage>,
}

impl Canvas {
    /// Creates a transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buf: RgbaImage::new(width, height),
            background: None,
        }
    }

    /// Creates a canvas that shows `background` whenever it is cleared.
    pub fn with_background(background: RgbaImage) -> Self {
        Self {
            buf: background.clone(),
            background: Some(background),
        }
    }

    /// Replaces the background (eg. with the next camera frame).
    pub fn set_background(&mut self, background: Option<RgbaImage>) {
        self.background = background;
    }

    pub fn width(&self) -> u32 {
        self.buf.width()
    }

    pub fn height(&self) -> u32 {
        self.buf.height()
    }

    /// Returns the color of the pixel at `(x, y)`, or [`None`] if it is out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x < self.buf.width() && y < self.buf.height() {
            Some(Color(self.buf.get_pixel(x, y).0))
        } else {
            None
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.buf
    }

    pub fn into_image(self) -> RgbaImage {
        self.buf
    }

    /// Saves the canvas contents.
    ///
    /// The format is derived from the file extension. JPEG has no alpha channel, so alpha is
    /// dropped when saving as `jpg`/`jpeg`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        self.save_impl(path.as_ref())
    }

    fn save_impl(&self, path: &Path) -> anyhow::Result<()> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("jpg" | "jpeg") => {
                DynamicImage::ImageRgba8(self.buf.clone()).to_rgb8().save(path)?
            }
            Some(_) => self.buf.save(path)?,
            None => anyhow::bail!(
                "cannot save canvas to '{}' (missing file extension)",
                path.display()
            ),
        }
        Ok(())
    }

    fn draw<D>(&mut self, drawable: &D)
    where
        D: Drawable<Color = Color>,
    {
        match drawable.draw(&mut Target(&mut self.buf)) {
            Ok(_) => {}
            Err(infallible) => match infallible {},
        }
    }
}

impl Surface for Canvas {
    fn size(&self) -> (u32, u32) {
        self.buf.dimensions()
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.buf.dimensions() != (width, height) {
            log::trace!(
                "resizing canvas from {:?} to {}x{}",
                self.buf.dimensions(),
                width,
                height
            );
            self.buf = RgbaImage::new(width, height);
        }
    }

    fn clear(&mut self) {
        match &self.background {
            Some(bg) if bg.dimensions() == self.buf.dimensions() => {
                self.buf.copy_from_slice(bg.as_raw());
            }
            _ => self.buf.pixels_mut().for_each(|px| *px = Rgba([0; 4])),
        }
    }

    fn line(&mut self, start: Pos, end: Pos, stroke: Stroke) {
        self.draw(
            &Line::new(point(start), point(end))
                .into_styled(PrimitiveStyle::with_stroke(stroke.color, stroke.width)),
        );
    }

    fn circle(&mut self, center: Pos, radius: f32, fill: Color, outline: Stroke) {
        let diameter = (radius * 2.0).round().max(1.0) as u32;
        let style = PrimitiveStyleBuilder::new()
            .fill_color(fill)
            .stroke_color(outline.color)
            .stroke_width(outline.width)
            .build();
        self.draw(&Circle::with_center(point(center), diameter).into_styled(style));
    }

    fn rect(&mut self, top_left: Pos, size: Pos, fill: Color) {
        let size = Size::new(size[0].round().max(0.0) as u32, size[1].round().max(0.0) as u32);
        self.draw(&Rectangle::new(point(top_left), size).into_styled(PrimitiveStyle::with_fill(fill)));
    }

    fn text(&mut self, pos: Pos, text: &str, color: Color, font: Font, align: Align) {
        let character_style = MonoTextStyle::new(font.mono(), color);
        let alignment = match align {
            Align::Left => Alignment::Left,
            Align::Center => Alignment::Center,
            Align::Right => Alignment::Right,
        };
        let text_style = TextStyleBuilder::new()
            .alignment(alignment)
            .baseline(Baseline::Middle)
            .build();
        self.draw(&Text::with_text_style(
            text,
            point(pos),
            character_style,
            text_style,
        ));
    }
}

struct Target<'a>(&'a mut RgbaImage);

impl Dimensions for Target<'_> {
    fn bounding_box(&self) -> Rectangle {
        let (width, height) = self.0.dimensions();

        Rectangle {
            top_left: Point { x: 0, y: 0 },
            size: Size { width, height },
        }
    }
}

impl DrawTarget for Target<'_> {
    type Color = Color;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(pos, color) in pixels {
            if pos.x >= 0
                && (pos.x as u32) < self.0.width()
                && pos.y >= 0
                && (pos.y as u32) < self.0.height()
            {
                let px = self.0.get_pixel_mut(pos.x as u32, pos.y as u32);
                *px = Rgba(color.over(Color(px.0)).0);
            }
        }

        Ok(())
    }
}

/// A single operation recorded by a [`Recording`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Line {
        start: Pos,
        end: Pos,
        stroke: Stroke,
    },
    Circle {
        center: Pos,
        radius: f32,
        fill: Color,
        outline: Stroke,
    },
    Rect {
        top_left: Pos,
        size: Pos,
        fill: Color,
    },
    Text {
        pos: Pos,
        text: String,
        color: Color,
        font: Font,
        align: Align,
    },
}

/// A surface that records draw operations instead of rasterizing them.
///
/// Clearing the surface forgets everything drawn so far, so [`Recording::ops`] always describes
/// what is currently "on" the surface.
#[derive(Debug, Clone, Default)]
pub struct Recording {
    width: u32,
    height: u32,
    ops: Vec<DrawOp>,
    clears: usize,
}

impl Recording {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Number of times the surface was cleared, which is once per render.
    pub fn clears(&self) -> usize {
        self.clears
    }

    /// Start and end points of all recorded lines.
    pub fn lines(&self) -> impl Iterator<Item = (Pos, Pos, Stroke)> + '_ {
        self.ops.iter().filter_map(|op| match *op {
            DrawOp::Line { start, end, stroke } => Some((start, end, stroke)),
            _ => None,
        })
    }

    /// Centers and fill colors of all recorded circles.
    pub fn circles(&self) -> impl Iterator<Item = (Pos, Color)> + '_ {
        self.ops.iter().filter_map(|op| match *op {
            DrawOp::Circle { center, fill, .. } => Some((center, fill)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Surface for Recording {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn clear(&mut self) {
        self.ops.clear();
        self.clears += 1;
    }

    fn line(&mut self, start: Pos, end: Pos, stroke: Stroke) {
        self.ops.push(DrawOp::Line { start, end, stroke });
    }

    fn circle(&mut self, center: Pos, radius: f32, fill: Color, outline: Stroke) {
        self.ops.push(DrawOp::Circle {
            center,
            radius,
            fill,
            outline,
        });
    }

    fn rect(&mut self, top_left: Pos, size: Pos, fill: Color) {
        self.ops.push(DrawOp::Rect {
            top_left,
            size,
            fill,
        });
    }

    fn text(&mut self, pos: Pos, text: &str, color: Color, font: Font, align: Align) {
        self.ops.push(DrawOp::Text {
            pos,
            text: text.to_string(),
            color,
            font,
            align,
        });
    }
}
