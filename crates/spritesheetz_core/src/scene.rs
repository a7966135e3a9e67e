//! Rendering collaborator interface
//!
//! The grids never draw anything themselves. They ask a [`Scene`] to add or
//! remove visuals and keep the returned handles next to the cell they belong
//! to, so that clearing a cell always removes what was drawn for it.

use image::RgbaImage;
use std::collections::BTreeMap;

/// Opaque reference to something drawn on a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualHandle(pub u64);

/// Axis-aligned rectangle in scene coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Fill style for rectangles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Brush {
    /// Placeholder fill for a map cell painted without a sheet tile
    TileFill,
    /// Highlight of a single selected cell (translucent blue)
    CellHighlight,
    /// Highlight spanning a whole sprite object (translucent yellow)
    ObjectHighlight,
    /// Pointer cursor of an editing surface, always on top
    Turtle,
    /// Pointer cursor of a palette view
    PaletteTurtle,
}

/// Rendering surface the editing grids draw onto
pub trait Scene {
    fn add_rect(&mut self, rect: Rect, brush: Brush) -> VisualHandle;

    /// Add a dashed grid line
    fn add_line(&mut self, from: (f32, f32), to: (f32, f32)) -> VisualHandle;

    fn add_image(&mut self, image: &RgbaImage, offset: (f32, f32)) -> VisualHandle;

    /// Move a visual so its top-left corner sits at `(x, y)`
    fn move_visual(&mut self, handle: VisualHandle, x: f32, y: f32);

    fn remove_visual(&mut self, handle: VisualHandle);
}

/// A visual kept by [`RecordedScene`]
#[derive(Debug, Clone, PartialEq)]
pub enum Visual {
    Rect { rect: Rect, brush: Brush },
    Line { from: (f32, f32), to: (f32, f32) },
    Image { offset: (f32, f32), width: u32, height: u32 },
}

/// In-memory scene that records live visuals.
///
/// Used headless and in tests to check that grids and scene stay in sync.
#[derive(Debug, Default)]
pub struct RecordedScene {
    next_handle: u64,
    visuals: BTreeMap<VisualHandle, Visual>,
}

impl RecordedScene {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, visual: Visual) -> VisualHandle {
        let handle = VisualHandle(self.next_handle);
        self.next_handle += 1;
        self.visuals.insert(handle, visual);
        handle
    }

    pub fn get(&self, handle: VisualHandle) -> Option<&Visual> {
        self.visuals.get(&handle)
    }

    pub fn contains(&self, handle: VisualHandle) -> bool {
        self.visuals.contains_key(&handle)
    }

    /// Number of live visuals
    pub fn len(&self) -> usize {
        self.visuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visuals.is_empty()
    }

    /// Live rectangles drawn with the given brush
    pub fn rects(&self, brush: Brush) -> Vec<Rect> {
        self.visuals
            .values()
            .filter_map(|visual| match visual {
                Visual::Rect { rect, brush: b } if *b == brush => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub fn line_count(&self) -> usize {
        self.visuals
            .values()
            .filter(|visual| matches!(visual, Visual::Line { .. }))
            .count()
    }

    pub fn image_count(&self) -> usize {
        self.visuals
            .values()
            .filter(|visual| matches!(visual, Visual::Image { .. }))
            .count()
    }
}

impl Scene for RecordedScene {
    fn add_rect(&mut self, rect: Rect, brush: Brush) -> VisualHandle {
        self.insert(Visual::Rect { rect, brush })
    }

    fn add_line(&mut self, from: (f32, f32), to: (f32, f32)) -> VisualHandle {
        self.insert(Visual::Line { from, to })
    }

    fn add_image(&mut self, image: &RgbaImage, offset: (f32, f32)) -> VisualHandle {
        self.insert(Visual::Image {
            offset,
            width: image.width(),
            height: image.height(),
        })
    }

    fn move_visual(&mut self, handle: VisualHandle, x: f32, y: f32) {
        match self.visuals.get_mut(&handle) {
            Some(Visual::Rect { rect, .. }) => {
                rect.x = x;
                rect.y = y;
            }
            Some(Visual::Image { offset, .. }) => *offset = (x, y),
            Some(Visual::Line { from, to }) => {
                let (dx, dy) = (x - from.0, y - from.1);
                *from = (x, y);
                *to = (to.0 + dx, to.1 + dy);
            }
            None => {}
        }
    }

    fn remove_visual(&mut self, handle: VisualHandle) {
        self.visuals.remove(&handle);
    }
}
