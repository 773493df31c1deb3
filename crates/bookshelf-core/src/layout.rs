//! Shelf layout: categories and tasks to a 3D object graph
//!
//! Shelves are arranged in a grid of at most two columns, row 0 on top. Each
//! shelf gets a wooden frame, a name label, one book per task placed left to
//! right in task order, and decorative fillers in the space that remains.
//! Books that would cross the shelf's right interior edge are not placed; the
//! tasks they represent are reported in [`SceneGraph::omitted`].
//!
//! The builder is pure. The same inputs always produce the same graph.

use std::collections::{HashMap, HashSet};

use glam::{Vec2, Vec3};
use tracing::debug;

use crate::color::Rgb;
use crate::config::LayoutConfig;
use crate::model::{Category, ShelfSnapshot, Task, TaskId, Timeframe};
use crate::seed::{ShelfSeed, DEPTH_STREAM, FILLER_TILT_STREAM, HEIGHT_STREAM, TILT_STREAM};
use crate::texture::MaterialRequest;

/// Tolerance for the fit test so exact fits survive float accumulation
const FIT_EPSILON: f32 = 1e-4;

/// Page-edge color on top of every book
pub const PAGE_EDGE: Rgb = Rgb::new(0xFF, 0xFF, 0xF0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WoodTone {
    /// Planks and sides
    Light,
    /// Back panel
    Dark,
}

impl WoodTone {
    /// Color the grain texture is painted on
    pub fn base(&self) -> Rgb {
        match self {
            WoodTone::Light => Rgb::new(0x6B, 0x44, 0x23),
            WoodTone::Dark => Rgb::new(0x4A, 0x2C, 0x2A),
        }
    }

    /// Material tint multiplied over the texture
    pub fn tint(&self) -> Rgb {
        match self {
            WoodTone::Light => Rgb::new(0x8B, 0x65, 0x44),
            WoodTone::Dark => Rgb::new(0x6B, 0x44, 0x23),
        }
    }

    pub fn material(&self) -> MaterialRequest {
        MaterialRequest::Wood { base: self.base() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Back,
    Bottom,
    Top,
    LeftSide,
    RightSide,
}

/// One box of a shelf frame
#[derive(Debug, Clone, PartialEq)]
pub struct FramePanel {
    pub kind: PanelKind,
    pub center: Vec3,
    pub size: Vec3,
    pub tone: WoodTone,
}

/// Text plane above the front of a shelf
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPlane {
    pub text: String,
    pub center: Vec3,
    pub size: Vec2,
}

impl LabelPlane {
    pub fn material(&self) -> MaterialRequest {
        MaterialRequest::Label {
            text: self.text.clone(),
        }
    }
}

/// The frame belonging to one category
#[derive(Debug, Clone, PartialEq)]
pub struct ShelfUnit {
    pub category: String,
    pub column: usize,
    pub row: usize,
    /// Center of the bottom plank
    pub origin: Vec3,
    pub panels: Vec<FramePanel>,
    pub label: LabelPlane,
    /// Left and right x of the region books may occupy
    pub interior: (f32, f32),
}

/// Interactive box standing for one task
#[derive(Debug, Clone, PartialEq)]
pub struct BookVolume {
    pub task_id: TaskId,
    pub category: String,
    pub title: String,
    pub timeframe: Timeframe,
    pub accent: Rgb,
    pub index_in_category: usize,
    /// Left edge of the slot on the shelf
    pub slot_left: f32,
    /// Resting center
    pub center: Vec3,
    pub size: Vec3,
    /// Lean around the depth axis, radians
    pub tilt: f32,
}

impl BookVolume {
    /// Spine texture, keyed by accent and title so equal books share it
    pub fn spine_material(&self) -> MaterialRequest {
        MaterialRequest::BookSpine {
            color: self.accent,
            title: self.title.clone(),
        }
    }
}

/// Decorative, non-interactive box
#[derive(Debug, Clone, PartialEq)]
pub struct FillerVolume {
    pub category: String,
    pub center: Vec3,
    pub size: Vec3,
    pub tilt: f32,
    pub opacity: f32,
}

/// Output of a layout pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneGraph {
    pub shelves: Vec<ShelfUnit>,
    pub books: Vec<BookVolume>,
    pub fillers: Vec<FillerVolume>,
    /// `(category, task)` pairs that did not fit on their shelf
    pub omitted: Vec<(String, TaskId)>,
}

impl SceneGraph {
    pub fn book(&self, id: &TaskId) -> Option<&BookVolume> {
        self.books.iter().find(|b| &b.task_id == id)
    }

    pub fn books_in<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a BookVolume> + 'a {
        self.books.iter().filter(move |b| b.category == category)
    }

    pub fn fillers_in<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a FillerVolume> + 'a {
        self.fillers.iter().filter(move |f| f.category == category)
    }

    /// Every distinct texture the graph needs, in first-use order
    pub fn material_requests(&self) -> Vec<MaterialRequest> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut push = |req: MaterialRequest| {
            if seen.insert(req.clone()) {
                out.push(req);
            }
        };

        for shelf in &self.shelves {
            for panel in &shelf.panels {
                push(panel.tone.material());
            }
            push(shelf.label.material());
        }
        for book in &self.books {
            push(book.spine_material());
        }
        if !self.fillers.is_empty() {
            push(MaterialRequest::Placeholder);
        }
        out
    }
}

/// Grid position `(column, row)` of the shelf at `index` among `count`
pub fn grid_cell(index: usize, count: usize) -> (usize, usize) {
    let columns = count.clamp(1, 2);
    (index % columns, index / columns)
}

/// `(columns, rows)` for `count` shelves
pub fn grid_size(count: usize) -> (usize, usize) {
    if count == 0 {
        return (0, 0);
    }
    let columns = count.min(2);
    (columns, count.div_ceil(columns))
}

#[derive(Debug, Clone, Default)]
pub struct ShelfLayoutBuilder {
    config: LayoutConfig,
}

impl ShelfLayoutBuilder {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn build_snapshot(&self, snapshot: &ShelfSnapshot) -> SceneGraph {
        self.build(&snapshot.categories, &snapshot.tasks_by_category)
    }

    /// Lay out every category in order; task lists for unknown categories are ignored
    pub fn build(&self, categories: &[Category], tasks_by_category: &HashMap<String, Vec<Task>>) -> SceneGraph {
        let mut graph = SceneGraph::default();
        let (columns, rows) = grid_size(categories.len());

        let orphaned: usize = tasks_by_category
            .iter()
            .filter(|(name, _)| !categories.iter().any(|c| &c.name == *name))
            .map(|(_, tasks)| tasks.len())
            .sum();
        if orphaned > 0 {
            debug!(tasks = orphaned, "Ignoring tasks whose category is not in the snapshot");
        }

        for (index, category) in categories.iter().enumerate() {
            let (column, row) = grid_cell(index, categories.len());
            let tasks = tasks_by_category
                .get(&category.name)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            self.build_shelf(&mut graph, category, tasks, column, row, columns, rows);
        }

        debug!(
            shelves = graph.shelves.len(),
            books = graph.books.len(),
            fillers = graph.fillers.len(),
            omitted = graph.omitted.len(),
            "Built shelf layout"
        );
        graph
    }

    #[allow(clippy::too_many_arguments)]
    fn build_shelf(
        &self,
        graph: &mut SceneGraph,
        category: &Category,
        tasks: &[Task],
        column: usize,
        row: usize,
        columns: usize,
        rows: usize,
    ) {
        let c = &self.config;
        let ox = (column as f32 - (columns as f32 - 1.0) / 2.0) * (c.shelf_width + c.column_gap);
        let oy = (rows - 1 - row) as f32 * c.shelf_height + c.scene_offset_y;
        let half_w = c.shelf_width / 2.0;
        let interior = (ox - half_w + c.leading_inset, ox + half_w - c.trailing_inset);

        graph.shelves.push(ShelfUnit {
            category: category.name.clone(),
            column,
            row,
            origin: Vec3::new(ox, oy, 0.0),
            panels: self.frame_panels(ox, oy),
            label: LabelPlane {
                text: category.name.clone(),
                center: Vec3::new(
                    ox - half_w + 1.0,
                    oy + c.shelf_height - 0.04,
                    c.shelf_depth / 2.0 + 0.06,
                ),
                size: Vec2::new(c.label_width, c.label_height),
            },
            interior,
        });

        let seed = ShelfSeed::from_name(&category.name);
        let floor = oy + c.plank_thickness / 2.0;
        let mut cursor = interior.0;
        let mut placed = 0usize;

        for (i, task) in tasks.iter().enumerate() {
            let width = task.timeframe.width_units() * c.width_per_unit;
            if cursor + width > interior.1 + FIT_EPSILON {
                graph
                    .omitted
                    .extend(tasks[i..].iter().map(|t| (category.name.clone(), t.id.clone())));
                break;
            }

            let slot = i as u64;
            let height = c.book_height_base + seed.sample(HEIGHT_STREAM, slot) * c.book_height_jitter;
            let depth = c.book_depth_base + seed.sample(DEPTH_STREAM, slot) * c.book_depth_jitter;

            graph.books.push(BookVolume {
                task_id: task.id.clone(),
                category: category.name.clone(),
                title: task.name.clone(),
                timeframe: task.timeframe,
                accent: category.accent_color,
                index_in_category: i,
                slot_left: cursor,
                center: Vec3::new(cursor + width / 2.0, floor + height / 2.0, 0.0),
                size: Vec3::new(width, height, depth),
                tilt: seed.signed(TILT_STREAM, slot, c.book_tilt),
            });
            cursor += width + c.book_gap;
            placed += 1;
        }

        let overflowed = placed < tasks.len();
        if overflowed {
            debug!(
                category = %category.name,
                placed,
                omitted = tasks.len() - placed,
                "Shelf overflow, remaining tasks not shown"
            );
            return;
        }

        if c.filler_presets.is_empty() {
            return;
        }
        let wanted = c.min_fillers.max(c.filler_target.saturating_sub(placed));
        for g in 0..wanted {
            let [preset_w, preset_h] = c.filler_presets[g % c.filler_presets.len()];
            if cursor + preset_w > interior.1 {
                break;
            }
            let footprint = preset_w * c.filler_width_factor;
            graph.fillers.push(FillerVolume {
                category: category.name.clone(),
                center: Vec3::new(cursor + footprint / 2.0, floor + preset_h / 2.0, 0.0),
                size: Vec3::new(footprint, preset_h, c.filler_depth),
                tilt: seed.signed(FILLER_TILT_STREAM, g as u64, c.filler_tilt),
                opacity: c.filler_opacity,
            });
            cursor += footprint + c.book_gap;
        }
    }

    fn frame_panels(&self, ox: f32, oy: f32) -> Vec<FramePanel> {
        let c = &self.config;
        let (w, h, d) = (c.shelf_width, c.shelf_height, c.shelf_depth);
        let plank = Vec3::new(w + c.side_thickness * 2.0, c.plank_thickness, d + 0.1);
        let side = Vec3::new(c.side_thickness, h, d);
        let side_x = w / 2.0 + c.side_thickness / 2.0;

        let panel = |kind, center, size, tone| FramePanel {
            kind,
            center,
            size,
            tone,
        };
        vec![
            panel(
                PanelKind::Back,
                Vec3::new(ox, oy + h / 2.0, -d / 2.0),
                Vec3::new(w, h, c.back_thickness),
                WoodTone::Dark,
            ),
            panel(PanelKind::Bottom, Vec3::new(ox, oy, 0.0), plank, WoodTone::Light),
            panel(PanelKind::Top, Vec3::new(ox, oy + h, 0.0), plank, WoodTone::Light),
            panel(
                PanelKind::LeftSide,
                Vec3::new(ox - side_x, oy + h / 2.0, 0.0),
                side,
                WoodTone::Light,
            ),
            panel(
                PanelKind::RightSide,
                Vec3::new(ox + side_x, oy + h / 2.0, 0.0),
                side,
                WoodTone::Light,
            ),
        ]
    }
}
