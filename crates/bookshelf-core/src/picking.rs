//! Ray picking and hover state for book volumes
//!
//! Hover is recomputed from the current ray on every update. Poses are a pure
//! function of `(resting pose, hovered?)`, so repeated hover cycles cannot
//! accumulate offsets.

use glam::{Quat, Vec3};

use crate::config::HoverConfig;
use crate::layout::BookVolume;
use crate::model::TaskId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Ray from `origin` passing through `point`
    pub fn towards(origin: Vec3, point: Vec3) -> Self {
        Self::new(origin, point - origin)
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Box rotated about the z axis and uniformly scaled around its center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub tilt: f32,
    pub scale: f32,
}

impl OrientedBox {
    /// Distance along the ray to the first intersection, if any (slab test)
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        if self.scale <= 0.0 {
            return None;
        }
        let inverse = Quat::from_rotation_z(-self.tilt);
        let origin = inverse * (ray.origin - self.center) / self.scale;
        let direction = inverse * ray.direction / self.scale;

        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;
        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            let h = self.half_extents[axis];
            if d.abs() < f32::EPSILON {
                if o < -h || o > h {
                    return None;
                }
                continue;
            }
            let t1 = (-h - o) / d;
            let t2 = (h - o) / d;
            t_min = t_min.max(t1.min(t2));
            t_max = t_max.min(t1.max(t2));
            if t_min > t_max {
                return None;
            }
        }

        if t_max < 0.0 {
            return None;
        }
        Some(t_min.max(0.0))
    }
}

/// Placement of a book at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub center: Vec3,
    pub scale: f32,
}

/// Pointer styling over the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorAffordance {
    #[default]
    Default,
    Pointer,
}

/// A book as seen by the picker
#[derive(Debug, Clone, PartialEq)]
pub struct Pickable {
    pub task_id: TaskId,
    pub resting_center: Vec3,
    pub half_extents: Vec3,
    pub tilt: f32,
}

impl From<&BookVolume> for Pickable {
    fn from(book: &BookVolume) -> Self {
        Self {
            task_id: book.task_id.clone(),
            resting_center: book.center,
            half_extents: book.size / 2.0,
            tilt: book.tilt,
        }
    }
}

/// One pose assignment, in the order it must be applied
#[derive(Debug, Clone, PartialEq)]
pub struct PoseChange {
    pub index: usize,
    pub task_id: TaskId,
    pub pose: Pose,
}

/// What changed during one hover update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoverUpdate {
    pub poses: Vec<PoseChange>,
    pub cursor: Option<CursorAffordance>,
}

impl HoverUpdate {
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty() && self.cursor.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct HoverEngine {
    targets: Vec<Pickable>,
    hovered: Option<usize>,
    lift: f32,
    scale: f32,
}

impl HoverEngine {
    pub fn new(books: &[BookVolume], config: &HoverConfig) -> Self {
        Self {
            targets: books.iter().map(Pickable::from).collect(),
            hovered: None,
            lift: config.lift,
            scale: config.scale,
        }
    }

    pub fn targets(&self) -> &[Pickable] {
        &self.targets
    }

    pub fn hovered(&self) -> Option<&TaskId> {
        self.hovered.map(|i| &self.targets[i].task_id)
    }

    pub fn hovered_index(&self) -> Option<usize> {
        self.hovered
    }

    fn pose_of(&self, target: &Pickable, hovered: bool) -> Pose {
        let resting = target.resting_center;
        if hovered {
            Pose {
                center: resting + Vec3::Y * self.lift,
                scale: self.scale,
            }
        } else {
            Pose {
                center: resting,
                scale: 1.0,
            }
        }
    }

    /// Pose of a target given whether it is hovered; `None` for an unknown index
    pub fn pose_for(&self, index: usize, hovered: bool) -> Option<Pose> {
        self.targets.get(index).map(|t| self.pose_of(t, hovered))
    }

    /// Current pose of a target
    pub fn pose(&self, index: usize) -> Option<Pose> {
        self.pose_for(index, self.hovered == Some(index))
    }

    fn bounds(&self, index: usize, target: &Pickable) -> OrientedBox {
        let pose = self.pose_of(target, self.hovered == Some(index));
        OrientedBox {
            center: pose.center,
            half_extents: target.half_extents,
            tilt: target.tilt,
            scale: pose.scale,
        }
    }

    /// Nearest target hit by the ray, tested against current poses
    pub fn nearest_hit(&self, ray: &Ray) -> Option<(usize, f32)> {
        self.targets
            .iter()
            .enumerate()
            .filter_map(|(i, target)| self.bounds(i, target).intersect(ray).map(|t| (i, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Recompute hover from the pointer ray; `None` means no pointer over the viewport
    pub fn update(&mut self, ray: Option<&Ray>) -> HoverUpdate {
        let hit = ray.and_then(|r| self.nearest_hit(r)).map(|(i, _)| i);
        self.transition(hit)
    }

    /// Drop any hover, e.g. when the pointer leaves the viewport
    pub fn clear(&mut self) -> HoverUpdate {
        self.transition(None)
    }

    fn transition(&mut self, hit: Option<usize>) -> HoverUpdate {
        let mut update = HoverUpdate::default();
        if hit == self.hovered {
            return update;
        }

        if let Some(previous) = self.hovered.take() {
            update.poses.push(PoseChange {
                index: previous,
                task_id: self.targets[previous].task_id.clone(),
                pose: self.pose_of(&self.targets[previous], false),
            });
            update.cursor = Some(CursorAffordance::Default);
        }

        if let Some(next) = hit {
            self.hovered = Some(next);
            update.poses.push(PoseChange {
                index: next,
                task_id: self.targets[next].task_id.clone(),
                pose: self.pose_of(&self.targets[next], true),
            });
            update.cursor = Some(CursorAffordance::Pointer);
        }

        update
    }

    /// Task selected by a click right now, if any book is hovered
    pub fn click(&self) -> Option<TaskId> {
        self.hovered().cloned()
    }

    pub fn cursor(&self) -> CursorAffordance {
        if self.hovered.is_some() {
            CursorAffordance::Pointer
        } else {
            CursorAffordance::Default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::model::Timeframe;

    fn book(id: &str, x: f32) -> BookVolume {
        BookVolume {
            task_id: TaskId::new(id),
            category: "Work".into(),
            title: id.into(),
            timeframe: Timeframe::Medium,
            accent: Rgb::BLACK,
            index_in_category: 0,
            slot_left: x - 0.45,
            center: Vec3::new(x, 1.0, 0.0),
            size: Vec3::new(0.9, 1.6, 0.9),
            tilt: 0.0,
        }
    }

    fn engine(books: &[BookVolume]) -> HoverEngine {
        HoverEngine::new(books, &HoverConfig::default())
    }

    fn ray_at(point: Vec3) -> Ray {
        Ray::towards(point + Vec3::new(0.0, 0.0, 10.0), point)
    }

    #[test]
    fn test_box_hit_and_miss() {
        let b = OrientedBox {
            center: Vec3::ZERO,
            half_extents: Vec3::splat(0.5),
            tilt: 0.0,
            scale: 1.0,
        };
        let hit = b.intersect(&Ray::towards(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO)).unwrap();
        assert!((hit - 4.5).abs() < 1e-5);
        assert!(b.intersect(&Ray::new(Vec3::new(2.0, 0.0, 5.0), Vec3::NEG_Z)).is_none());
        // pointing away
        assert!(b.intersect(&Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z)).is_none());
    }

    #[test]
    fn test_tilt_and_scale_affect_hit() {
        let ray = Ray::new(Vec3::new(0.55, -0.5, 5.0), Vec3::NEG_Z);
        let mut b = OrientedBox {
            center: Vec3::ZERO,
            half_extents: Vec3::new(0.5, 1.0, 0.5),
            tilt: 0.0,
            scale: 1.0,
        };
        assert!(b.intersect(&ray).is_none());
        b.scale = 1.2;
        assert!(b.intersect(&ray).is_some());
        b.scale = 1.0;
        b.tilt = 0.3;
        assert!(b.intersect(&ray).is_some());
    }

    #[test]
    fn test_ray_at_center_hovers_book_and_clicks() {
        let books = vec![book("a", -1.0), book("b", 0.0), book("c", 1.0)];
        let mut engine = engine(&books);

        let update = engine.update(Some(&ray_at(books[1].center)));
        assert_eq!(engine.hovered(), Some(&TaskId::new("b")));
        assert_eq!(update.cursor, Some(CursorAffordance::Pointer));
        assert_eq!(update.poses.len(), 1);

        let mut selected = Vec::new();
        if let Some(id) = engine.click() {
            selected.push(id);
        }
        assert_eq!(selected, vec![TaskId::new("b")]);
    }

    #[test]
    fn test_nearest_hit_wins() {
        let mut front = book("front", 0.0);
        front.center.z = 1.0;
        let back = book("back", 0.0);
        let mut engine = engine(&[back, front]);
        engine.update(Some(&ray_at(Vec3::new(0.0, 1.0, 0.0))));
        assert_eq!(engine.hovered(), Some(&TaskId::new("front")));
    }

    #[test]
    fn test_hover_moves_restore_before_raise() {
        let books = vec![book("x", -1.0), book("y", 1.0)];
        let mut engine = engine(&books);
        engine.update(Some(&ray_at(books[0].center)));

        let update = engine.update(Some(&ray_at(books[1].center)));
        assert_eq!(update.poses.len(), 2);
        assert_eq!(update.poses[0].task_id, TaskId::new("x"));
        assert_eq!(update.poses[0].pose.center, books[0].center);
        assert_eq!(update.poses[0].pose.scale, 1.0);
        assert_eq!(update.poses[1].task_id, TaskId::new("y"));
        assert!(update.poses[1].pose.center.y > books[1].center.y);

        let raised = (0..books.len()).filter(|&i| engine.pose(i).unwrap().scale != 1.0).count();
        assert_eq!(raised, 1);
    }

    #[test]
    fn test_hover_cycles_do_not_drift() {
        let books = vec![book("x", 0.0)];
        let mut engine = engine(&books);
        let on = ray_at(books[0].center);
        let off = ray_at(Vec3::new(10.0, 10.0, 0.0));
        for _ in 0..50 {
            engine.update(Some(&on));
            engine.update(Some(&off));
        }
        engine.update(Some(&on));
        let pose = engine.pose(0).unwrap();
        assert!((pose.center.y - (books[0].center.y + HoverConfig::default().lift)).abs() < 1e-6);
        assert_eq!(pose.scale, HoverConfig::default().scale);
    }

    #[test]
    fn test_pose_of_unknown_index_is_none() {
        let books = vec![book("x", 0.0)];
        let engine = engine(&books);
        assert_eq!(engine.pose(1), None);
        assert_eq!(engine.pose_for(7, true), None);
        assert_eq!(engine.pose(0).map(|p| p.scale), Some(1.0));
    }

    #[test]
    fn test_miss_and_clear() {
        let books = vec![book("x", 0.0)];
        let mut engine = engine(&books);
        assert!(engine.update(Some(&ray_at(Vec3::new(5.0, 5.0, 0.0)))).is_empty());
        assert_eq!(engine.click(), None);

        engine.update(Some(&ray_at(books[0].center)));
        let update = engine.clear();
        assert_eq!(update.cursor, Some(CursorAffordance::Default));
        assert_eq!(engine.hovered(), None);
        assert_eq!(engine.cursor(), CursorAffordance::Default);

        assert!(engine.update(None).is_empty());
    }

    #[test]
    fn test_steady_hover_is_quiet() {
        let books = vec![book("x", 0.0)];
        let mut engine = engine(&books);
        engine.update(Some(&ray_at(books[0].center)));
        assert!(engine.update(Some(&ray_at(books[0].center))).is_empty());
    }
}
