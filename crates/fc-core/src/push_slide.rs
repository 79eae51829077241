//! Push-slide role classification
//!
//! For every sliding sash the analysis looks only at the bars docked
//! directly to the sash outline:
//! - bars docked along the leading edge (the edge facing the slide
//!   direction) are `is_slide`; those running across the slide direction are
//!   also `is_push_slide`
//! - for horizontal slides, vertical bars T-jointed onto the sash's top or
//!   bottom edge are `is_push_track`
//!
//! Geometry is never modified. Flags are reset before every run.

use fc_geom::{Direction, EdgeFinder, Tolerance};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::bar::{Bar, BarRoles, Sash};
use crate::dock::BarLookup;
use crate::poly_id::PolyId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Slide,
    PushSlide,
    PushTrack,
}

/// Counts of bars carrying each role after an analysis run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushSlideReport {
    /// Sashes with a slide direction
    pub sashes: usize,
    pub slide: usize,
    pub push_slide: usize,
    pub push_track: usize,
}

/// Classifies frame bars by their role around sliding sashes
#[derive(Debug, Clone, Copy, Default)]
pub struct PushSlideCCBar {
    tol: Tolerance,
}

impl PushSlideCCBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tolerance for deciding whether a bar is horizontal or vertical
    pub fn with_tolerance(mut self, tol: Tolerance) -> Self {
        self.tol = tol;
        self
    }

    /// Reset and recompute the roles of `bars` for the given sashes
    pub fn analyze(&self, sashes: &[Sash], bars: &mut [Bar]) -> PushSlideReport {
        for bar in bars.iter_mut() {
            bar.roles = BarRoles::default();
        }

        let mut marks = Vec::new();
        let mut report = PushSlideReport::default();
        for sash in sashes {
            let Some(direction) = sash.slide else {
                continue;
            };
            report.sashes += 1;
            self.collect(sash, direction, &*bars, &mut marks);
        }

        for (id, role) in marks {
            let Some(bar) = bars.iter_mut().find(|b| b.id == id) else {
                continue;
            };
            match role {
                Role::Slide => bar.roles.is_slide = true,
                Role::PushSlide => bar.roles.is_push_slide = true,
                Role::PushTrack => bar.roles.is_push_track = true,
            }
        }

        for bar in bars.iter() {
            report.slide += usize::from(bar.roles.is_slide);
            report.push_slide += usize::from(bar.roles.is_push_slide);
            report.push_track += usize::from(bar.roles.is_push_track);
        }
        debug!(
            "Push-slide analysis over {} sashes: {} slide, {} push-slide, {} push-track",
            report.sashes, report.slide, report.push_slide, report.push_track
        );
        report
    }

    fn collect(&self, sash: &Sash, direction: Direction, bars: &[Bar], marks: &mut Vec<(Uuid, Role)>) {
        let edges = sash.polygon.edges();
        let Some(leading) = EdgeFinder::find_index(direction, edges, &self.tol) else {
            trace!("Sash {} has no edges", sash.id);
            return;
        };

        for (key, data) in sash.docks.buckets_for(leading as i32) {
            for dock in data {
                let Some(bar) = resolve(bars, key, dock.idx) else {
                    continue;
                };
                trace!("Bar {} slides against sash {}", bar.poly_id, sash.id);
                marks.push((bar.id, Role::Slide));
                if self.runs_across(bar, direction) {
                    marks.push((bar.id, Role::PushSlide));
                }
            }
        }

        if !direction.is_horizontal() {
            return;
        }
        for side in [Direction::Up, Direction::Down] {
            let Some(index) = EdgeFinder::find_index(side, edges, &self.tol) else {
                continue;
            };
            let multi = sash
                .docks
                .buckets_for(index as i32)
                .filter(|(key, _)| key.is_multi_dock());
            for (key, data) in multi {
                for dock in data {
                    let Some(bar) = resolve(bars, key, dock.idx) else {
                        continue;
                    };
                    if bar.is_vertical(&self.tol) {
                        trace!("Bar {} tracks sash {}", bar.poly_id, sash.id);
                        marks.push((bar.id, Role::PushTrack));
                    }
                }
            }
        }
    }

    /// Whether the bar lies across the slide direction
    fn runs_across(&self, bar: &Bar, direction: Direction) -> bool {
        if direction.is_horizontal() {
            bar.is_vertical(&self.tol)
        } else {
            bar.is_horizontal(&self.tol)
        }
    }
}

fn resolve<'b>(bars: &'b [Bar], key: PolyId, target: PolyId) -> Option<&'b Bar> {
    let bar = bars.bar(target);
    if bar.is_none() {
        warn!("Dock {} points at missing bar {}", key, target);
    }
    bar
}
