//! Recursion parameters.
//!
//! Every level of the search gets its own [`SearchParams`]; children are
//! derived with [`SearchParams::child`] or [`SearchParams::thickened`] and the
//! parent's value is never touched.

use serde::{Deserialize, Serialize};

use crate::geo::{Coordinate, GridSize, SearchArea};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchContext {
    pub max_depth: u32,
    /// Divisor applied to the grid step at each finer level. Always > 1.
    pub grid_div: u32,
    pub search_area: SearchArea,
}

impl SearchContext {
    #[must_use]
    pub const fn new(max_depth: u32, grid_div: u32, search_area: SearchArea) -> Self {
        Self {
            max_depth,
            grid_div,
            search_area,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub search_context: SearchContext,
    pub grid_size: GridSize,
    pub depth: u32,
    /// Outer admissibility bound fixed at the root call; never shrinks.
    pub origin_search_area: SearchArea,
}

impl SearchParams {
    /// Parameters for the root call: depth 0, origin equal to the search area.
    #[must_use]
    pub const fn root(search_context: SearchContext, grid_size: GridSize) -> Self {
        Self {
            search_context,
            grid_size,
            depth: 0,
            origin_search_area: search_context.search_area,
        }
    }

    #[must_use]
    pub const fn search_area(&self) -> &SearchArea {
        &self.search_context.search_area
    }

    #[must_use]
    pub const fn radius_km(&self) -> f64 {
        self.search_context.search_area.radius_km
    }

    #[must_use]
    pub const fn max_depth(&self) -> u32 {
        self.search_context.max_depth
    }

    /// Same area and depth, finer grid. Used when a grid pass yields no points.
    #[must_use]
    pub fn thickened(&self) -> Self {
        Self {
            grid_size: self.grid_size.divided_by(self.search_context.grid_div),
            ..*self
        }
    }

    /// One level deeper around `center`: finer grid, new radius, same origin.
    #[must_use]
    pub fn child(&self, center: Coordinate, radius_km: f64) -> Self {
        Self {
            search_context: SearchContext {
                search_area: SearchArea::new(center, radius_km),
                ..self.search_context
            },
            grid_size: self.grid_size.divided_by(self.search_context.grid_div),
            depth: self.depth + 1,
            origin_search_area: self.origin_search_area,
        }
    }
}
