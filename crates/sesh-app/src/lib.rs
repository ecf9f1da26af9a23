// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod heatmap;
pub mod history;
pub mod model;
pub mod on_this_day;
pub mod pagination;
pub mod projection;
pub mod schedule;
pub mod search;
pub mod state;
pub mod stats;

pub use heatmap::*;
pub use history::*;
pub use model::*;
pub use on_this_day::*;
pub use pagination::*;
pub use projection::*;
pub use schedule::*;
pub use search::*;
pub use state::*;
pub use stats::*;
