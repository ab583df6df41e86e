// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod filter;
pub mod ids;
pub mod model;
pub mod selection;
pub mod state;
pub mod views;

pub use filter::*;
pub use ids::*;
pub use model::*;
pub use selection::*;
pub use state::*;
pub use views::*;
