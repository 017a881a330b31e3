// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod collate;
pub mod model;
pub mod pagination;
pub mod persist;
pub mod search;
pub mod sort;
pub mod state;
pub mod view;

pub use collate::*;
pub use model::*;
pub use pagination::*;
pub use persist::*;
pub use search::*;
pub use sort::*;
pub use state::*;
pub use view::*;
