// Domain layer - Core types shared by the cache, planner and engine

pub mod model;
