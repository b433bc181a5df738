pub mod collision_resolver;
pub mod duplicate_filter;
pub mod measurement;
pub mod object_describer;
pub mod renderer;
pub mod shade_detector;
pub mod tracker;
